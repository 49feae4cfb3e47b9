//! Packed `f64` vectors, the blob format of the per-bit SQL aggregates.
//!
//! Layout: consecutive little-endian IEEE-754 doubles, no header. A host
//! reads it with e.g. `numpy.frombuffer(blob, dtype="<f8")`.

use crate::error::{PufError, Result};

const F64_BYTES: usize = std::mem::size_of::<f64>();

pub fn encode_f64_vector(values: &[f64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * F64_BYTES);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

pub fn decode_f64_vector(blob: &[u8]) -> Result<Vec<f64>> {
    if blob.len() % F64_BYTES != 0 {
        return Err(PufError::InvalidVectorBlob { len: blob.len() });
    }
    Ok(blob
        .chunks_exact(F64_BYTES)
        .map(|chunk| {
            let mut raw = [0u8; F64_BYTES];
            raw.copy_from_slice(chunk);
            f64::from_le_bytes(raw)
        })
        .collect())
}
