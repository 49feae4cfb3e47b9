use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PufError {
    /// Two responses that must be compared bit for bit have different lengths.
    #[error("blobs must be same size: expected {expected} bytes, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// An accumulator received a response whose length differs from the first one.
    #[error(
        "blobs have varying lengths, cannot compute vector average: expected {expected} bytes, found {found}"
    )]
    VaryingLength { expected: usize, found: usize },

    #[error("packed f64 vector has {len} bytes, not a multiple of 8")]
    InvalidVectorBlob { len: usize },
}

pub type Result<T> = std::result::Result<T, PufError>;
