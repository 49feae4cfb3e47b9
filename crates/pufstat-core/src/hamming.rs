//! Hamming metrics and binary entropy over a single response or a pair.

use crate::error::{PufError, Result};

/// Number of set bits in `v`.
pub fn hamming_weight(v: &[u8]) -> u64 {
    v.iter().map(|&b| u64::from(b.count_ones())).sum()
}

/// Fraction of set bits, `HW / (8 * len)`. `None` for an empty response.
pub fn fractional_hamming_weight(v: &[u8]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    Some(hamming_weight(v) as f64 / bit_len(v.len()))
}

/// Number of bit positions at which `a` and `b` differ.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> Result<u64> {
    check_same_len(a, b)?;
    Ok(a.iter()
        .zip(b)
        .map(|(&x, &y)| u64::from((x ^ y).count_ones()))
        .sum())
}

/// `HD / (8 * len)`. `Ok(None)` when both responses are empty.
pub fn fractional_hamming_distance(a: &[u8], b: &[u8]) -> Result<Option<f64>> {
    let dist = hamming_distance(a, b)?;
    if a.is_empty() {
        return Ok(None);
    }
    Ok(Some(dist as f64 / bit_len(a.len())))
}

/// Binary Shannon entropy of the response's bit balance.
///
/// With `p` the fractional Hamming weight, returns
/// `-(p log2 p + (1 - p) log2 (1 - p))`. A response of all zeros or all ones
/// has entropy 0; a perfectly balanced one has entropy 1.
pub fn shannon_entropy(v: &[u8]) -> Option<f64> {
    let p = fractional_hamming_weight(v)?;
    if p <= 0.0 || p >= 1.0 {
        return Some(0.0);
    }
    let q = 1.0 - p;
    Some(-(p * p.log2() + q * q.log2()))
}

fn check_same_len(a: &[u8], b: &[u8]) -> Result<()> {
    if a.len() != b.len() {
        return Err(PufError::LengthMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(())
}

#[inline]
fn bit_len(bytes: usize) -> f64 {
    (bytes * 8) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_counts_every_bit() {
        assert_eq!(hamming_weight(&[]), 0);
        assert_eq!(hamming_weight(&[0x00, 0x00]), 0);
        assert_eq!(hamming_weight(&[0xFF; 4]), 32);
        assert_eq!(hamming_weight(&[0b1000_0001, 0b0001_0000]), 3);
    }

    #[test]
    fn fractional_weight_of_half_set() {
        assert_eq!(fractional_hamming_weight(&[0x0F, 0xF0]), Some(0.5));
        assert_eq!(fractional_hamming_weight(&[0xFF]), Some(1.0));
        assert_eq!(fractional_hamming_weight(&[]), None);
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = [0x12, 0x34, 0x56];
        let b = [0xAB, 0xCD, 0xEF];
        assert_eq!(hamming_distance(&a, &a).unwrap(), 0);
        assert_eq!(
            hamming_distance(&a, &b).unwrap(),
            hamming_distance(&b, &a).unwrap()
        );
    }

    #[test]
    fn distance_of_complement_is_full_length() {
        let a = [0x5A, 0x00, 0xFF];
        let b: Vec<u8> = a.iter().map(|x| !x).collect();
        assert_eq!(hamming_distance(&a, &b).unwrap(), 24);
        assert_eq!(fractional_hamming_distance(&a, &b).unwrap(), Some(1.0));
    }

    #[test]
    fn distance_rejects_length_mismatch() {
        let err = hamming_distance(&[0; 3], &[0; 4]).unwrap_err();
        assert_eq!(
            err,
            PufError::LengthMismatch {
                expected: 3,
                found: 4
            }
        );
        assert!(err.to_string().contains("must be same size"));
        assert!(fractional_hamming_distance(&[0; 2], &[]).is_err());
    }

    #[test]
    fn fractional_distance_of_empty_pair_is_none() {
        assert_eq!(fractional_hamming_distance(&[], &[]).unwrap(), None);
    }

    #[test]
    fn entropy_bounds() {
        assert_eq!(shannon_entropy(&[0x00; 8]), Some(0.0));
        assert_eq!(shannon_entropy(&[0xFF; 8]), Some(0.0));
        assert_eq!(shannon_entropy(&[0x0F; 8]), Some(1.0));
        assert_eq!(shannon_entropy(&[]), None);
    }

    #[test]
    fn entropy_of_quarter_weight() {
        // p = 0.25: H = 0.811278...
        let h = shannon_entropy(&[0b0000_0011]).unwrap();
        assert!((h - 0.811_278_124_459_132_9).abs() < 1e-12);
    }
}
