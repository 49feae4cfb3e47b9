//! Per-bit profiles across many responses.
//!
//! [`BitAliasing`] and [`Reliability`] consume one response (or one
//! reference/sample pair) at a time, so they map directly onto SQL aggregate
//! steps, and produce one probability per bit index when finished.
//! [`ProfileSummary`] reduces such a vector to a handful of numbers for
//! reporting.

use serde::Serialize;

use crate::error::{PufError, Result};

// ---------------------------------------------------------------------------
// Bit counters
// ---------------------------------------------------------------------------

/// One counter per bit index, sized by the first response seen.
#[derive(Debug, Clone, Default)]
struct BitCounter {
    counts: Vec<u64>,
    response_len: Option<usize>,
    samples: u64,
}

impl BitCounter {
    fn check_len(&self, len: usize) -> Result<()> {
        match self.response_len {
            Some(expected) if expected != len => Err(PufError::VaryingLength {
                expected,
                found: len,
            }),
            _ => Ok(()),
        }
    }

    fn ensure_sized(&mut self, len: usize) {
        if self.response_len.is_none() {
            self.response_len = Some(len);
            self.counts = vec![0; len * 8];
        }
    }

    fn probabilities(&self) -> Option<Vec<f64>> {
        if self.samples == 0 {
            return None;
        }
        let n = self.samples as f64;
        Some(self.counts.iter().map(|&c| c as f64 / n).collect())
    }
}

// ---------------------------------------------------------------------------
// Bit-aliasing
// ---------------------------------------------------------------------------

/// Probability of each bit index being 1 across a population of responses.
///
/// Ideal PUFs sit at 0.5 on every index; values near 0 or 1 mark bits that
/// carry the same value on every device.
#[derive(Debug, Clone, Default)]
pub struct BitAliasing {
    inner: BitCounter,
}

impl BitAliasing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the set bits of one response.
    ///
    /// The first response fixes the length. A response of another length is
    /// rejected and leaves the counters untouched.
    pub fn push(&mut self, response: &[u8]) -> Result<()> {
        self.inner.check_len(response.len())?;
        self.inner.ensure_sized(response.len());

        for (i, &byte) in response.iter().enumerate() {
            let counts = &mut self.inner.counts[i * 8..i * 8 + 8];
            for (bit, count) in counts.iter_mut().enumerate() {
                *count += u64::from((byte >> bit) & 1);
            }
        }
        self.inner.samples += 1;
        Ok(())
    }

    /// Number of responses pushed so far.
    pub fn samples(&self) -> u64 {
        self.inner.samples
    }

    /// Length in bytes fixed by the first response.
    pub fn response_len(&self) -> Option<usize> {
        self.inner.response_len
    }

    /// Per-bit probability of a 1, or `None` if nothing was pushed.
    pub fn finish(&self) -> Option<Vec<f64>> {
        self.inner.probabilities()
    }
}

// ---------------------------------------------------------------------------
// Reliability
// ---------------------------------------------------------------------------

/// Probability of each bit index reproducing its reference value.
///
/// Each step pairs a reference response (typically the enrollment read-out)
/// with a later read-out of the same device. Ideal PUFs sit at 1.0.
#[derive(Debug, Clone, Default)]
pub struct Reliability {
    inner: BitCounter,
}

impl Reliability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the bits on which `sample` agrees with `reference`.
    ///
    /// Both must have the length fixed by the first pair.
    pub fn push(&mut self, reference: &[u8], sample: &[u8]) -> Result<()> {
        self.inner.check_len(reference.len())?;
        if sample.len() != reference.len() {
            return Err(PufError::VaryingLength {
                expected: reference.len(),
                found: sample.len(),
            });
        }
        self.inner.ensure_sized(reference.len());

        for (i, (&r, &s)) in reference.iter().zip(sample).enumerate() {
            let agree = !(r ^ s);
            let counts = &mut self.inner.counts[i * 8..i * 8 + 8];
            for (bit, count) in counts.iter_mut().enumerate() {
                *count += u64::from((agree >> bit) & 1);
            }
        }
        self.inner.samples += 1;
        Ok(())
    }

    /// Number of pairs pushed so far.
    pub fn samples(&self) -> u64 {
        self.inner.samples
    }

    /// Length in bytes fixed by the first pair.
    pub fn response_len(&self) -> Option<usize> {
        self.inner.response_len
    }

    /// Per-bit agreement rate, or `None` if nothing was pushed.
    pub fn finish(&self) -> Option<Vec<f64>> {
        self.inner.probabilities()
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Summary statistics of a per-bit probability vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub bits: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    /// Bit indices that were 0 in every sample.
    pub stuck_at_zero: usize,
    /// Bit indices that were 1 in every sample.
    pub stuck_at_one: usize,
}

impl ProfileSummary {
    pub fn from_probabilities(probabilities: &[f64]) -> Self {
        if probabilities.is_empty() {
            return Self {
                bits: 0,
                mean: 0.0,
                min: 0.0,
                max: 0.0,
                std_dev: 0.0,
                stuck_at_zero: 0,
                stuck_at_one: 0,
            };
        }

        let n = probabilities.len() as f64;
        let mean = probabilities.iter().sum::<f64>() / n;
        let variance = probabilities
            .iter()
            .map(|&p| (p - mean).powi(2))
            .sum::<f64>()
            / n;
        let min = probabilities.iter().copied().fold(f64::INFINITY, f64::min);
        let max = probabilities
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        Self {
            bits: probabilities.len(),
            mean,
            min,
            max,
            std_dev: variance.sqrt(),
            stuck_at_zero: probabilities.iter().filter(|&&p| p == 0.0).count(),
            stuck_at_one: probabilities.iter().filter(|&&p| p == 1.0).count(),
        }
    }
}
