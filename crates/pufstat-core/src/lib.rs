//! # pufstat-core
//!
//! **Bit statistics for Physically Unclonable Function responses.**
//!
//! A PUF response is a byte string in which every bit is one output bit of
//! the device. This crate computes the metrics used to judge PUF quality:
//!
//! - Hamming weight and distance, absolute and fractional
//! - binary Shannon entropy of a single response
//! - bit-aliasing: how often each bit position is 1 across many devices
//! - reliability: how often each bit position reproduces a reference response
//!
//! ## Quick Start
//!
//! ```
//! use pufstat_core::{BitAliasing, hamming_distance, hamming_weight};
//!
//! let a = [0b1010_1010u8, 0xFF];
//! let b = [0b0101_0101u8, 0xFF];
//! assert_eq!(hamming_weight(&a), 12);
//! assert_eq!(hamming_distance(&a, &b).unwrap(), 8);
//!
//! let mut aliasing = BitAliasing::new();
//! aliasing.push(&a).unwrap();
//! aliasing.push(&b).unwrap();
//! let probabilities = aliasing.finish().unwrap();
//! assert_eq!(probabilities.len(), 16);
//! assert_eq!(probabilities[0], 0.5);
//! ```
//!
//! ## Bit order
//!
//! Bit `b` (0 = least significant) of byte `i` has bit index `i * 8 + b`.
//! Every per-bit vector in this crate uses that index.
//!
//! The SQL surface lives in the `pufstat-sqlite` crate; this crate has no
//! database dependency.

pub mod encoding;
pub mod error;
pub mod hamming;
pub mod profile;

pub use encoding::{decode_f64_vector, encode_f64_vector};
pub use error::{PufError, Result};
pub use hamming::{
    fractional_hamming_distance, fractional_hamming_weight, hamming_distance, hamming_weight,
    shannon_entropy,
};
pub use profile::{BitAliasing, ProfileSummary, Reliability};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
