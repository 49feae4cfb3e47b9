//! # pufstat-sqlite
//!
//! SQL functions for analysing PUF responses stored as `BLOB`s.
//!
//! | Function | Kind | Result |
//! |---|---|---|
//! | `HW(v)` | scalar | Hamming weight, `INTEGER` |
//! | `FHW(v)` | scalar | fractional Hamming weight, `REAL` |
//! | `HD(a, b)` | scalar | Hamming distance, `INTEGER` |
//! | `FHD(a, b)` | scalar | fractional Hamming distance, `REAL` |
//! | `entropy(v)` | scalar | binary Shannon entropy, `REAL` |
//! | `bitaliasing(v)` | aggregate | per-bit probability of 1, packed `f64` `BLOB` |
//! | `reliability(ref, v)` | aggregate | per-bit agreement with `ref`, packed `f64` `BLOB` |
//!
//! `NULL` arguments give `NULL` from the scalars and are skipped by the
//! aggregates. Packed vectors are little-endian doubles, one per bit, see
//! [`pufstat_core::encoding`].
//!
//! ```
//! use rusqlite::Connection;
//!
//! let db = Connection::open_in_memory().unwrap();
//! sqlite_puf::register_functions(&db).unwrap();
//! let hd: i64 = db
//!     .query_row("SELECT HD(x'0F', x'F0')", [], |row| row.get(0))
//!     .unwrap();
//! assert_eq!(hd, 8);
//! ```
//!
//! Built with `--no-default-features --features loadable_extension` the
//! cdylib exports `sqlite3_extension_init`, so the same functions load into
//! any SQLite host with `load_extension`.

mod aggregate;
mod args;
#[cfg(feature = "loadable_extension")]
mod extension;
mod scalar;

use log::debug;
use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;

/// Names of every SQL function installed by [`register_functions`].
pub const FUNCTION_NAMES: &[&str] = &[
    "HW",
    "FHW",
    "HD",
    "FHD",
    "entropy",
    "bitaliasing",
    "reliability",
];

/// Install all PUF functions on `db`.
pub fn register_functions(db: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;
    scalar::register(db, flags)?;
    aggregate::register(db, flags)?;
    debug!("registered PUF functions: {}", FUNCTION_NAMES.join(", "));
    Ok(())
}
