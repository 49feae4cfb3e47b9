pub mod analyze;
pub mod selftest;

use anyhow::{Context, Result, bail};
use log::debug;
use rusqlite::Connection;

/// Initialise `env_logger`. `RUST_LOG` wins over the `--verbose` default.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Open a database (`None` = in-memory) with the PUF functions registered.
pub fn open_database(path: Option<&str>) -> Result<Connection> {
    let db = match path {
        Some(path) => Connection::open(path)
            .with_context(|| format!("failed to open database '{path}'"))?,
        None => Connection::open_in_memory().context("failed to open in-memory database")?,
    };
    sqlite_puf::register_functions(&db).context("failed to register PUF functions")?;
    debug!("opened {}", path.unwrap_or(":memory:"));
    Ok(db)
}

/// Validate `name` as a plain SQL identifier and return it double-quoted.
///
/// Table and column names cannot be bound as parameters, so they are
/// restricted to `[A-Za-z_][A-Za-z0-9_]*` before being spliced into SQL.
pub fn quote_identifier(name: &str) -> Result<String> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if !valid {
        bail!("invalid SQL identifier '{name}': use letters, digits and '_' only");
    }
    Ok(format!("\"{name}\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain_identifiers() {
        assert_eq!(quote_identifier("data").unwrap(), "\"data\"");
        assert_eq!(quote_identifier("_vec2").unwrap(), "\"_vec2\"");
        assert_eq!(quote_identifier("Reads_2024").unwrap(), "\"Reads_2024\"");
    }

    #[test]
    fn test_quote_rejects_injection() {
        assert!(quote_identifier("").is_err());
        assert!(quote_identifier("2data").is_err());
        assert!(quote_identifier("data; DROP TABLE data").is_err());
        assert!(quote_identifier("da\"ta").is_err());
        assert!(quote_identifier("vec-1").is_err());
    }

    #[test]
    fn test_open_in_memory_registers_functions() {
        let db = open_database(None).unwrap();
        let hw: i64 = db
            .query_row("SELECT HW(x'FF')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(hw, 8);
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("puf.db");
        let db = open_database(path.to_str()).unwrap();
        let fhd: f64 = db
            .query_row("SELECT FHD(x'00', x'0F')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fhd, 0.5);
        assert!(path.exists());
    }
}
