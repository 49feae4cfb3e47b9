use std::time::Instant;

use anyhow::{Context, Result, bail};
use log::info;
use pufstat_core::{ProfileSummary, decode_f64_vector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::{Connection, params};

pub struct SelftestConfig {
    pub samples: usize,
    pub bytes: usize,
    pub seed: Option<u64>,
    pub show: usize,
}

/// Outcome of one shape check.
#[derive(Debug)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
    pub details: String,
}

impl Check {
    fn new(name: &'static str, passed: bool, details: String) -> Self {
        Self {
            name,
            passed,
            details,
        }
    }
}

pub fn run(cfg: SelftestConfig) -> Result<()> {
    if cfg.samples == 0 || cfg.bytes == 0 {
        bail!("--samples and --bytes must both be at least 1");
    }
    let seed = cfg.seed.unwrap_or_else(rand::random);
    println!(
        "Self-test: {} random responses of {} bytes (seed {seed})\n",
        cfg.samples, cfg.bytes
    );

    let t0 = Instant::now();
    let db = super::open_database(None)?;
    populate(&db, cfg.samples, cfg.bytes, seed)?;
    let checks = run_checks(&db, cfg.bytes, cfg.show)?;

    println!("\n{:=<68}", "");
    println!("  {:<40} {:>6}  Details", "Check", "Result");
    println!("  {}", "-".repeat(64));
    for check in &checks {
        let verdict = if check.passed { "PASS" } else { "FAIL" };
        println!("  {:<40} {:>6}  {}", check.name, verdict, check.details);
    }
    println!("{:=<68}", "");

    let failed = checks.iter().filter(|c| !c.passed).count();
    println!(
        "{} passed, {failed} failed in {:.2}s",
        checks.len() - failed,
        t0.elapsed().as_secs_f64()
    );
    if failed > 0 {
        bail!("{failed} self-test check(s) failed (seed {seed})");
    }
    Ok(())
}

/// Create `data(id INTEGER, vec BLOB)` and fill it with random responses.
pub fn populate(db: &Connection, samples: usize, bytes: usize, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    db.execute("CREATE TABLE data (id INTEGER, vec BLOB)", [])
        .context("failed to create table")?;

    let mut stmt = db.prepare("INSERT INTO data VALUES (?1, ?2)")?;
    let mut vec = vec![0u8; bytes];
    for id in 0..samples {
        rng.fill(&mut vec[..]);
        stmt.execute(params![id as i64, vec])?;
    }
    info!("inserted {samples} responses of {bytes} bytes");
    Ok(())
}

/// Call every function against the `data` table, print a preview of each
/// result and check its shape.
pub fn run_checks(db: &Connection, bytes: usize, show: usize) -> Result<Vec<Check>> {
    let reference: Vec<u8> = db
        .query_row("SELECT vec FROM data WHERE id = 0", [], |row| row.get(0))
        .context("table has no row with id 0")?;
    let bits = bytes * 8;
    let mut checks = Vec::new();

    println!("Hamming Weight");
    let hw: Vec<(i64, i64)> = id_column(db, "SELECT id, HW(vec) FROM data", [])?;
    preview(&hw, show);
    checks.push(Check::new(
        "HW within [0, bits]",
        hw.iter().all(|&(_, w)| (0..=bits as i64).contains(&w)),
        format!("{} rows", hw.len()),
    ));

    println!("Hamming Distance");
    let hd: Vec<(i64, i64)> =
        id_column(db, "SELECT id, HD(vec, ?1) FROM data", [&reference])?;
    preview(&hd, show);
    let self_distance = hd.iter().find(|&&(id, _)| id == 0).map(|&(_, d)| d);
    checks.push(Check::new(
        "HD of reference with itself is 0",
        self_distance == Some(0),
        format!("HD(v0, v0) = {self_distance:?}"),
    ));

    println!("Fractional Hamming Distance");
    let fhd: Vec<(i64, f64)> =
        id_column(db, "SELECT id, FHD(vec, ?1) FROM data", [&reference])?;
    preview(&fhd, show);
    let consistent = hd
        .iter()
        .zip(&fhd)
        .all(|(&(_, d), &(_, f))| (f - d as f64 / bits as f64).abs() < 1e-12);
    checks.push(Check::new(
        "FHD equals HD / bits",
        consistent,
        format!("{} rows", fhd.len()),
    ));

    println!("Shannon Entropy");
    let entropy: Vec<(i64, f64)> = id_column(db, "SELECT id, entropy(vec) FROM data", [])?;
    preview(&entropy, show);
    checks.push(Check::new(
        "entropy within [0, 1]",
        entropy.iter().all(|(_, h)| (0.0..=1.0).contains(h)),
        format!("{} rows", entropy.len()),
    ));

    println!("Computing Bitaliasing");
    let blob: Vec<u8> = db.query_row("SELECT bitaliasing(vec) FROM data", [], |row| row.get(0))?;
    checks.push(vector_check("bitaliasing has one value per bit", &blob, bits)?);

    println!("Computing Reliability");
    let blob: Vec<u8> = db.query_row(
        "SELECT reliability(?1, vec) FROM data",
        [&reference],
        |row| row.get(0),
    )?;
    checks.push(vector_check("reliability has one value per bit", &blob, bits)?);

    // Reference against itself agrees everywhere.
    let blob: Vec<u8> = db.query_row(
        "SELECT reliability(?1, vec) FROM data WHERE id = 0",
        [&reference],
        |row| row.get(0),
    )?;
    let own = decode_f64_vector(&blob)?;
    checks.push(Check::new(
        "reliability of reference with itself is 1",
        own.iter().all(|&p| p == 1.0),
        format!("{} bits", own.len()),
    ));

    Ok(checks)
}

fn id_column<T: rusqlite::types::FromSql>(
    db: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<(i64, T)>> {
    let mut stmt = db.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("query failed: {sql}"))?;
    Ok(rows)
}

fn preview<T: std::fmt::Debug>(rows: &[(i64, T)], show: usize) {
    let head: Vec<_> = rows.iter().take(show).collect();
    let more = rows.len().saturating_sub(show);
    if more > 0 {
        println!("  {head:?} ... ({more} more)");
    } else {
        println!("  {head:?}");
    }
}

fn vector_check(name: &'static str, blob: &[u8], bits: usize) -> Result<Check> {
    let values = decode_f64_vector(blob)?;
    let summary = ProfileSummary::from_probabilities(&values);
    println!(
        "  ({},) mean {:.4}, min {:.4}, max {:.4}",
        summary.bits, summary.mean, summary.min, summary.max
    );
    let passed = values.len() == bits && values.iter().all(|p| (0.0..=1.0).contains(p));
    Ok(Check::new(
        name,
        passed,
        format!("shape ({},), expected ({bits},)", values.len()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checks_pass_on_random_population() {
        let db = super::super::open_database(None).unwrap();
        populate(&db, 20, 16, 42).unwrap();
        let checks = run_checks(&db, 16, 2).unwrap();
        assert_eq!(checks.len(), 7);
        for check in &checks {
            assert!(check.passed, "{}: {}", check.name, check.details);
        }
    }

    #[test]
    fn test_populate_is_seeded() {
        let a = super::super::open_database(None).unwrap();
        let b = super::super::open_database(None).unwrap();
        populate(&a, 5, 8, 99).unwrap();
        populate(&b, 5, 8, 99).unwrap();
        let read = |db: &Connection| -> Vec<Vec<u8>> {
            let mut stmt = db.prepare("SELECT vec FROM data ORDER BY id").unwrap();
            stmt.query_map([], |row| row.get(0))
                .unwrap()
                .collect::<rusqlite::Result<_>>()
                .unwrap()
        };
        assert_eq!(read(&a), read(&b));
        assert_eq!(read(&a).len(), 5);
    }

    #[test]
    fn test_vector_check_detects_wrong_shape() {
        let blob = pufstat_core::encode_f64_vector(&[0.5; 8]);
        assert!(vector_check("shape", &blob, 8).unwrap().passed);
        assert!(!vector_check("shape", &blob, 16).unwrap().passed);
        let out_of_range = pufstat_core::encode_f64_vector(&[1.5]);
        assert!(!vector_check("range", &out_of_range, 1).unwrap().passed);
    }
}
