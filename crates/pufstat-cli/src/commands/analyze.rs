use anyhow::{Context, Result, bail};
use log::{debug, info};
use pufstat_core::{ProfileSummary, decode_f64_vector};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

pub struct AnalyzeCommandConfig<'a> {
    pub database: &'a str,
    pub table: &'a str,
    pub column: &'a str,
    pub id_column: &'a str,
    pub reference_id: Option<i64>,
    pub output_path: Option<&'a str>,
}

/// PUF quality metrics of one response column.
#[derive(Debug, Clone, Serialize)]
pub struct PufReport {
    pub table: String,
    pub column: String,
    /// Non-null responses.
    pub responses: u64,
    pub response_bytes: Option<u64>,
    /// Mean fractional Hamming weight; ideal 0.5.
    pub uniformity: Option<f64>,
    pub mean_entropy: Option<f64>,
    /// Mean pairwise fractional Hamming distance; ideal 0.5.
    pub uniqueness: Option<f64>,
    pub bit_aliasing: Option<ProfileSummary>,
    pub reliability: Option<ReliabilityReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReliabilityReport {
    pub reference_id: i64,
    /// Responses compared with the reference.
    pub samples: u64,
    pub profile: Option<ProfileSummary>,
}

pub fn run(cfg: AnalyzeCommandConfig<'_>) -> Result<()> {
    if !std::path::Path::new(cfg.database).exists() {
        bail!("database '{}' does not exist", cfg.database);
    }
    let db = super::open_database(Some(cfg.database))?;
    let report = build_report(&db, &cfg)?;
    print_report(cfg.database, &report);

    if let Some(path) = cfg.output_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("failed to write '{path}'"))?;
        println!("\nReport written to {path}");
    }
    Ok(())
}

pub fn build_report(db: &Connection, cfg: &AnalyzeCommandConfig<'_>) -> Result<PufReport> {
    let table = super::quote_identifier(cfg.table)?;
    let column = super::quote_identifier(cfg.column)?;

    let (responses, min_len, max_len, uniformity, mean_entropy): (
        u64,
        Option<u64>,
        Option<u64>,
        Option<f64>,
        Option<f64>,
    ) = db
        .query_row(
            &format!(
                "SELECT count({column}),
                        min(length(CAST({column} AS BLOB))), max(length(CAST({column} AS BLOB))),
                        avg(FHW({column})), avg(entropy({column}))
                 FROM {table} WHERE {column} IS NOT NULL"
            ),
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )
        .with_context(|| format!("failed to read responses from {table}.{column}"))?;
    info!("{responses} responses in {table}.{column}");

    if min_len != max_len {
        bail!(
            "responses in {table}.{column} have varying lengths ({} to {} bytes)",
            min_len.unwrap_or(0),
            max_len.unwrap_or(0)
        );
    }

    // Row numbers instead of rowid so WITHOUT ROWID tables work too.
    let uniqueness: Option<f64> = db.query_row(
        &format!(
            "WITH r AS MATERIALIZED (
                 SELECT row_number() OVER () AS n, {column} AS v
                 FROM {table} WHERE {column} IS NOT NULL
             )
             SELECT avg(FHD(a.v, b.v)) FROM r a JOIN r b ON a.n < b.n"
        ),
        [],
        |row| row.get(0),
    )?;

    let aliasing: Option<Vec<u8>> = db.query_row(
        &format!("SELECT bitaliasing({column}) FROM {table}"),
        [],
        |row| row.get(0),
    )?;
    let bit_aliasing = summarize(aliasing)?;

    let reliability = match cfg.reference_id {
        Some(reference_id) => Some(reliability_report(db, cfg, &table, &column, reference_id)?),
        None => None,
    };

    Ok(PufReport {
        table: cfg.table.to_string(),
        column: cfg.column.to_string(),
        responses,
        response_bytes: max_len,
        uniformity,
        mean_entropy,
        uniqueness,
        bit_aliasing,
        reliability,
    })
}

fn reliability_report(
    db: &Connection,
    cfg: &AnalyzeCommandConfig<'_>,
    table: &str,
    column: &str,
    reference_id: i64,
) -> Result<ReliabilityReport> {
    let id_column = super::quote_identifier(cfg.id_column)?;
    // First non-null response with that id, in rowid order when the table has one.
    let order = if has_rowid(db, table) {
        "ORDER BY rowid"
    } else {
        ""
    };
    let reference: Option<Vec<u8>> = db
        .query_row(
            &format!(
                "SELECT CAST({column} AS BLOB) FROM {table}
                 WHERE {id_column} = ?1 AND {column} IS NOT NULL {order} LIMIT 1"
            ),
            [reference_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(reference) = reference else {
        bail!("no non-null response with {id_column} = {reference_id} in {table}");
    };
    debug!("reference response: {} bytes", reference.len());

    let (profile, samples): (Option<Vec<u8>>, u64) = db.query_row(
        &format!(
            "SELECT reliability(?1, {column}), count({column})
             FROM {table} WHERE {id_column} IS NOT ?2"
        ),
        rusqlite::params![reference, reference_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(ReliabilityReport {
        reference_id,
        samples,
        profile: summarize(profile)?,
    })
}

fn has_rowid(db: &Connection, table: &str) -> bool {
    db.prepare(&format!("SELECT rowid FROM {table} LIMIT 0")).is_ok()
}

fn summarize(blob: Option<Vec<u8>>) -> Result<Option<ProfileSummary>> {
    match blob {
        Some(blob) => {
            let values = decode_f64_vector(&blob)?;
            Ok(Some(ProfileSummary::from_probabilities(&values)))
        }
        None => Ok(None),
    }
}

fn print_report(database: &str, report: &PufReport) {
    println!("{:=<68}", "");
    println!("PUF quality report: {database} ({}.{})", report.table, report.column);
    println!("{:=<68}", "");
    println!("  {:<28} {}", "Responses", report.responses);
    println!(
        "  {:<28} {}",
        "Response length",
        report
            .response_bytes
            .map(|b| format!("{b} bytes ({} bits)", b * 8))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  {:<28} {}", "Uniformity (ideal 0.5)", fmt_opt(report.uniformity));
    println!("  {:<28} {}", "Mean entropy (ideal 1.0)", fmt_opt(report.mean_entropy));
    println!("  {:<28} {}", "Uniqueness (ideal 0.5)", fmt_opt(report.uniqueness));

    if let Some(summary) = &report.bit_aliasing {
        println!("\n  Bit-aliasing (ideal 0.5 on every bit)");
        print_profile(summary);
    }

    if let Some(rel) = &report.reliability {
        println!(
            "\n  Reliability vs. id {} over {} response(s) (ideal 1.0)",
            rel.reference_id, rel.samples
        );
        match &rel.profile {
            Some(summary) => print_profile(summary),
            None => println!("    no responses to compare"),
        }
    }
}

fn print_profile(summary: &ProfileSummary) {
    println!(
        "    mean {:.4}  std {:.4}  min {:.4}  max {:.4}",
        summary.mean, summary.std_dev, summary.min, summary.max
    );
    println!(
        "    {} bit(s) always 0, {} bit(s) always 1, of {}",
        summary.stuck_at_zero, summary.stuck_at_one, summary.bits
    );
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".to_string())
}
