//! End-to-end run over a random population, the way a host application
//! drives the functions: one table of responses, one query per function.

use pufstat_core::decode_f64_vector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::{Connection, params};

const NUM_SAMPLES: usize = 100;
const NUM_BYTES: usize = 512;

fn populate(db: &Connection, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    db.execute("CREATE TABLE data (id INTEGER, vec BLOB)", [])
        .unwrap();
    let mut rows = Vec::with_capacity(NUM_SAMPLES);
    for id in 0..NUM_SAMPLES {
        let mut vec = vec![0u8; NUM_BYTES];
        rng.fill(&mut vec[..]);
        db.execute("INSERT INTO data VALUES (?1, ?2)", params![id as i64, vec])
            .unwrap();
        rows.push(vec);
    }
    rows
}

fn column<T: rusqlite::types::FromSql>(
    db: &Connection,
    sql: &str,
    p: impl rusqlite::Params,
) -> Vec<(i64, T)> {
    let mut stmt = db.prepare(sql).unwrap();
    stmt.query_map(p, |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn in_memory_population() {
    let db = Connection::open_in_memory().unwrap();
    sqlite_puf::register_functions(&db).unwrap();
    let rows = populate(&db, 0x5eed);
    let first = &rows[0];

    let hw: Vec<(i64, i64)> = column(&db, "SELECT id, HW(vec) FROM data", []);
    assert_eq!(hw.len(), NUM_SAMPLES);
    for (id, weight) in &hw {
        let expected: u32 = rows[*id as usize].iter().map(|b| b.count_ones()).sum();
        assert_eq!(*weight, i64::from(expected));
    }

    let hd: Vec<(i64, i64)> = column(&db, "SELECT id, HD(vec, ?1) FROM data", [first]);
    assert_eq!(hd[0], (0, 0));
    assert!(hd[1..].iter().all(|(_, d)| *d > 0));

    let fhd: Vec<(i64, f64)> = column(&db, "SELECT id, FHD(vec, ?1) FROM data", [first]);
    for ((_, d), (_, f)) in hd.iter().zip(&fhd) {
        assert_eq!(*f, *d as f64 / (NUM_BYTES * 8) as f64);
    }

    let entropy: Vec<(i64, f64)> = column(&db, "SELECT id, entropy(vec) FROM data", []);
    assert!(entropy.iter().all(|(_, h)| (0.0..=1.0).contains(h)));

    let blob: Vec<u8> = db
        .query_row("SELECT bitaliasing(vec) FROM data", [], |row| row.get(0))
        .unwrap();
    let aliasing = decode_f64_vector(&blob).unwrap();
    assert_eq!(aliasing.len(), NUM_BYTES * 8);
    assert!(aliasing.iter().all(|p| (0.0..=1.0).contains(p)));

    let blob: Vec<u8> = db
        .query_row("SELECT reliability(?1, vec) FROM data", [first], |row| {
            row.get(0)
        })
        .unwrap();
    let reliability = decode_f64_vector(&blob).unwrap();
    assert_eq!(reliability.len(), NUM_BYTES * 8);
    // Every bit of the reference matches itself once, so nothing is zero.
    assert!(reliability.iter().all(|&p| p > 0.0 && p <= 1.0));
}

#[test]
fn on_disk_database_with_pairwise_uniqueness() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("responses.db");
    {
        let db = Connection::open(&path).unwrap();
        populate(&db, 7);
    }

    // Functions are per connection: reopen and register again.
    let db = Connection::open(&path).unwrap();
    sqlite_puf::register_functions(&db).unwrap();
    let uniqueness: f64 = db
        .query_row(
            "SELECT avg(FHD(a.vec, b.vec)) FROM data a JOIN data b ON a.rowid < b.rowid",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!((uniqueness - 0.5).abs() < 0.01, "uniqueness {uniqueness}");
}
