//! CLI for pufstat: PUF response analysis inside SQLite.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pufstat")]
#[command(about = "pufstat: Hamming metrics, entropy, bit-aliasing and reliability for PUF responses")]
#[command(version = pufstat_core::VERSION)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every SQL function over random responses in an in-memory database
    /// and check the shape of each result
    Selftest {
        /// Number of random responses to insert
        #[arg(long, default_value = "100")]
        samples: usize,

        /// Length of each response in bytes
        #[arg(long, default_value = "512")]
        bytes: usize,

        /// RNG seed (random if omitted; the seed used is printed)
        #[arg(long)]
        seed: Option<u64>,

        /// Rows of each scalar result to print
        #[arg(long, default_value = "5")]
        show: usize,
    },

    /// PUF quality report for the responses stored in one column of a table:
    /// uniformity, entropy, uniqueness, bit-aliasing and optional reliability
    Analyze {
        /// Path to the SQLite database file
        database: String,

        /// Table holding the responses
        #[arg(long, default_value = "data")]
        table: String,

        /// BLOB column holding one response per row
        #[arg(long, default_value = "vec")]
        column: String,

        /// Column identifying rows, used with --reference-id
        #[arg(long, default_value = "id")]
        id_column: String,

        /// Compute reliability of every other row against the row with this id
        #[arg(long)]
        reference_id: Option<i64>,

        /// Write the report as JSON
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Selftest {
            samples,
            bytes,
            seed,
            show,
        } => commands::selftest::run(commands::selftest::SelftestConfig {
            samples,
            bytes,
            seed,
            show,
        }),
        Commands::Analyze {
            database,
            table,
            column,
            id_column,
            reference_id,
            output,
        } => commands::analyze::run(commands::analyze::AnalyzeCommandConfig {
            database: &database,
            table: &table,
            column: &column,
            id_column: &id_column,
            reference_id,
            output_path: output.as_deref(),
        }),
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
