//! Digest lookup CLI
//!
//! Usage: rainc_search <TABLE> [-s <DIGEST>] [--index tree|hash]
//!
//! Without `-s`, digests are read from stdin, one per line, until end of input.
//!
//! Example:
//!   rainc_search rainbowTAB.t3c -s 7c4b7e570b75...
//!   echo "7c4b7e57..." | rainc_search rainbowTAB.t3c

mod common;

use clap::Parser;
use common::{StageProgress, init_tracing};
use rainc_table::{IndexKind, LookupConfig, LookupOutcome, TableError, resolve_with_progress};
use std::io::{self, IsTerminal};
use std::path::PathBuf;

const NOT_FOUND_MESSAGE: &str = "Digest not found in table";

#[derive(Parser, Debug)]
#[command(name = "rainc_search")]
#[command(about = "Resolve digests to plaintexts using a T3C lookup table")]
struct Args {
    /// Table file produced by rainc_create
    table: PathBuf,

    /// Digest to resolve (reads digests from stdin when omitted)
    #[arg(short = 's', long)]
    digest: Option<String>,

    /// Index structure built over the table
    #[arg(long, default_value_t = IndexKind::Tree)]
    index: IndexKind,

    /// Load the table through a memory map (needs the `mmap` feature)
    #[arg(long)]
    mmap: bool,

    /// Disable the loading progress bar
    #[arg(long)]
    no_progress: bool,
}

fn format_table_error(err: &TableError) -> String {
    match err {
        TableError::EmptyInput { path } => format!(
            "'{}' has no usable entries.\nRegenerate it with rainc_create.",
            path.display()
        ),
        TableError::Io { path, source } => format!(
            "Cannot read '{}': {}.\nCheck the path and file permissions.",
            path.display(),
            source
        ),
        other => other.to_string(),
    }
}

fn lookup_config(args: &Args) -> LookupConfig {
    let config = LookupConfig::new(&args.table).with_index(args.index);
    #[cfg(feature = "mmap")]
    let config = LookupConfig {
        mapped: args.mmap,
        ..config
    };
    #[cfg(not(feature = "mmap"))]
    if args.mmap {
        tracing::warn!("built without mmap support, --mmap ignored");
    }
    config
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let config = lookup_config(&args);

    let stdin = io::stdin();
    let interactive = args.digest.is_none() && stdin.is_terminal();
    if interactive {
        eprintln!("Enter digests, one per line (end with Ctrl+D):");
    }

    let mut progress = StageProgress::new(!args.no_progress && !interactive);
    let result = resolve_with_progress(
        &config,
        args.digest.as_deref(),
        stdin.lock(),
        |loaded, expected| progress.update("loading table", loaded, expected),
        |digest, outcome| match outcome {
            LookupOutcome::Found(record) => println!("{}", record.plaintext()),
            LookupOutcome::NotFound => println!("{}: {}", NOT_FOUND_MESSAGE, digest),
        },
    );
    progress.finish();

    match result {
        Ok(summary) => {
            if args.digest.is_none() {
                eprintln!(
                    "Resolved {} of {} digest(s).",
                    summary.hits, summary.queries
                );
            }
        }
        Err(e) => {
            eprintln!("Error: {}", format_table_error(&e));
            std::process::exit(1);
        }
    }
}
