//! Lookup table creation CLI
//!
//! Usage: rainc_create <WORDLIST> [-o <OUT>] [-a <ALGO>]
//!
//! Example: rainc_create dict.txt -o rainbowTAB.t3c -a sha256

mod common;

use clap::Parser;
use common::{StageProgress, init_tracing};
use rainc_table::app::generator::Stage;
use rainc_table::{
    DEFAULT_ALGORITHM, DEFAULT_TABLE_PATH, DigestAlgorithm, GenerateConfig, run_generation,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "rainc_create")]
#[command(about = "Build a T3C digest -> plaintext lookup table from a wordlist")]
struct Args {
    /// Wordlist with one plaintext per line
    wordlist: PathBuf,

    /// Output table file
    #[arg(short, long, default_value = DEFAULT_TABLE_PATH)]
    output: PathBuf,

    /// Digest algorithm: sha256 | sha512 | blake2b512 | sha3-256
    #[arg(short, long, default_value = DEFAULT_ALGORITHM)]
    algorithm: DigestAlgorithm,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Hashing => "hashing",
        Stage::Writing => "writing table",
    }
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let config = GenerateConfig {
        wordlist: args.wordlist,
        output: args.output,
        algorithm: args.algorithm,
    };

    println!(
        "Generating {} table from {}...",
        config.algorithm,
        config.wordlist.display()
    );
    let start = Instant::now();

    let mut progress = StageProgress::new(!args.no_progress);
    let result = run_generation(&config, |stage, done, total| {
        progress.update(stage_label(stage), done, total)
    });
    progress.finish();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Done! {} entries written to {} with {} in {:.2} seconds",
        summary.records,
        summary.output.display(),
        summary.algorithm,
        start.elapsed().as_secs_f64()
    );
}
