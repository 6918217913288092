//! Table generation workflow
//!
//! This module turns a newline-delimited wordlist into a table of
//! (digest, word) records and writes it to disk.

use crate::constants::{GENERATION_BATCH_SIZE, progress_interval};
use crate::domain::digest::DigestAlgorithm;
use crate::domain::table::Table;
use crate::error::TableError;
use crate::infra::lines::LineReader;
use crate::infra::table_io::save_table_with_progress;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Generation workflow settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Wordlist to hash, one word per line
    pub wordlist: PathBuf,
    /// Table file to write
    pub output: PathBuf,
    /// Digest algorithm applied to every word
    pub algorithm: DigestAlgorithm,
}

/// Workflow stage reported to progress callbacks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Hashing wordlist entries into the table
    Hashing,
    /// Writing the table file
    Writing,
}

/// Result of a successful generation run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Records written to the table file
    pub records: usize,
    pub output: PathBuf,
    pub algorithm: DigestAlgorithm,
}

/// Count non-empty lines of a wordlist
pub fn count_words<R: BufRead>(reader: R) -> io::Result<usize> {
    let mut lines = LineReader::new(reader);
    let mut count = 0;
    while let Some(word) = lines.next_line_bytes()? {
        if !word.is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

/// Generate a table from a wordlist file
pub fn generate_table(
    wordlist: impl AsRef<Path>,
    algorithm: DigestAlgorithm,
) -> Result<Table, TableError> {
    generate_table_with_progress(wordlist, algorithm, |_, _| {})
}

/// Generate table with progress callback
pub fn generate_table_with_progress<F>(
    wordlist: impl AsRef<Path>,
    algorithm: DigestAlgorithm,
    on_progress: F,
) -> Result<Table, TableError>
where
    F: FnMut(usize, usize), // (hashed, total)
{
    let path = wordlist.as_ref();
    let file = File::open(path).map_err(|e| TableError::io(path, e))?;
    hash_wordlist(BufReader::new(file), path, algorithm, on_progress)
}

/// Hash every non-empty line of a rewindable reader into a new table
///
/// Digests cover the raw bytes of each line; the stored plaintext is the line
/// decoded lossily, so a non-UTF-8 word shows U+FFFD in place of its invalid
/// bytes. Words are hashed in batches on the rayon pool; records are appended
/// in wordlist order. `path` is only used for error reporting.
pub fn hash_wordlist<R, F>(
    mut reader: R,
    path: &Path,
    algorithm: DigestAlgorithm,
    mut on_progress: F,
) -> Result<Table, TableError>
where
    R: BufRead + Seek,
    F: FnMut(usize, usize),
{
    let io_err = |e: io::Error| TableError::io(path, e);

    let total = count_words(&mut reader).map_err(io_err)?;
    reader.rewind().map_err(io_err)?;
    debug!(path = %path.display(), total, "counted wordlist entries");

    if total == 0 {
        return Err(TableError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    let mut table = Table::with_capacity(total)?;
    let interval = progress_interval(total);
    let mut next_report = interval;

    let mut batch: Vec<Vec<u8>> = Vec::with_capacity(GENERATION_BATCH_SIZE.min(total));
    let mut lines = LineReader::new(reader);

    loop {
        let word = lines.next_line_bytes().map_err(io_err)?;
        let exhausted = word.is_none();

        if let Some(word) = word
            && !word.is_empty()
        {
            batch.push(word.to_vec());
        }

        if batch.len() >= GENERATION_BATCH_SIZE || (exhausted && !batch.is_empty()) {
            let digests: Vec<String> = batch
                .par_iter()
                .map(|word| algorithm.digest_hex(word))
                .collect();

            for (word, digest_hex) in batch.iter().zip(&digests) {
                table.add(&String::from_utf8_lossy(word), digest_hex)?;
            }
            batch.clear();

            let hashed = table.len();
            if hashed >= next_report || hashed == total {
                on_progress(hashed, total);
                next_report = (hashed / interval + 1) * interval;
            }
        }

        if exhausted {
            break;
        }
    }

    info!(path = %path.display(), records = table.len(), %algorithm, "wordlist hashed");
    Ok(table)
}

/// Run the whole generation workflow: hash the wordlist, then write the table
pub fn run_generation<F>(
    config: &GenerateConfig,
    mut on_progress: F,
) -> Result<GenerateSummary, TableError>
where
    F: FnMut(Stage, usize, usize),
{
    let table = generate_table_with_progress(&config.wordlist, config.algorithm, |done, total| {
        on_progress(Stage::Hashing, done, total)
    })?;

    save_table_with_progress(
        &config.output,
        &table,
        config.algorithm.label(),
        |done, total| on_progress(Stage::Writing, done, total),
    )?;

    Ok(GenerateSummary {
        records: table.len(),
        output: config.output.clone(),
        algorithm: config.algorithm,
    })
}
