//! Lookup workflow implementation
//!
//! Loads a table, builds an index over it and resolves digests, either a
//! single one or a stream of them (one per line). The index borrows the
//! loaded table, so it is always torn down first.

use crate::domain::index::{DigestIndex, IndexKind};
use crate::domain::record::Record;
use crate::domain::table::Table;
use crate::domain::table_format::{TableHeader, trim_line_end};
use crate::error::TableError;
use crate::infra::lines::LineReader;
use crate::infra::table_io::load_table_with_progress;
use std::io::BufRead;
use std::path::PathBuf;
use tracing::info;

#[cfg(feature = "mmap")]
use crate::infra::table_io::load_table_mapped;

/// Lookup workflow settings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LookupConfig {
    /// Table file to query
    pub table_path: PathBuf,
    /// Index structure built over the loaded table
    pub index: IndexKind,
    /// Read the table through a memory map instead of a buffered reader
    #[cfg(feature = "mmap")]
    pub mapped: bool,
}

impl LookupConfig {
    /// Config with the default index for `table_path`
    pub fn new(table_path: impl Into<PathBuf>) -> Self {
        Self {
            table_path: table_path.into(),
            ..Self::default()
        }
    }

    /// Use a different index structure
    pub fn with_index(mut self, index: IndexKind) -> Self {
        self.index = index;
        self
    }
}

/// Result of one query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupOutcome<'a> {
    /// The digest is in the table
    Found(&'a Record),
    /// The digest is not in the table (not an error)
    NotFound,
}

impl<'a> LookupOutcome<'a> {
    /// Recovered plaintext, if any
    pub fn plaintext(&self) -> Option<&'a str> {
        match *self {
            Self::Found(record) => Some(record.plaintext()),
            Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Counts of one lookup run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LookupSummary {
    /// Digests queried (empty input lines are not queries)
    pub queries: usize,
    /// Queries that found a plaintext
    pub hits: usize,
}

impl LookupSummary {
    fn record(&mut self, outcome: &LookupOutcome<'_>) {
        self.queries += 1;
        if outcome.is_found() {
            self.hits += 1;
        }
    }

    /// Queries that found nothing
    pub fn misses(&self) -> usize {
        self.queries - self.hits
    }
}

/// A loaded table ready to be indexed and queried
#[derive(Debug)]
pub struct LookupSession {
    header: Option<TableHeader>,
    table: Table,
}

impl LookupSession {
    /// Load the table named by `config`
    pub fn open(config: &LookupConfig) -> Result<Self, TableError> {
        Self::open_with_progress(config, |_, _| {})
    }

    /// Load the table with a progress callback
    ///
    /// The callback is not invoked for memory-mapped loads.
    pub fn open_with_progress<F>(config: &LookupConfig, on_progress: F) -> Result<Self, TableError>
    where
        F: FnMut(usize, usize),
    {
        #[cfg(feature = "mmap")]
        let (header, table) = if config.mapped {
            load_table_mapped(&config.table_path)?
        } else {
            load_table_with_progress(&config.table_path, on_progress)?
        };
        #[cfg(not(feature = "mmap"))]
        let (header, table) = load_table_with_progress(&config.table_path, on_progress)?;

        Ok(Self { header, table })
    }

    /// Header of the loaded file, if it had one
    pub fn header(&self) -> Option<&TableHeader> {
        self.header.as_ref()
    }

    /// The loaded table
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Build an index borrowing this session's table
    pub fn index(&self, kind: IndexKind) -> Result<Box<dyn DigestIndex + '_>, TableError> {
        let index = kind.build(&self.table)?;
        info!(
            index = %kind,
            records = self.table.len(),
            distinct = index.len(),
            "index built"
        );
        Ok(index)
    }
}

/// Look up one digest
///
/// Trailing line endings are ignored.
pub fn query<'i>(index: &'i dyn DigestIndex, digest_hex: &str) -> LookupOutcome<'i> {
    match index.lookup(trim_line_end(digest_hex)) {
        Some(record) => LookupOutcome::Found(record),
        None => LookupOutcome::NotFound,
    }
}

/// Look up every digest of a line stream until it ends
///
/// Empty lines are skipped. `on_result` is called once per query, in input
/// order.
pub fn query_stream<R, F>(
    index: &dyn DigestIndex,
    input: R,
    mut on_result: F,
) -> Result<LookupSummary, TableError>
where
    R: BufRead,
    F: FnMut(&str, LookupOutcome<'_>),
{
    let mut summary = LookupSummary::default();
    let mut lines = LineReader::new(input);

    while let Some(line) = lines.next_line().map_err(TableError::QueryInput)? {
        let digest_hex = trim_line_end(&line);
        if digest_hex.is_empty() {
            continue;
        }

        let outcome = query(index, digest_hex);
        summary.record(&outcome);
        on_result(digest_hex, outcome);
    }

    Ok(summary)
}

/// Resolve digests against a table file
///
/// With `digest` set (and non-empty) a single lookup is made; otherwise
/// digests are read from `input` until it ends. Load and index failures are
/// returned as errors; misses are reported through `on_result` as
/// [`LookupOutcome::NotFound`].
pub fn resolve<R, F>(
    config: &LookupConfig,
    digest: Option<&str>,
    input: R,
    on_result: F,
) -> Result<LookupSummary, TableError>
where
    R: BufRead,
    F: FnMut(&str, LookupOutcome<'_>),
{
    resolve_with_progress(config, digest, input, |_, _| {}, on_result)
}

/// Resolve digests with a table loading progress callback
pub fn resolve_with_progress<R, P, F>(
    config: &LookupConfig,
    digest: Option<&str>,
    input: R,
    on_load_progress: P,
    mut on_result: F,
) -> Result<LookupSummary, TableError>
where
    R: BufRead,
    P: FnMut(usize, usize), // (loaded, expected)
    F: FnMut(&str, LookupOutcome<'_>),
{
    let session = LookupSession::open_with_progress(config, on_load_progress)?;
    let index = session.index(config.index)?;

    let single = digest.map(trim_line_end).filter(|d| !d.is_empty());
    let summary = match single {
        Some(digest_hex) => {
            let outcome = query(index.as_ref(), digest_hex);
            let mut summary = LookupSummary::default();
            summary.record(&outcome);
            on_result(digest_hex, outcome);
            summary
        }
        None => query_stream(index.as_ref(), input, on_result)?,
    };

    info!(
        queries = summary.queries,
        hits = summary.hits,
        "lookup finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::table_io::save_table;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn write_table(dir: &TempDir, lines: &str) -> PathBuf {
        let path = dir.path().join("table.t3c");
        std::fs::write(&path, lines).unwrap();
        path
    }

    fn collect(
        config: &LookupConfig,
        digest: Option<&str>,
        input: &str,
    ) -> (LookupSummary, Vec<(String, Option<String>)>) {
        let mut results = Vec::new();
        let summary = resolve(config, digest, Cursor::new(input), |d, outcome| {
            results.push((d.to_string(), outcome.plaintext().map(str::to_string)))
        })
        .unwrap();
        (summary, results)
    }

    #[test]
    fn test_resolve_single_hit_and_miss() {
        let dir = TempDir::new().unwrap();
        let path = write_table(&dir, "# T3C\talgo=sha256\naaaa\tpass1\nbbbb\tpass2\n");
        let config = LookupConfig::new(&path);

        let (summary, results) = collect(&config, Some("bbbb"), "");
        assert_eq!(summary, LookupSummary { queries: 1, hits: 1 });
        assert_eq!(results, vec![("bbbb".to_string(), Some("pass2".to_string()))]);

        let (summary, results) = collect(&config, Some("ffff"), "");
        assert_eq!(summary.misses(), 1);
        assert_eq!(results, vec![("ffff".to_string(), None)]);
    }

    #[test]
    fn test_resolve_stream() {
        let dir = TempDir::new().unwrap();
        let path = write_table(&dir, "aaaa\tpass1\nbbbb\tpass2\naaaa\tshadowed\n");
        let config = LookupConfig::new(&path);

        let (summary, results) = collect(&config, None, "aaaa\n\nffff\r\nbbbb");
        assert_eq!(summary, LookupSummary { queries: 3, hits: 2 });
        assert_eq!(
            results,
            vec![
                ("aaaa".to_string(), Some("pass1".to_string())),
                ("ffff".to_string(), None),
                ("bbbb".to_string(), Some("pass2".to_string())),
            ]
        );
    }

    #[test]
    fn test_empty_single_digest_reads_stream() {
        let dir = TempDir::new().unwrap();
        let path = write_table(&dir, "aaaa\tpass1\n");
        let config = LookupConfig::new(&path);

        let (summary, _) = collect(&config, Some(""), "aaaa\naaaa\n");
        assert_eq!(summary.queries, 2);
    }

    #[test]
    fn test_resolve_empty_table_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_table(&dir, "# T3C\talgo=sha256\n\n");
        let config = LookupConfig::new(&path);

        let result = resolve(&config, Some("aaaa"), Cursor::new(""), |_, _| {});
        assert!(matches!(result, Err(TableError::EmptyInput { .. })));
    }

    #[test]
    fn test_resolve_missing_table_is_error() {
        let config = LookupConfig::new("/nonexistent/table.t3c");
        let result = resolve(&config, Some("aaaa"), Cursor::new(""), |_, _| {});
        assert!(matches!(result, Err(TableError::Io { .. })));
    }

    #[test]
    fn test_session_exposes_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.t3c");
        let mut table = Table::with_capacity(1).unwrap();
        table.add("pass1", "aaaa").unwrap();
        save_table(&path, &table, "sha3-256").unwrap();

        let session = LookupSession::open(&LookupConfig::new(&path)).unwrap();
        assert_eq!(session.header().map(|h| h.algorithm.as_str()), Some("sha3-256"));

        let index = session.index(IndexKind::Tree).unwrap();
        assert_eq!(query(index.as_ref(), "aaaa\n").plaintext(), Some("pass1"));
    }

    #[cfg(feature = "hashmap-search")]
    #[test]
    fn test_resolve_with_hash_index() {
        let dir = TempDir::new().unwrap();
        let path = write_table(&dir, "aaaa\tpass1\naaaa\tshadowed\n");
        let config = LookupConfig::new(&path).with_index(IndexKind::Hash);

        let (_, results) = collect(&config, Some("aaaa"), "");
        assert_eq!(results, vec![("aaaa".to_string(), Some("pass1".to_string()))]);
    }

    #[cfg(feature = "mmap")]
    #[test]
    fn test_resolve_mapped() {
        let dir = TempDir::new().unwrap();
        let path = write_table(&dir, "aaaa\tpass1\n");
        let config = LookupConfig {
            mapped: true,
            ..LookupConfig::new(&path)
        };

        let (summary, _) = collect(&config, Some("aaaa"), "");
        assert_eq!(summary.hits, 1);
    }
}
