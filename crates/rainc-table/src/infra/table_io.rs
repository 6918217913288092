//! Table file I/O operations
//!
//! This module provides functions for reading and writing T3C table files.
//!
//! Loading makes two passes over the file: the first counts the lines that
//! look like entries so the table can be reserved at its exact size, the
//! second parses and appends them. Tab-containing lines with an empty field
//! are counted by the first pass but skipped by the second, so a loaded table
//! may hold fewer records than its capacity.

use crate::constants::{FIELD_SEPARATOR, progress_interval};
use crate::domain::table::Table;
use crate::domain::table_format::{LineKind, TableHeader, is_countable_line, parse_line};
use crate::error::TableError;
use crate::infra::lines::LineReader;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Seek, Write};
use std::path::Path;
use tracing::{debug, info, warn};

#[cfg(feature = "mmap")]
use memmap2::Mmap;

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    Ok(())
}

/// Save table to file
///
/// Writes the header line followed by one `digest<TAB>plaintext` line per
/// record, in table order.
pub fn save_table(
    path: impl AsRef<Path>,
    table: &Table,
    algorithm: &str,
) -> Result<(), TableError> {
    save_table_with_progress(path, table, algorithm, |_, _| {})
}

/// Save table with progress callback
///
/// A failure in the middle of the file leaves the partial file in place.
pub fn save_table_with_progress<F>(
    path: impl AsRef<Path>,
    table: &Table,
    algorithm: &str,
    mut on_progress: F,
) -> Result<(), TableError>
where
    F: FnMut(usize, usize), // (written, total)
{
    let path = path.as_ref();
    let io_err = |e: io::Error| TableError::io(path, e);

    ensure_parent_dir(path).map_err(io_err)?;
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", TableHeader::new(algorithm).to_line()).map_err(io_err)?;

    let total = table.len();
    let interval = progress_interval(total);
    for (i, record) in table.iter().enumerate() {
        writeln!(
            writer,
            "{}{}{}",
            record.digest_hex(),
            FIELD_SEPARATOR,
            record.plaintext()
        )
        .map_err(io_err)?;

        let written = i + 1;
        if written % interval == 0 || written == total {
            on_progress(written, total);
        }
    }

    writer.flush().map_err(io_err)?;
    info!(path = %path.display(), records = total, algorithm, "table saved");
    Ok(())
}

/// Load table from file
pub fn load_table(path: impl AsRef<Path>) -> Result<Table, TableError> {
    load_table_with_progress(path, |_, _| {}).map(|(_, table)| table)
}

/// Load table and its header
///
/// The header is `None` when the file has no T3C header line.
pub fn load_table_with_header(
    path: impl AsRef<Path>,
) -> Result<(Option<TableHeader>, Table), TableError> {
    load_table_with_progress(path, |_, _| {})
}

/// Load table with progress callback
///
/// # Errors
///
/// - [`TableError::Io`] if the file cannot be opened or read
/// - [`TableError::EmptyInput`] if no line looks like an entry
/// - [`TableError::LoadFailure`] if a record cannot be appended; the partial
///   table is dropped
pub fn load_table_with_progress<F>(
    path: impl AsRef<Path>,
    on_progress: F,
) -> Result<(Option<TableHeader>, Table), TableError>
where
    F: FnMut(usize, usize), // (loaded, expected)
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| TableError::io(path, e))?;
    read_table(BufReader::new(file), path, on_progress)
}

/// Count lines the second pass will try to parse as entries
pub fn count_valid_lines<R: BufRead>(reader: R) -> io::Result<usize> {
    let mut lines = LineReader::new(reader);
    let mut count = 0;
    while let Some(line) = lines.next_line()? {
        if is_countable_line(&line) {
            count += 1;
        }
    }
    Ok(count)
}

/// Parse a whole table from a rewindable reader
///
/// `path` is only used for error reporting.
pub fn read_table<R, F>(
    mut reader: R,
    path: &Path,
    mut on_progress: F,
) -> Result<(Option<TableHeader>, Table), TableError>
where
    R: BufRead + Seek,
    F: FnMut(usize, usize),
{
    let io_err = |e: io::Error| TableError::io(path, e);

    // Pass 1: size the table
    let capacity = count_valid_lines(&mut reader).map_err(io_err)?;
    reader.rewind().map_err(io_err)?;
    debug!(path = %path.display(), capacity, "counted candidate lines");

    if capacity == 0 {
        return Err(TableError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    let mut table = Table::with_capacity(capacity)?;

    // Pass 2: parse and append
    let mut header = None;
    let mut skipped = 0usize;
    let mut line_number = 0usize;
    let interval = progress_interval(capacity);
    let mut lines = LineReader::new(reader);

    while let Some(line) = lines.next_line().map_err(io_err)? {
        line_number += 1;
        match parse_line(&line) {
            LineKind::Blank => {}
            LineKind::Comment => {
                if header.is_none() {
                    header = TableHeader::from_line(&line);
                }
            }
            LineKind::Entry {
                digest_hex,
                plaintext,
            } => {
                table
                    .add(plaintext, digest_hex)
                    .map_err(|source| TableError::LoadFailure {
                        path: path.to_path_buf(),
                        source: Box::new(source),
                    })?;

                let loaded = table.len();
                if loaded % interval == 0 || loaded == capacity {
                    on_progress(loaded, capacity);
                }
            }
            LineKind::Malformed(reason) => {
                skipped += 1;
                debug!(line = line_number, ?reason, "skipping malformed line");
            }
        }
    }

    if table.len() < capacity {
        warn!(
            path = %path.display(),
            loaded = table.len(),
            counted = capacity,
            "some counted lines had an empty field and were skipped"
        );
    }
    info!(
        path = %path.display(),
        records = table.len(),
        skipped,
        algorithm = header.as_ref().map(|h: &TableHeader| h.algorithm.as_str()),
        "table loaded"
    );

    Ok((header, table))
}

// =============================================================================
// Memory-mapped table loading (mmap feature)
// =============================================================================

/// Load table and header through a memory-mapped view of the file
///
/// Runs the same two passes as [`load_table_with_progress`] without going
/// through a read buffer.
#[cfg(feature = "mmap")]
pub fn load_table_mapped(
    path: impl AsRef<Path>,
) -> Result<(Option<TableHeader>, Table), TableError> {
    let path = path.as_ref();
    let io_err = |e: io::Error| TableError::io(path, e);

    let file = File::open(path).map_err(io_err)?;
    if file.metadata().map_err(io_err)?.len() == 0 {
        return Err(TableError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    // The mapping is dropped before this function returns and the table only
    // holds copies of its bytes.
    let mmap = unsafe { Mmap::map(&file) }.map_err(io_err)?;
    read_table(io::Cursor::new(&mmap[..]), path, |_, _| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_table() -> Table {
        let mut table = Table::with_capacity(3).unwrap();
        table.add("pass1", "aaaa").unwrap();
        table.add("with\ttab", "bbbb").unwrap();
        table.add("pass3", "cccc").unwrap();
        table
    }

    fn pairs(table: &Table) -> Vec<(String, String)> {
        table
            .iter()
            .map(|r| (r.digest_hex().to_string(), r.plaintext().to_string()))
            .collect()
    }

    #[test]
    fn test_save_and_load_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.t3c");
        let table = sample_table();

        save_table(&path, &table, "sha256").expect("Failed to save");
        let (header, loaded) = load_table_with_header(&path).expect("Failed to load");

        assert_eq!(header, Some(TableHeader::new("sha256")));
        assert_eq!(pairs(&table), pairs(&loaded));
        assert_eq!(loaded.capacity(), 3);
    }

    #[test]
    fn test_file_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layout.t3c");

        save_table(&path, &sample_table(), "sha512").unwrap();
        let text = fs::read_to_string(&path).unwrap();

        assert_eq!(
            text,
            "# T3C\talgo=sha512\tCols: hash\tdisplay\n\
             aaaa\tpass1\n\
             bbbb\twith\ttab\n\
             cccc\tpass3\n"
        );
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lab").join("nested").join("table.t3c");

        save_table(&path, &sample_table(), "sha256").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_to_unwritable_path() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened as a file
        let result = save_table(dir.path(), &sample_table(), "sha256");
        assert!(matches!(result, Err(TableError::Io { .. })));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_table("/nonexistent/path/table.t3c");
        assert!(matches!(result, Err(TableError::Io { .. })));
    }

    #[test]
    fn test_load_header_only_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.t3c");
        save_table(&path, &Table::new(), "sha256").unwrap();

        let result = load_table(&path);
        assert!(matches!(result, Err(TableError::EmptyInput { .. })));
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mixed.t3c");
        fs::write(
            &path,
            "# T3C\talgo=sha256\tCols: hash\tdisplay\n\
             \n\
             #comment\n\
             no separator here\n\
             abc\t \n\
             deadbeef\tpass1\r\n\
             \tmissing digest\n\
             cafe\t  padded\n",
        )
        .unwrap();

        let table = load_table(&path).unwrap();

        // Two tab-containing lines with an empty field were counted, then skipped
        assert_eq!(table.capacity(), 4);
        assert_eq!(table.len(), 2);
        assert_eq!(
            pairs(&table),
            vec![
                ("deadbeef".to_string(), "pass1".to_string()),
                ("cafe".to_string(), "padded".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_without_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bare.t3c");
        fs::write(&path, "deadbeef\tpass1").unwrap();

        let (header, table) = load_table_with_header(&path).unwrap();
        assert_eq!(header, None);
        assert_eq!(table.len(), 1);
    }

    /// Reader whose content changes once it is rewound
    struct RewriteOnRewind {
        cursor: io::Cursor<&'static [u8]>,
        after_rewind: &'static [u8],
    }

    impl io::Read for RewriteOnRewind {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            io::Read::read(&mut self.cursor, buf)
        }
    }

    impl BufRead for RewriteOnRewind {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            self.cursor.fill_buf()
        }

        fn consume(&mut self, amt: usize) {
            self.cursor.consume(amt)
        }
    }

    impl Seek for RewriteOnRewind {
        fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
            self.cursor = io::Cursor::new(self.after_rewind);
            self.cursor.seek(pos)
        }
    }

    #[test]
    fn test_load_aborts_when_second_pass_overflows() {
        let reader = RewriteOnRewind {
            cursor: io::Cursor::new(&b"aaaa\tpass1\n"[..]),
            after_rewind: b"aaaa\tpass1\nbbbb\tpass2\n",
        };

        let result = read_table(reader, Path::new("grown.t3c"), |_, _| {});

        match result {
            Err(TableError::LoadFailure { path, source }) => {
                assert_eq!(path, Path::new("grown.t3c"));
                assert!(matches!(
                    *source,
                    TableError::CapacityExceeded {
                        count: 1,
                        capacity: 1
                    }
                ));
            }
            other => panic!("expected LoadFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_count_valid_lines() {
        let input = "# T3C\talgo=x\nabc\tdef\n\nno tab\nabc\t \n";
        assert_eq!(count_valid_lines(input.as_bytes()).unwrap(), 2);
    }

    #[test]
    fn test_progress_reaches_total() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.t3c");
        let table = sample_table();

        let mut saved = Vec::new();
        save_table_with_progress(&path, &table, "sha256", |done, total| {
            saved.push((done, total))
        })
        .unwrap();
        assert_eq!(saved.last(), Some(&(3, 3)));

        let mut loaded = Vec::new();
        load_table_with_progress(&path, |done, total| loaded.push((done, total))).unwrap();
        assert_eq!(loaded, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[cfg(feature = "mmap")]
    #[test]
    fn test_mapped_load_matches_buffered_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapped.t3c");
        save_table(&path, &sample_table(), "blake2b512").unwrap();

        let (mapped_header, mapped) = load_table_mapped(&path).unwrap();
        let (header, buffered) = load_table_with_header(&path).unwrap();

        assert_eq!(mapped_header, header);
        assert_eq!(pairs(&mapped), pairs(&buffered));
    }

    #[cfg(feature = "mmap")]
    #[test]
    fn test_mapped_load_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zero.t3c");
        fs::write(&path, "").unwrap();

        let result = load_table_mapped(&path);
        assert!(matches!(result, Err(TableError::EmptyInput { .. })));
    }
}
