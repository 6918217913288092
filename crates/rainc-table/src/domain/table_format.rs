//! T3C table file format definitions
//!
//! A table file is line oriented text:
//!
//! ```text
//! # T3C<TAB>algo=sha256<TAB>Cols: hash<TAB>display
//! <digest_hex><TAB><plaintext>
//! ...
//! ```
//!
//! Only the first tab on a line separates the fields, so plaintexts may
//! contain tabs. Lines starting with `#` and blank lines are ignored on read.

use crate::constants::{
    COMMENT_PREFIX, FIELD_SEPARATOR, FORMAT_MAGIC, HEADER_ALGORITHM_KEY, HEADER_COLUMNS,
};

/// Table file header metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableHeader {
    /// Label of the algorithm that produced the digests (informational only)
    pub algorithm: String,
}

impl TableHeader {
    /// Create a header for the given algorithm label
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
        }
    }

    /// Serialize header to its line form (without the trailing newline)
    pub fn to_line(&self) -> String {
        format!(
            "{COMMENT_PREFIX} {FORMAT_MAGIC}{FIELD_SEPARATOR}{HEADER_ALGORITHM_KEY}{}{FIELD_SEPARATOR}{HEADER_COLUMNS}",
            self.algorithm
        )
    }

    /// Parse a header line
    ///
    /// Returns `None` if the line is not a T3C header. A header without an
    /// algorithm field yields an empty label.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = trim_line_end(line);
        let rest = line.strip_prefix(COMMENT_PREFIX)?.trim_start();

        let mut fields = rest.split(FIELD_SEPARATOR);
        if fields.next()?.trim() != FORMAT_MAGIC {
            return None;
        }

        let algorithm = fields
            .find_map(|field| field.trim().strip_prefix(HEADER_ALGORITHM_KEY))
            .unwrap_or_default();

        Some(Self::new(algorithm))
    }
}

/// Why a line or record was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Malformed {
    /// No field separator on the line
    #[error("missing field separator")]
    MissingSeparator,
    /// Nothing left of the separator
    #[error("empty digest")]
    EmptyDigest,
    /// Plaintext is empty once leading blanks are removed
    #[error("empty plaintext")]
    EmptyPlaintext,
    /// Digest holds a field separator and would split differently on read
    #[error("field separator in digest")]
    SeparatorInDigest,
    /// A field holds a newline and would span two lines on disk
    #[error("line break in field")]
    LineBreak,
}

/// Classification of one table line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty after trimming the line ending
    Blank,
    /// Starts with `#` (includes the header)
    Comment,
    /// A usable entry
    Entry {
        digest_hex: &'a str,
        plaintext: &'a str,
    },
    /// Skipped entry
    Malformed(Malformed),
}

/// Strip trailing `\n` / `\r` characters
#[inline]
pub fn trim_line_end(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Whether the counting pass should reserve a slot for this line
///
/// A line counts when, after trimming its ending, it is non-empty, is not a
/// comment and contains at least one separator. Lines counted here may still
/// be rejected by [`parse_line`] when one of their fields is empty.
pub fn is_countable_line(line: &str) -> bool {
    let line = trim_line_end(line);
    !line.is_empty() && !line.starts_with(COMMENT_PREFIX) && line.contains(FIELD_SEPARATOR)
}

/// Classify a line and split it into its fields
pub fn parse_line(line: &str) -> LineKind<'_> {
    let line = trim_line_end(line);

    if line.is_empty() {
        return LineKind::Blank;
    }
    if line.starts_with(COMMENT_PREFIX) {
        return LineKind::Comment;
    }

    let Some((digest_hex, trailer)) = line.split_once(FIELD_SEPARATOR) else {
        return LineKind::Malformed(Malformed::MissingSeparator);
    };
    let plaintext = trim_line_end(trailer).trim_start_matches([' ', '\t']);

    match check_fields(digest_hex, plaintext) {
        Ok(()) => LineKind::Entry {
            digest_hex,
            plaintext,
        },
        Err(reason) => LineKind::Malformed(reason),
    }
}

/// Check that a record's fields can be written as one entry line
///
/// Both fields must be non-empty and newline free; the digest must not hold a
/// separator.
pub fn check_fields(digest_hex: &str, plaintext: &str) -> Result<(), Malformed> {
    if digest_hex.is_empty() {
        return Err(Malformed::EmptyDigest);
    }
    if digest_hex.contains(FIELD_SEPARATOR) {
        return Err(Malformed::SeparatorInDigest);
    }
    if plaintext.is_empty() {
        return Err(Malformed::EmptyPlaintext);
    }
    if digest_hex.contains('\n') || plaintext.contains('\n') {
        return Err(Malformed::LineBreak);
    }
    Ok(())
}
