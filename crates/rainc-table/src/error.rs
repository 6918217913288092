//! Error types shared by the table, codec, index and lookup layers

use crate::domain::table_format::Malformed;
use std::collections::TryReserveError;
use std::path::PathBuf;

/// Errors raised while building, persisting or querying a lookup table
///
/// A lookup miss is not an error; see [`crate::app::lookup::LookupOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Opening, reading or writing a file failed
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the digest query stream failed
    #[error("failed to read query input: {0}")]
    QueryInput(#[source] std::io::Error),

    /// Memory for records, strings or index nodes could not be obtained
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// The input contained no usable line
    #[error("'{}' contains no valid entries", .path.display())]
    EmptyInput { path: PathBuf },

    /// `add` called on a full table
    #[error("table capacity exceeded (count={count}, capacity={capacity})")]
    CapacityExceeded { count: usize, capacity: usize },

    /// A record field cannot be written back as one entry line
    #[error("invalid record: {0}")]
    InvalidRecord(Malformed),

    /// Bulk load aborted; the partially built table was discarded
    #[error("failed to load table from '{}': {source}", .path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: Box<TableError>,
    },
}

impl TableError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Digest computation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    /// The label is not in the algorithm whitelist
    #[error("unsupported digest algorithm '{0}' (supported: sha256, sha512, blake2b512, sha3-256)")]
    UnsupportedAlgorithm(String),
}
