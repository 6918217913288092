//! rainc-table - Digest to plaintext lookup tables
//!
//! This crate provides functionality to:
//! - Generate a table of (digest, plaintext) records from a wordlist
//! - Persist and load tables in the line-oriented T3C text format
//! - Index a loaded table by digest and resolve digests back to plaintexts

pub mod app;
pub mod constants;
pub mod domain;
pub mod error;
pub mod infra;

// Re-export commonly used types
pub use app::generator::{GenerateConfig, generate_table, run_generation};
pub use app::lookup::{
    LookupConfig, LookupOutcome, LookupSession, LookupSummary, resolve, resolve_with_progress,
};
pub use constants::*;
pub use domain::digest::DigestAlgorithm;
pub use domain::index::{DigestIndex, IndexKind, SearchIndex};
pub use domain::record::Record;
pub use domain::table::Table;
pub use domain::table_format::TableHeader;
pub use error::{DigestError, TableError};
pub use infra::table_io::{load_table, save_table};

#[cfg(feature = "hashmap-search")]
pub use domain::index::HashIndex;
