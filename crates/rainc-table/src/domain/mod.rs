//! Domain layer - Pure data structures and algorithms
//!
//! This module contains the record container, the file format rules, the
//! search index and digest computation, without file I/O.

pub mod digest;
pub mod index;
pub mod record;
pub mod table;
pub mod table_format;
