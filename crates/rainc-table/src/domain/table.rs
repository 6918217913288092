//! Capacity-bounded record container
//!
//! The table is sized once with [`Table::reserve`] and then filled with
//! [`Table::add`]. It never grows: callers compute the exact capacity with a
//! counting pass first, so record positions stay stable while a search index
//! refers to them.

use crate::domain::record::Record;
use crate::domain::table_format::{Malformed, check_fields};
use crate::error::TableError;

/// Append-only, capacity-bounded ordered collection of records
///
/// Insertion order is file order. Records in `[0, len)` exist; nothing is
/// stored beyond `len` even when `capacity` is larger.
#[derive(Debug, Default)]
pub struct Table {
    records: Vec<Record>,
    capacity: usize,
}

impl Table {
    /// Create an empty table with capacity 0 (no allocation)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with storage for exactly `capacity` records
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        let mut table = Self::new();
        table.reserve(capacity)?;
        Ok(table)
    }

    /// Allocate storage for exactly `capacity` records
    ///
    /// Any previous contents are released first.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Allocation`] if the storage cannot be obtained.
    /// The table is left empty in that case.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), TableError> {
        self.free();

        let mut records = Vec::new();
        records.try_reserve_exact(capacity)?;

        self.records = records;
        self.capacity = capacity;
        Ok(())
    }

    /// Append a record, copying both strings
    ///
    /// # Errors
    ///
    /// - [`TableError::CapacityExceeded`] if the table is full
    /// - [`TableError::InvalidRecord`] if a field could not be written back as
    ///   one entry line
    /// - [`TableError::Allocation`] if a copy fails; nothing is appended
    pub fn add(&mut self, plaintext: &str, digest_hex: &str) -> Result<(), TableError> {
        if self.records.len() >= self.capacity {
            return Err(TableError::CapacityExceeded {
                count: self.records.len(),
                capacity: self.capacity,
            });
        }
        check_fields(digest_hex, plaintext).map_err(TableError::InvalidRecord)?;

        let record = Record::new(plaintext, digest_hex)?;
        // Storage was reserved up front, this never reallocates
        self.records.push(record);
        Ok(())
    }

    /// Release every record and the backing storage
    ///
    /// Idempotent: calling it on an empty table does nothing.
    pub fn free(&mut self) {
        self.records = Vec::new();
        self.capacity = 0;
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Capacity fixed by the last `reserve`
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether no further record can be added
    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Get a record by position
    ///
    /// Returns `None` if the position is out of bounds.
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// All records in insertion order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Return an iterator over records in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_is_empty() {
        let table = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), 0);
    }

    #[test]
    fn test_add_without_reserve_fails() {
        let mut table = Table::new();
        let result = table.add("pass1", "deadbeef");
        assert!(matches!(
            result,
            Err(TableError::CapacityExceeded {
                count: 0,
                capacity: 0
            })
        ));
    }

    #[test]
    fn test_add_up_to_capacity() {
        let mut table = Table::with_capacity(3).unwrap();

        table.add("a", "01").unwrap();
        table.add("b", "02").unwrap();
        table.add("c", "03").unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.is_full());

        let result = table.add("d", "04");
        assert!(matches!(
            result,
            Err(TableError::CapacityExceeded {
                count: 3,
                capacity: 3
            })
        ));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_add_rejects_unwritable_fields() {
        let mut table = Table::with_capacity(4).unwrap();

        for (plaintext, digest_hex, reason) in [
            ("pass1", "", Malformed::EmptyDigest),
            ("", "deadbeef", Malformed::EmptyPlaintext),
            ("pass1", "dead\tbeef", Malformed::SeparatorInDigest),
            ("two\nlines", "deadbeef", Malformed::LineBreak),
        ] {
            let result = table.add(plaintext, digest_hex);
            assert!(
                matches!(result, Err(TableError::InvalidRecord(r)) if r == reason),
                "{:?}",
                reason
            );
        }

        assert!(table.is_empty());
        table.add("pass\twith tab", "deadbeef").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut table = Table::with_capacity(3).unwrap();
        table.add("zeta", "ff").unwrap();
        table.add("alpha", "00").unwrap();
        table.add("mid", "80").unwrap();

        let plaintexts: Vec<&str> = table.iter().map(|r| r.plaintext()).collect();
        assert_eq!(plaintexts, vec!["zeta", "alpha", "mid"]);
        assert_eq!(table.get(1).map(|r| r.digest_hex()), Some("00"));
        assert_eq!(table.get(3), None);
    }

    #[test]
    fn test_free_is_idempotent() {
        let mut table = Table::with_capacity(2).unwrap();
        table.add("a", "01").unwrap();

        table.free();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 0);

        table.free();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 0);
    }

    #[test]
    fn test_reserve_releases_previous_contents() {
        let mut table = Table::with_capacity(1).unwrap();
        table.add("a", "01").unwrap();

        table.reserve(2).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 2);
    }

    #[test]
    fn test_reserve_zero() {
        let mut table = Table::new();
        table.reserve(0).unwrap();
        assert!(table.is_full());
        assert!(table.add("a", "01").is_err());
    }

    #[test]
    fn test_reserve_impossible_capacity() {
        let mut table = Table::new();
        let result = table.reserve(usize::MAX);
        assert!(matches!(result, Err(TableError::Allocation(_))));
        assert_eq!(table.capacity(), 0);
    }
}
