//! Search index over a populated table
//!
//! [`SearchIndex`] is a plain binary search tree keyed by digest hex, built
//! by inserting records in table order. Nodes live in one arena and refer to
//! records by position; the index borrows the table, so the table cannot be
//! dropped or modified while the index exists.
//!
//! The tree is never rebalanced. Input already sorted by digest degrades it to
//! a list and lookups to O(n). The `hashmap-search` feature provides
//! [`HashIndex`] with the same contract and O(1) lookups.

use crate::domain::record::Record;
use crate::domain::table::Table;
use crate::error::TableError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "hashmap-search")]
use rustc_hash::FxHashMap;

/// Exact-match lookup by digest hex
///
/// Implementations keep the first record for each digest; later duplicates
/// are unreachable.
pub trait DigestIndex {
    /// Find the record for `digest_hex`, or `None` if absent
    fn lookup(&self, digest_hex: &str) -> Option<&Record>;

    /// Number of distinct digests indexed
    fn len(&self) -> usize;

    /// Check if empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tree node: record position plus child links into the node arena
#[derive(Clone, Copy, Debug)]
struct Node {
    record: usize,
    left: Option<usize>,
    right: Option<usize>,
}

impl Node {
    fn leaf(record: usize) -> Self {
        Self {
            record,
            left: None,
            right: None,
        }
    }
}

/// Unbalanced binary search tree over a table's records
///
/// The root is the first node of the arena. An index built from an empty
/// table has no nodes and every lookup misses.
pub struct SearchIndex<'t> {
    table: &'t Table,
    nodes: Vec<Node>,
}

impl<'t> SearchIndex<'t> {
    /// Build the tree by inserting every record in table order
    ///
    /// Records whose digest is already present are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Allocation`] if node storage cannot be obtained.
    pub fn build(table: &'t Table) -> Result<Self, TableError> {
        let mut nodes = Vec::new();
        nodes.try_reserve_exact(table.len())?;

        let mut index = Self { table, nodes };
        for position in 0..table.len() {
            index.insert(position);
        }

        let discarded = table.len() - index.nodes.len();
        if discarded > 0 {
            tracing::debug!(discarded, "duplicate digests left out of the index");
        }

        Ok(index)
    }

    /// Insert the record at `position`, returns false for a duplicate digest
    fn insert(&mut self, position: usize) -> bool {
        let table = self.table;
        let records = table.records();
        let key = records[position].digest_hex();

        if self.nodes.is_empty() {
            self.nodes.push(Node::leaf(position));
            return true;
        }

        let mut current = 0;
        loop {
            let node = self.nodes[current];
            let ordering = key.cmp(records[node.record].digest_hex());
            let next = match ordering {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return false,
            };

            match next {
                Some(child) => current = child,
                None => {
                    let id = self.nodes.len();
                    self.nodes.push(Node::leaf(position));
                    let parent = &mut self.nodes[current];
                    if ordering == Ordering::Less {
                        parent.left = Some(id);
                    } else {
                        parent.right = Some(id);
                    }
                    return true;
                }
            }
        }
    }

    /// Find the record for `digest_hex`
    ///
    /// The returned reference borrows the table, not the index.
    pub fn lookup(&self, digest_hex: &str) -> Option<&'t Record> {
        let table = self.table;
        let records = table.records();
        let mut current = if self.nodes.is_empty() { None } else { Some(0) };

        while let Some(id) = current {
            let node = &self.nodes[id];
            let record = &records[node.record];
            current = match digest_hex.cmp(record.digest_hex()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(record),
            };
        }

        None
    }

    /// Number of nodes (distinct digests)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the tree (0 for an empty index)
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }

        let mut max_depth = 0;
        let mut stack = vec![(0usize, 1usize)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            let node = &self.nodes[id];
            stack.extend(node.left.map(|child| (child, depth + 1)));
            stack.extend(node.right.map(|child| (child, depth + 1)));
        }
        max_depth
    }

    /// The table this index refers to
    pub fn table(&self) -> &'t Table {
        self.table
    }
}

impl DigestIndex for SearchIndex<'_> {
    fn lookup(&self, digest_hex: &str) -> Option<&Record> {
        SearchIndex::lookup(self, digest_hex)
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl fmt::Debug for SearchIndex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchIndex")
            .field("records", &self.table.len())
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

// =============================================================================
// HashMap-based index (hashmap-search feature)
// =============================================================================

/// Digest to record position map
///
/// Same contract as [`SearchIndex`]: first occurrence wins.
#[cfg(feature = "hashmap-search")]
pub struct HashIndex<'t> {
    table: &'t Table,
    positions: FxHashMap<&'t str, usize>,
}

#[cfg(feature = "hashmap-search")]
impl<'t> HashIndex<'t> {
    /// Build the map from every record in table order
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Allocation`] if the map cannot be sized.
    pub fn build(table: &'t Table) -> Result<Self, TableError> {
        let mut positions = FxHashMap::default();
        positions.try_reserve(table.len())?;

        for (position, record) in table.iter().enumerate() {
            positions.entry(record.digest_hex()).or_insert(position);
        }

        Ok(Self { table, positions })
    }

    /// Find the record for `digest_hex`
    pub fn lookup(&self, digest_hex: &str) -> Option<&'t Record> {
        let table = self.table;
        let position = *self.positions.get(digest_hex)?;
        table.get(position)
    }

    /// Number of distinct digests
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(feature = "hashmap-search")]
impl DigestIndex for HashIndex<'_> {
    fn lookup(&self, digest_hex: &str) -> Option<&Record> {
        HashIndex::lookup(self, digest_hex)
    }

    fn len(&self) -> usize {
        self.positions.len()
    }
}

// =============================================================================
// Index selection
// =============================================================================

/// Which index structure a lookup session builds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexKind {
    /// Unbalanced binary search tree
    #[default]
    Tree,
    /// FxHashMap keyed by digest
    #[cfg(feature = "hashmap-search")]
    Hash,
}

impl IndexKind {
    /// Build an index of this kind over `table`
    pub fn build<'t>(self, table: &'t Table) -> Result<Box<dyn DigestIndex + 't>, TableError> {
        Ok(match self {
            Self::Tree => Box::new(SearchIndex::build(table)?),
            #[cfg(feature = "hashmap-search")]
            Self::Hash => Box::new(HashIndex::build(table)?),
        })
    }

    /// Name accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            #[cfg(feature = "hashmap-search")]
            Self::Hash => "hash",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndexKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tree" => Ok(Self::Tree),
            #[cfg(feature = "hashmap-search")]
            "hash" => Ok(Self::Hash),
            other => Err(format!("unknown index kind '{}'", other)),
        }
    }
}
