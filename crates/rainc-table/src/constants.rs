//! Lookup table related constants

// =============================================================================
// File format
// =============================================================================

/// Format identifier written at the start of the header line
pub const FORMAT_MAGIC: &str = "T3C";

/// Separator between digest and plaintext (only the first one on a line counts)
pub const FIELD_SEPARATOR: char = '\t';

/// Lines starting with this character are comments
pub const COMMENT_PREFIX: char = '#';

/// Key that carries the algorithm label in the header line
pub const HEADER_ALGORITHM_KEY: &str = "algo=";

/// Column description written after the algorithm label
pub const HEADER_COLUMNS: &str = "Cols: hash\tdisplay";

/// Conventional table file extension
pub const TABLE_FILE_EXTENSION: &str = "t3c";

// =============================================================================
// Defaults
// =============================================================================

/// Default output path of the generation workflow
pub const DEFAULT_TABLE_PATH: &str = "lab/rainbowTAB.t3c";

/// Default digest algorithm label
pub const DEFAULT_ALGORITHM: &str = "sha256";

// =============================================================================
// Progress reporting
// =============================================================================

/// Number of progress callbacks per pass (roughly once per percent)
pub const PROGRESS_STEPS: usize = 100;

/// Words hashed per batch during generation
pub const GENERATION_BATCH_SIZE: usize = 4096;

/// Interval between progress callbacks for a pass over `total` items
#[inline]
pub fn progress_interval(total: usize) -> usize {
    (total / PROGRESS_STEPS).max(1)
}
