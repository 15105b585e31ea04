//! MatrixMarket file I/O.
//!
//! This module is the external boundary of the solver: it loads the
//! coefficient matrix and vectors from MatrixMarket files and writes the
//! solution vector back out. All load failures are fatal and surface
//! before any update is dispatched.

mod read;
mod write;

pub use read::{load_matrix, load_vector};
pub use write::write_vector;

use crate::error::{Result, SolverError};

/// Supported matrix/vector file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// MatrixMarket exchange format (`.mtx`, tag "mm")
    MatrixMarket,
}

impl FileFormat {
    /// Resolve a command-line format tag.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "mm" | "matrixmarket" => Ok(Self::MatrixMarket),
            other => Err(SolverError::UnknownFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Declared dimensions of a loaded matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixInfo {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
    /// Number of stored entries (after symmetry expansion)
    pub nonzeros: usize,
}

/// One matrix triplet with 0-based indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixEntry {
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tag() {
        assert_eq!(FileFormat::from_tag("mm").unwrap(), FileFormat::MatrixMarket);
        assert!(FileFormat::from_tag("csv").is_err());
    }
}
