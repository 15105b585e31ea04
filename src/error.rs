//! Error types for the relaxsolve linear solver.
//!
//! This module provides a unified error type [`SolverError`] that covers
//! all error conditions that can occur during file loading, system
//! assembly and validation, and solving.
//!
//! Every fatal condition is detected before the iterative phase starts;
//! once workers are dispatching updates, the only ways out are
//! convergence or an operator-supplied cap.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`SolverError`].
pub type Result<T> = std::result::Result<T, SolverError>;

/// Unified error type for all relaxsolve operations.
#[derive(Error, Debug)]
pub enum SolverError {
    // ============ Configuration Errors ============
    /// Unrecognized file format tag
    #[error("Unknown file format '{format}' (supported: mm)")]
    UnknownFormat { format: String },

    /// Invalid engine option
    #[error("Invalid option: {message}")]
    InvalidOption { message: String },

    // ============ Load Errors ============
    /// Error reading an input file
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing an output file
    #[error("Failed to write '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed MatrixMarket content
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Matrix is not square
    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// Vector length does not match the loaded matrix
    #[error("Dimension mismatch: matrix has {expected} rows but vector has {found} entries")]
    DimensionMismatch { expected: usize, found: usize },

    /// Matrix entry outside the declared dimensions
    #[error("Entry ({row}, {col}) is outside the declared {rows}x{cols} matrix")]
    EntryOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// System has no equations
    #[error("System is empty (zero rows)")]
    EmptySystem,

    // ============ Validation Errors ============
    /// Zero or missing diagonal coefficient.
    ///
    /// Jacobi relaxation divides by A_ii, so this is caught at load time
    /// rather than surfacing as a division fault mid-iteration.
    #[error("Zero diagonal A[{vertex},{vertex}] - Jacobi requires a nonzero diagonal for every row")]
    ZeroDiagonal { vertex: usize },

    // ============ Solve Errors ============
    /// Iteration stopped without satisfying the threshold
    #[error("Did not converge after {updates} updates (absolute norm: {absolute_norm:.2e})")]
    DidNotConverge { updates: u64, absolute_norm: f64 },
}

impl SolverError {
    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid option error
    pub fn invalid_option(message: impl Into<String>) -> Self {
        Self::InvalidOption {
            message: message.into(),
        }
    }

    /// Create a zero-diagonal error for the given vertex
    pub fn zero_diagonal(vertex: usize) -> Self {
        Self::ZeroDiagonal { vertex }
    }

    /// Create a file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }
}
