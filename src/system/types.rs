//! Core types for the system graph.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A unique identifier for a vertex (one equation / matrix row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

impl VertexId {
    /// Get the raw row index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// An `f64` cell with relaxed atomic load/store.
///
/// Estimates are read by concurrent neighbor updates without any
/// synchronization; a reader may observe a value from an older or newer
/// relaxation round. Asynchronous Jacobi tolerates this, so relaxed
/// ordering is sufficient and keeps neighbor reads as cheap as plain
/// loads on mainstream hardware.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    /// Create a new cell holding `value`.
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Read the current value.
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Overwrite the current value.
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_f64_roundtrip() {
        let cell = AtomicF64::new(1.5);
        assert_eq!(cell.load(), 1.5);
        cell.store(-2.25);
        assert_eq!(cell.load(), -2.25);
        cell.store(f64::INFINITY);
        assert!(cell.load().is_infinite());
    }

    #[test]
    fn test_vertex_id_display() {
        assert_eq!(VertexId(3).to_string(), "v3");
    }
}
