//! Global convergence accumulation.
//!
//! A full accumulation pass reduces every vertex to a pair of squared
//! error norms:
//!
//! - **absolute**: `sum (estimate - reference)^2` — distance from the
//!   known true solution. When no reference vector is loaded this
//!   degenerates to `sum estimate^2` and is not a meaningful convergence
//!   measure; supply ground truth or rely on the update cap.
//! - **relative**: `sum (estimate - previous_estimate)^2` — how much the
//!   iterate moved since each vertex's previous update.
//!
//! Combination is a pairwise field sum, so partial accumulators can be
//! merged in any grouping or order, including in parallel. Each pass
//! starts from a zero accumulator; norms are recomputed from scratch
//! rather than maintained incrementally, which tolerates folding in
//! vertices mid-update (at most one sweep of staleness).

use rayon::prelude::*;

use crate::system::{AtomicF64, SystemGraph, Vertex};

/// Partial (or total) norm state for one accumulation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormAccumulator {
    /// Running `sum (estimate - reference)^2`
    pub absolute: f64,
    /// Running `sum (estimate - previous_estimate)^2`
    pub relative: f64,
}

impl NormAccumulator {
    /// The contribution of a single vertex.
    ///
    /// A vertex that has never been relaxed still carries the +infinity
    /// "unknown" sentinel in `previous_estimate` and contributes nothing
    /// to the relative norm.
    pub fn contribution(vertex: &Vertex) -> Self {
        let estimate = vertex.estimate.load();
        let previous = vertex.previous_estimate.load();
        Self {
            absolute: (estimate - vertex.reference).powi(2),
            relative: if previous.is_finite() {
                (estimate - previous).powi(2)
            } else {
                0.0
            },
        }
    }

    /// Merge two partial accumulators. Associative and commutative.
    pub fn combine(self, other: Self) -> Self {
        Self {
            absolute: self.absolute + other.absolute,
            relative: self.relative + other.relative,
        }
    }
}

/// Reduce the full vertex set to its combined norms.
///
/// The parallel reduce merges per-worker partials as they complete; the
/// returned total is only handed to the engine's finalize step once
/// every vertex contribution for this pass has been folded in.
pub fn accumulation_pass(graph: &SystemGraph) -> NormAccumulator {
    graph
        .vertices()
        .par_iter()
        .map(NormAccumulator::contribution)
        .reduce(NormAccumulator::default, NormAccumulator::combine)
}

/// Process-observable norms, published by the engine's finalize step.
///
/// Owned exclusively by the finalize sequence; everything else only
/// reads. Both norms start at +infinity until the first pass completes.
#[derive(Debug)]
pub struct NormState {
    absolute: AtomicF64,
    relative: AtomicF64,
}

impl NormState {
    /// Create a fresh, not-yet-measured state.
    pub fn new() -> Self {
        Self {
            absolute: AtomicF64::new(f64::INFINITY),
            relative: AtomicF64::new(f64::INFINITY),
        }
    }

    /// Publish the totals of a completed pass.
    pub(crate) fn publish(&self, totals: NormAccumulator) {
        self.absolute.store(totals.absolute);
        self.relative.store(totals.relative);
    }

    /// Most recently published absolute error norm.
    pub fn absolute(&self) -> f64 {
        self.absolute.load()
    }

    /// Most recently published relative error norm.
    pub fn relative(&self) -> f64 {
        self.relative.load()
    }
}

impl Default for NormState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mm::{MatrixEntry, MatrixInfo};
    use crate::solver::jacobi::relax_vertex;
    use approx::assert_relative_eq;

    fn graph_with_estimates(estimates: &[f64], references: &[f64]) -> SystemGraph {
        let n = estimates.len();
        let entries: Vec<MatrixEntry> = (0..n)
            .map(|i| MatrixEntry {
                row: i,
                col: i,
                value: 1.0,
            })
            .collect();
        let info = MatrixInfo {
            rows: n,
            cols: n,
            nonzeros: n,
        };
        let mut graph = SystemGraph::assemble(&info, &entries).unwrap();
        graph.attach_rhs(estimates).unwrap();
        graph.attach_reference(references).unwrap();
        // With an identity diagonal one relaxation sets estimate = y.
        for v in graph.vertex_ids() {
            relax_vertex(&graph, v);
        }
        graph
    }

    #[test]
    fn test_pass_computes_both_norms() {
        let graph = graph_with_estimates(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]);
        let totals = accumulation_pass(&graph);
        // absolute: 0 + 1 + 4; relative: (estimate - 0)^2 each
        assert_relative_eq!(totals.absolute, 5.0);
        assert_relative_eq!(totals.relative, 14.0);
    }

    #[test]
    fn test_unrelaxed_vertex_skips_relative_norm() {
        let entries = [MatrixEntry {
            row: 0,
            col: 0,
            value: 2.0,
        }];
        let info = MatrixInfo {
            rows: 1,
            cols: 1,
            nonzeros: 1,
        };
        let graph = SystemGraph::assemble(&info, &entries).unwrap();

        let totals = accumulation_pass(&graph);
        assert_relative_eq!(totals.relative, 0.0);
        assert!(totals.absolute.is_finite());
    }

    #[test]
    fn test_combine_is_associative_and_commutative() {
        let graph = graph_with_estimates(&[0.5, -1.0, 2.0, 4.0, -3.0], &[0.0; 5]);
        let parts: Vec<NormAccumulator> = graph
            .vertices()
            .iter()
            .map(NormAccumulator::contribution)
            .collect();

        let left_fold = parts
            .iter()
            .fold(NormAccumulator::default(), |acc, &p| acc.combine(p));
        let right_fold = parts
            .iter()
            .rev()
            .fold(NormAccumulator::default(), |acc, &p| acc.combine(p));

        // Group the vertex set arbitrarily and merge group totals.
        let grouped = parts[..2]
            .iter()
            .fold(NormAccumulator::default(), |acc, &p| acc.combine(p))
            .combine(
                parts[2..]
                    .iter()
                    .fold(NormAccumulator::default(), |acc, &p| acc.combine(p)),
            );

        assert_relative_eq!(left_fold.absolute, right_fold.absolute, epsilon = 1e-12);
        assert_relative_eq!(left_fold.relative, right_fold.relative, epsilon = 1e-12);
        assert_relative_eq!(left_fold.absolute, grouped.absolute, epsilon = 1e-12);
        assert_relative_eq!(left_fold.relative, grouped.relative, epsilon = 1e-12);
        assert_relative_eq!(left_fold.absolute, accumulation_pass(&graph).absolute);
    }

    #[test]
    fn test_norm_state_starts_unknown() {
        let state = NormState::new();
        assert!(state.absolute().is_infinite());
        state.publish(NormAccumulator {
            absolute: 0.25,
            relative: 0.5,
        });
        assert_relative_eq!(state.absolute(), 0.25);
        assert_relative_eq!(state.relative(), 0.5);
    }
}
