//! The per-vertex Jacobi relaxation step.
//!
//! One invocation updates a single vertex:
//!
//! ```text
//! x_i = (b_i - sum_j A_ij * x_j) / A_ii
//! ```
//!
//! Neighbor estimates are read as they are at that moment, so concurrent
//! updates may supply values from different relaxation rounds
//! (asynchronous Jacobi). The engine guarantees at most one in-flight
//! update per vertex, which makes the two mutable cells of the invoking
//! vertex exclusively owned for the duration of the call.

use tracing::trace;

use crate::system::{SystemGraph, VertexId};

/// Relax vertex `v` once and return the new estimate.
///
/// Copies the current estimate into `previous_estimate` first, so the
/// convergence accumulator always sees the pre-update value. Mutates
/// only vertex `v`; neighbor state and edge weights are read-only.
pub fn relax_vertex(graph: &SystemGraph, v: VertexId) -> f64 {
    let vertex = graph.vertex(v);
    let current = vertex.estimate.load();
    vertex.previous_estimate.store(current);

    let mut coupled = 0.0;
    for edge in graph.neighbors(v) {
        coupled += edge.weight * graph.vertex(edge.target).estimate.load();
    }
    let next = (vertex.y - coupled) / vertex.diagonal;
    vertex.estimate.store(next);

    trace!(vertex = v.0, previous = current, estimate = next, "relaxed");
    next
}

/// Run one classic synchronous Jacobi sweep.
///
/// Every vertex is relaxed against a frozen snapshot of all estimates,
/// so the result is independent of visit order. This is the reference
/// baseline for the asynchronous production path; the engine itself
/// never freezes estimates.
pub fn synchronous_sweep(graph: &SystemGraph) -> Vec<f64> {
    let frozen = graph.solution();

    let next: Vec<f64> = graph
        .vertex_ids()
        .map(|v| {
            let vertex = graph.vertex(v);
            let coupled: f64 = graph
                .neighbors(v)
                .iter()
                .map(|edge| edge.weight * frozen[edge.target.0])
                .sum();
            (vertex.y - coupled) / vertex.diagonal
        })
        .collect();

    for (v, (&value, &previous)) in graph.vertex_ids().zip(next.iter().zip(&frozen)) {
        let vertex = graph.vertex(v);
        vertex.previous_estimate.store(previous);
        vertex.estimate.store(value);
    }

    next
}
