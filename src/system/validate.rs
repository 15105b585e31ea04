//! System validation.

use crate::error::{Result, SolverError};

use super::SystemGraph;

/// Validate a system before any update is dispatched.
///
/// Checks:
/// - The system is non-empty
/// - Every vertex has a nonzero diagonal
///
/// [`SystemGraph::assemble`] already enforces the diagonal invariant,
/// but callers constructing graphs by other means go through here before
/// the engine will touch them.
pub fn validate_system(graph: &SystemGraph) -> Result<()> {
    if graph.is_empty() {
        return Err(SolverError::EmptySystem);
    }

    for (i, vertex) in graph.vertices().iter().enumerate() {
        if vertex.diagonal == 0.0 {
            return Err(SolverError::zero_diagonal(i));
        }
    }

    Ok(())
}
