//! # Relaxsolve
//!
//! A graph-parallel asynchronous Jacobi solver for square sparse linear
//! systems `Ax = b`.
//!
//! The matrix is represented as a graph: one vertex per equation, one
//! directed edge per nonzero off-diagonal coefficient. A worker pool
//! repeatedly relaxes active vertices
//! (`x_i = (b_i - sum_j A_ij * x_j) / A_ii`), each update re-activating
//! its own vertex, while periodic accumulation passes reduce the whole
//! vertex set to global error norms and decide when to stop.
//!
//! ## Architecture
//!
//! - [`mm`] - MatrixMarket matrix/vector loading and solution output
//! - [`system`] - graph representation of the system and validation
//! - [`solver`] - relaxation step, convergence accumulator, worker-pool
//!   engine
//!
//! ## Usage
//!
//! ```no_run
//! use relaxsolve::mm::{self, FileFormat};
//! use relaxsolve::solver::{EngineOptions, SolverEngine};
//! use relaxsolve::system::{validate_system, SystemGraph};
//!
//! # fn main() -> relaxsolve::Result<()> {
//! let format = FileFormat::MatrixMarket;
//! let (info, entries) = mm::load_matrix("A.mtx".as_ref(), format)?;
//! let mut graph = SystemGraph::assemble(&info, &entries)?;
//! let rhs = mm::load_vector("b.mtx".as_ref(), format, info.rows)?;
//! graph.attach_rhs(&rhs)?;
//! validate_system(&graph)?;
//!
//! let engine = SolverEngine::new(graph, EngineOptions::new().with_threshold(1e-6));
//! let report = engine.run();
//! println!("{:?} after {} updates", report.status, report.updates);
//! # Ok(())
//! # }
//! ```
//!
//! ## Convergence
//!
//! Termination compares the absolute error norm
//! `sum (estimate - reference)^2` against a configured threshold, so a
//! meaningful stop requires loading a ground-truth reference vector.
//! Without one the norm degenerates to `sum estimate^2`; rely on the
//! update cap in that case. Jacobi (synchronous or asynchronous) is
//! guaranteed to converge for diagonally dominant matrices.

pub mod error;
pub mod mm;
pub mod solver;
pub mod system;

// Re-export main types for convenience
pub use error::{Result, SolverError};
pub use solver::{EngineOptions, SolveReport, SolveStatus, SolverEngine};
pub use solver::{DEFAULT_SYNC_INTERVAL, DEFAULT_THRESHOLD};
pub use system::SystemGraph;
