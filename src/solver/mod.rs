//! The iterative solver core.
//!
//! This module provides the numerical engine: the per-vertex Jacobi
//! relaxation step, the global convergence accumulator, and the
//! worker-pool driver that schedules updates and periodic accumulation
//! passes.
//!
//! ## Asynchronous Jacobi
//!
//! Classic Jacobi recomputes every x_i from the previous sweep's frozen
//! iterate. Here each vertex relaxes against whatever its neighbors hold
//! *right now*, so concurrent updates mix values from different rounds.
//! For systems where Jacobi converges (diagonally dominant matrices in
//! particular) the asynchronous variant still converges; it trades exact
//! sweep semantics for update throughput.

pub mod accumulator;
pub mod engine;
pub mod jacobi;

pub use accumulator::{accumulation_pass, NormAccumulator, NormState};
pub use engine::{EngineOptions, SolveReport, SolveStatus, SolverEngine};
pub use jacobi::{relax_vertex, synchronous_sweep};

/// Default absolute-norm termination threshold.
pub const DEFAULT_THRESHOLD: f64 = 1e-5;

/// Default number of dispatched updates between accumulation passes.
pub const DEFAULT_SYNC_INTERVAL: u64 = 10_000;
