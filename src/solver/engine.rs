//! The scheduling driver: worker pool, active-vertex queue, and
//! accumulation cadence.
//!
//! Every vertex is seeded active; a pool of workers dequeues vertices,
//! runs the relaxation step, and re-enqueues each vertex after its
//! update. The work stream is unbounded by construction, so the only
//! exits are the accumulator signalling convergence, the configured
//! update cap, or the should-not-happen case of the queue draining.
//! Termination is cooperative: once the stop flag is set, workers stop
//! re-enqueuing and drain, but in-flight updates complete.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{debug, info, warn};

use super::accumulator::{accumulation_pass, NormAccumulator, NormState};
use super::jacobi::relax_vertex;
use super::{DEFAULT_SYNC_INTERVAL, DEFAULT_THRESHOLD};
use crate::system::{SystemGraph, VertexId};

/// Consecutive empty polls (with nothing in flight) before a worker
/// declares the queue stalled.
const STALL_POLL_LIMIT: u32 = 1000;

/// Configuration for the solver engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Worker threads (0 = available parallelism).
    pub threads: usize,
    /// Dispatched updates between accumulation passes.
    pub sync_interval: u64,
    /// Terminate once the absolute error norm falls below this.
    pub threshold: f64,
    /// Safety valve: stop after this many updates (0 = unlimited).
    pub max_updates: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 0,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            threshold: DEFAULT_THRESHOLD,
            max_updates: 0,
        }
    }
}

impl EngineOptions {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker thread count (0 = available parallelism).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the number of updates between accumulation passes.
    pub fn with_sync_interval(mut self, sync_interval: u64) -> Self {
        self.sync_interval = sync_interval;
        self
    }

    /// Set the absolute-norm termination threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the update cap (0 = unlimited).
    pub fn with_max_updates(mut self, max_updates: u64) -> Self {
        self.max_updates = max_updates;
        self
    }
}

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The absolute error norm fell below the threshold
    Converged,
    /// The configured update cap fired before convergence
    IterationCapReached,
    /// The active-vertex queue drained unexpectedly
    Stalled,
}

/// Summary of a completed solve.
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Termination cause
    pub status: SolveStatus,
    /// Total updates dispatched
    pub updates: u64,
    /// Accumulation passes run (including the closing pass)
    pub passes: u64,
    /// Final absolute error norm
    pub absolute_norm: f64,
    /// Final relative error norm
    pub relative_norm: f64,
    /// Wall-clock solve time
    pub elapsed: Duration,
}

impl SolveReport {
    /// True when the solve satisfied the threshold.
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

/// The asynchronous Jacobi engine.
pub struct SolverEngine {
    graph: SystemGraph,
    options: EngineOptions,
    norms: NormState,
    stop: AtomicBool,
    converged: AtomicBool,
    cap_reached: AtomicBool,
    dispatched: AtomicU64,
    passes: AtomicU64,
    in_flight: AtomicUsize,
}

impl SolverEngine {
    /// Create an engine for the given system.
    ///
    /// The graph must already be assembled and validated; the engine
    /// never re-checks the zero-diagonal invariant.
    pub fn new(graph: SystemGraph, options: EngineOptions) -> Self {
        Self {
            graph,
            options,
            norms: NormState::new(),
            stop: AtomicBool::new(false),
            converged: AtomicBool::new(false),
            cap_reached: AtomicBool::new(false),
            dispatched: AtomicU64::new(0),
            passes: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// The system being solved.
    pub fn graph(&self) -> &SystemGraph {
        &self.graph
    }

    /// Norms published by the most recent accumulation pass.
    pub fn norms(&self) -> &NormState {
        &self.norms
    }

    /// Snapshot of the current estimates, ordered by vertex index.
    pub fn solution(&self) -> Vec<f64> {
        self.graph.solution()
    }

    /// Run the solve to termination.
    ///
    /// Seeds every vertex active, drives the worker pool until a
    /// finalize step signals termination (or the cap fires), then runs a
    /// closing accumulation pass so the report carries settled norms.
    pub fn run(&self) -> SolveReport {
        let started = Instant::now();
        let threads = self.worker_count();

        let (tx, rx) = crossbeam_channel::unbounded();
        for v in self.graph.vertex_ids() {
            // The engine holds both ends; send cannot fail here.
            let _ = tx.send(v);
        }
        debug!(
            vertices = self.graph.len(),
            edges = self.graph.edge_count(),
            threads,
            "seeding all vertices active"
        );

        std::thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(|| self.worker(&tx, &rx));
            }
        });

        // Workers may have stopped between passes; settle the norms.
        if !self.converged.load(Ordering::Acquire) {
            self.finalize(accumulation_pass(&self.graph));
        }

        let status = if self.converged.load(Ordering::Acquire) {
            SolveStatus::Converged
        } else if self.cap_reached.load(Ordering::Acquire) {
            SolveStatus::IterationCapReached
        } else {
            SolveStatus::Stalled
        };

        let report = SolveReport {
            status,
            updates: self.dispatched.load(Ordering::Acquire),
            passes: self.passes.load(Ordering::Acquire),
            absolute_norm: self.norms.absolute(),
            relative_norm: self.norms.relative(),
            elapsed: started.elapsed(),
        };
        info!(
            ?status,
            updates = report.updates,
            passes = report.passes,
            absolute = report.absolute_norm,
            relative = report.relative_norm,
            "solve finished"
        );
        report
    }

    fn worker_count(&self) -> usize {
        let requested = if self.options.threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.options.threads
        };
        requested.clamp(1, self.graph.len().max(1))
    }

    fn worker(&self, tx: &Sender<VertexId>, rx: &Receiver<VertexId>) {
        let interval = self.options.sync_interval.max(1);
        let mut empty_polls = 0u32;

        loop {
            if self.stop.load(Ordering::Acquire) {
                break;
            }

            let v = match rx.try_recv() {
                Ok(v) => v,
                Err(TryRecvError::Empty) => {
                    // Updates reschedule themselves, so a persistently
                    // empty queue with nothing in flight means work was
                    // lost upstream.
                    if self.in_flight.load(Ordering::Acquire) == 0 {
                        empty_polls += 1;
                        if empty_polls > STALL_POLL_LIMIT {
                            warn!("active-vertex queue drained unexpectedly; terminating");
                            self.stop.store(true, Ordering::Release);
                            break;
                        }
                    }
                    std::thread::yield_now();
                    continue;
                }
                Err(TryRecvError::Disconnected) => break,
            };
            empty_polls = 0;

            self.in_flight.fetch_add(1, Ordering::AcqRel);
            relax_vertex(&self.graph, v);

            let dispatched = self.dispatched.fetch_add(1, Ordering::AcqRel) + 1;
            if self.options.max_updates > 0 && dispatched >= self.options.max_updates {
                self.cap_reached.store(true, Ordering::Release);
                self.stop.store(true, Ordering::Release);
            }
            if dispatched % interval == 0 && !self.stop.load(Ordering::Acquire) {
                // The worker crossing the boundary runs the pass; other
                // workers keep relaxing, which the norm tolerates.
                self.finalize(accumulation_pass(&self.graph));
            }

            if !self.stop.load(Ordering::Acquire) {
                let _ = tx.send(v);
            }
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
        }
    }

    /// Runs once per accumulation pass with the fully combined totals.
    fn finalize(&self, totals: NormAccumulator) {
        self.norms.publish(totals);
        let pass = self.passes.fetch_add(1, Ordering::AcqRel) + 1;
        info!(
            pass,
            absolute = totals.absolute,
            relative = totals.relative,
            "accumulation pass"
        );
        if totals.absolute < self.options.threshold {
            self.converged.store(true, Ordering::Release);
            self.stop.store(true, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mm::{MatrixEntry, MatrixInfo};
    use approx::assert_relative_eq;

    fn assemble(
        n: usize,
        triplets: &[(usize, usize, f64)],
        rhs: &[f64],
        reference: Option<&[f64]>,
    ) -> SystemGraph {
        let entries: Vec<MatrixEntry> = triplets
            .iter()
            .map(|&(row, col, value)| MatrixEntry { row, col, value })
            .collect();
        let info = MatrixInfo {
            rows: n,
            cols: n,
            nonzeros: entries.len(),
        };
        let mut graph = SystemGraph::assemble(&info, &entries).unwrap();
        graph.attach_rhs(rhs).unwrap();
        if let Some(reference) = reference {
            graph.attach_reference(reference).unwrap();
        }
        graph
    }

    fn dominant_3x3(reference: Option<&[f64]>) -> SystemGraph {
        assemble(
            3,
            &[
                (0, 0, 4.0),
                (0, 1, -1.0),
                (0, 2, -1.0),
                (1, 0, -1.0),
                (1, 1, 4.0),
                (1, 2, -1.0),
                (2, 0, -1.0),
                (2, 1, -1.0),
                (2, 2, 4.0),
            ],
            &[3.0, 6.0, 9.0],
            reference,
        )
    }

    #[test]
    fn test_converges_on_diagonally_dominant_system() {
        let truth = [2.4, 3.0, 3.6];
        let graph = dominant_3x3(Some(&truth));
        let engine = SolverEngine::new(
            graph,
            EngineOptions::new()
                .with_threads(2)
                .with_sync_interval(50)
                .with_threshold(1e-9),
        );

        let report = engine.run();
        assert_eq!(report.status, SolveStatus::Converged);
        assert!(report.absolute_norm < 1e-9);

        // Verify by direct substitution: A * x ~= b.
        let x = engine.solution();
        let graph = engine.graph();
        for v in graph.vertex_ids() {
            let coupled: f64 = graph
                .neighbors(v)
                .iter()
                .map(|e| e.weight * x[e.target.0])
                .sum();
            let row = graph.vertex(v).diagonal * x[v.0] + coupled;
            assert_relative_eq!(row, graph.vertex(v).y, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_large_threshold_terminates_on_first_pass() {
        let truth = [2.4, 3.0, 3.6];
        let graph = dominant_3x3(Some(&truth));
        // Initial error is ||truth||^2 ~= 27.7, well under the threshold.
        let engine = SolverEngine::new(
            graph,
            EngineOptions::new()
                .with_threads(1)
                .with_sync_interval(3)
                .with_threshold(100.0),
        );

        let report = engine.run();
        assert_eq!(report.status, SolveStatus::Converged);
        assert_eq!(report.passes, 1);
        assert_eq!(report.updates, 3);
    }

    #[test]
    fn test_diagonal_only_system_converges_immediately() {
        let graph = assemble(
            3,
            &[(0, 0, 2.0), (1, 1, 4.0), (2, 2, 8.0)],
            &[2.0, 8.0, 32.0],
            Some(&[1.0, 2.0, 4.0]),
        );
        let engine = SolverEngine::new(
            graph,
            EngineOptions::new()
                .with_threads(1)
                .with_sync_interval(3)
                .with_threshold(1e-12),
        );

        let report = engine.run();
        assert_eq!(report.status, SolveStatus::Converged);
        // One sweep reaches x_i = y_i / A_ii exactly.
        assert_eq!(report.updates, 3);
        assert_eq!(engine.solution(), vec![1.0, 2.0, 4.0]);
        assert_relative_eq!(report.absolute_norm, 0.0);
    }

    #[test]
    fn test_update_cap_reports_non_convergence() {
        // Reference far from the solution keeps the absolute norm large.
        let graph = dominant_3x3(Some(&[100.0, 100.0, 100.0]));
        let engine = SolverEngine::new(
            graph,
            EngineOptions::new()
                .with_threads(2)
                .with_threshold(1e-12)
                .with_max_updates(10),
        );

        let report = engine.run();
        assert_eq!(report.status, SolveStatus::IterationCapReached);
        assert!(!report.converged());
        assert!(report.updates >= 10);
        assert!(report.absolute_norm > 1.0);
    }

    #[test]
    fn test_norms_published_for_observers() {
        let graph = dominant_3x3(Some(&[2.4, 3.0, 3.6]));
        let engine = SolverEngine::new(
            graph,
            EngineOptions::new()
                .with_threads(1)
                .with_sync_interval(10)
                .with_threshold(1e-9),
        );
        assert!(engine.norms().absolute().is_infinite());

        let report = engine.run();
        assert_relative_eq!(engine.norms().absolute(), report.absolute_norm);
        assert_relative_eq!(engine.norms().relative(), report.relative_norm);
    }
}
