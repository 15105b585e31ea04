//! Relaxsolve - graph-parallel Jacobi linear solver
//!
//! Loads a square sparse matrix A and right-hand side y from
//! MatrixMarket files, iterates asynchronous Jacobi relaxation until the
//! absolute error norm falls below the threshold (or the update cap
//! fires), and writes the solution vector to `<data>x.out`.
//!
//! # Usage
//!
//! ```bash
//! relaxsolve A.mtx 1e-6 --yfile b.mtx --xfile truth.mtx --syncinterval 5000
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use relaxsolve::{
    error::{Result, SolverError},
    mm::{self, FileFormat},
    solver::{EngineOptions, SolveReport, SolverEngine},
    system::{validate_system, SystemGraph},
    DEFAULT_SYNC_INTERVAL, DEFAULT_THRESHOLD,
};
use tracing::info;

/// Graph-parallel Jacobi linear solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the coefficient matrix file
    #[arg(value_name = "DATA")]
    data: PathBuf,

    /// Absolute-error termination threshold
    #[arg(value_name = "THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Path to the right-hand-side vector file
    #[arg(long)]
    yfile: PathBuf,

    /// Path to a known true solution (makes the absolute norm, and
    /// therefore the threshold, meaningful)
    #[arg(long)]
    xfile: Option<PathBuf>,

    /// Matrix/vector file format
    #[arg(long, default_value = "mm")]
    format: String,

    /// Number of dispatched updates between convergence checks
    #[arg(long, default_value_t = DEFAULT_SYNC_INTERVAL)]
    syncinterval: u64,

    /// Stop after this many updates (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_updates: u64,

    /// Worker threads (0 = available parallelism)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Display per-update trace output
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.debug { "trace" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    match run(&args) {
        Ok(report) if report.converged() => ExitCode::SUCCESS,
        Ok(report) => {
            eprintln!(
                "{}",
                SolverError::DidNotConverge {
                    updates: report.updates,
                    absolute_norm: report.absolute_norm,
                }
            );
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<SolveReport> {
    if !(args.threshold.is_finite() && args.threshold > 0.0) {
        return Err(SolverError::invalid_option(format!(
            "threshold must be a positive number, got {}",
            args.threshold
        )));
    }
    let format = FileFormat::from_tag(&args.format)?;

    info!(path = %args.data.display(), "loading matrix");
    let (matrix_info, entries) = mm::load_matrix(&args.data, format)?;
    let mut graph = SystemGraph::assemble(&matrix_info, &entries)?;

    info!(path = %args.yfile.display(), "loading y values");
    let rhs = mm::load_vector(&args.yfile, format, matrix_info.rows)?;
    graph.attach_rhs(&rhs)?;

    if let Some(xfile) = &args.xfile {
        info!(path = %xfile.display(), "loading reference solution");
        let reference = mm::load_vector(xfile, format, matrix_info.rows)?;
        graph.attach_reference(&reference)?;
    }

    validate_system(&graph)?;

    let options = EngineOptions::new()
        .with_threads(args.threads)
        .with_sync_interval(args.syncinterval)
        .with_threshold(args.threshold)
        .with_max_updates(args.max_updates);
    let engine = SolverEngine::new(graph, options);
    let report = engine.run();

    info!(
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Jacobi finished"
    );

    let mut out_path = args.data.clone().into_os_string();
    out_path.push("x.out");
    let out_path = PathBuf::from(out_path);
    mm::write_vector(&out_path, format, &engine.solution())?;
    info!(path = %out_path.display(), "wrote solution vector");

    Ok(report)
}
