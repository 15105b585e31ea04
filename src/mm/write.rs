//! MatrixMarket output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::FileFormat;
use crate::error::{Result, SolverError};

/// Write `values` as an n-by-1 MatrixMarket array file, ordered by
/// vertex index.
///
/// Values are written with Rust's shortest round-trip formatting, so
/// re-reading the file reproduces them bit-for-bit.
pub fn write_vector(path: &Path, format: FileFormat, values: &[f64]) -> Result<()> {
    match format {
        FileFormat::MatrixMarket => write_matrix_market(path, values),
    }
}

fn write_matrix_market(path: &Path, values: &[f64]) -> Result<()> {
    let file = File::create(path).map_err(|e| SolverError::file_write(path, e))?;
    let mut writer = BufWriter::new(file);

    let io_err = |e| SolverError::file_write(path, e);

    writeln!(writer, "%%MatrixMarket matrix array real general").map_err(io_err)?;
    writeln!(writer, "%Generated by relaxsolve").map_err(io_err)?;
    writeln!(writer, "{} 1", values.len()).map_err(io_err)?;
    for value in values {
        writeln!(writer, "{value}").map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;

    Ok(())
}
