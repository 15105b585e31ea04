//! MatrixMarket parsing.
//!
//! Handles the coordinate and array variants of the exchange format with
//! `real` or `integer` fields and `general` or `symmetric` symmetry.
//! Symmetric files are expanded to explicit mirrored entries so the rest
//! of the crate only ever sees a general matrix.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{FileFormat, MatrixEntry, MatrixInfo};
use crate::error::{Result, SolverError};

/// Storage layout declared in the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Coordinate,
    Array,
}

/// Symmetry declared in the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symmetry {
    General,
    Symmetric,
}

/// Load a sparse matrix from `path`.
///
/// Returns the declared dimensions and the entry triplets (0-based,
/// symmetry already expanded). Assembly-level checks such as squareness
/// and zero diagonals are left to [`SystemGraph::assemble`].
///
/// [`SystemGraph::assemble`]: crate::system::SystemGraph::assemble
pub fn load_matrix(path: &Path, format: FileFormat) -> Result<(MatrixInfo, Vec<MatrixEntry>)> {
    match format {
        FileFormat::MatrixMarket => parse_matrix_market(path),
    }
}

/// Load a dense vector from `path`, checking it holds exactly `rows`
/// entries to match the previously loaded matrix.
///
/// Accepts an n-by-1 (or 1-by-n) file in either array or coordinate
/// layout; coordinate entries not present default to zero.
pub fn load_vector(path: &Path, format: FileFormat, rows: usize) -> Result<Vec<f64>> {
    let (info, entries) = match format {
        FileFormat::MatrixMarket => parse_matrix_market(path)?,
    };

    let len = if info.cols == 1 {
        info.rows
    } else if info.rows == 1 {
        info.cols
    } else {
        return Err(SolverError::DimensionMismatch {
            expected: rows,
            found: info.rows * info.cols,
        });
    };

    if len != rows {
        return Err(SolverError::DimensionMismatch {
            expected: rows,
            found: len,
        });
    }

    let mut values = vec![0.0; len];
    for entry in entries {
        if entry.row >= info.rows || entry.col >= info.cols {
            return Err(SolverError::EntryOutOfBounds {
                row: entry.row,
                col: entry.col,
                rows: info.rows,
                cols: info.cols,
            });
        }
        values[entry.row.max(entry.col)] = entry.value;
    }
    Ok(values)
}

fn parse_matrix_market(path: &Path) -> Result<(MatrixInfo, Vec<MatrixEntry>)> {
    let file = File::open(path).map_err(|e| SolverError::file_read(path, e))?;
    let reader = BufReader::new(file);

    let mut lines = reader.lines().enumerate();

    // Banner: %%MatrixMarket matrix <layout> <field> <symmetry>
    let (_, banner) = lines
        .next()
        .ok_or_else(|| SolverError::parse(1, "empty file"))?;
    let banner = banner.map_err(|e| SolverError::file_read(path, e))?;
    let (layout, symmetry) = parse_banner(&banner)?;

    // Size line: first non-comment, non-blank line after the banner
    let mut size_line = None;
    for (idx, line) in lines.by_ref() {
        let line = line.map_err(|e| SolverError::file_read(path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        size_line = Some((idx + 1, trimmed.to_string()));
        break;
    }
    let (size_lineno, size_line) =
        size_line.ok_or_else(|| SolverError::parse(2, "missing size line"))?;

    let dims: Vec<&str> = size_line.split_whitespace().collect();
    let (rows, cols, declared) = match (layout, dims.as_slice()) {
        (Layout::Coordinate, [r, c, nnz]) => (
            parse_usize(r, size_lineno)?,
            parse_usize(c, size_lineno)?,
            Some(parse_usize(nnz, size_lineno)?),
        ),
        (Layout::Array, [r, c]) => (
            parse_usize(r, size_lineno)?,
            parse_usize(c, size_lineno)?,
            None,
        ),
        _ => {
            return Err(SolverError::parse(
                size_lineno,
                format!("malformed size line '{size_line}'"),
            ))
        }
    };

    let mut entries = Vec::with_capacity(declared.unwrap_or(rows * cols));
    let mut seen = 0usize;
    // Array data is listed column-major
    let mut array_cursor = 0usize;

    for (idx, line) in lines {
        let lineno = idx + 1;
        let line = line.map_err(|e| SolverError::file_read(path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();

        match layout {
            Layout::Coordinate => {
                let (row, col, value) = match tokens.as_slice() {
                    [r, c, v] => (
                        parse_usize(r, lineno)?,
                        parse_usize(c, lineno)?,
                        parse_f64(v, lineno)?,
                    ),
                    // Some vector files omit the unit column index
                    [r, v] if cols == 1 => (parse_usize(r, lineno)?, 1, parse_f64(v, lineno)?),
                    _ => {
                        return Err(SolverError::parse(
                            lineno,
                            format!("expected 'row col value', got '{trimmed}'"),
                        ))
                    }
                };
                if row == 0 || col == 0 {
                    return Err(SolverError::parse(lineno, "indices are 1-based"));
                }
                entries.push(MatrixEntry {
                    row: row - 1,
                    col: col - 1,
                    value,
                });
                if symmetry == Symmetry::Symmetric && row != col {
                    entries.push(MatrixEntry {
                        row: col - 1,
                        col: row - 1,
                        value,
                    });
                }
                seen += 1;
            }
            Layout::Array => {
                for token in tokens {
                    let value = parse_f64(token, lineno)?;
                    if array_cursor >= rows * cols {
                        return Err(SolverError::parse(lineno, "more values than rows x cols"));
                    }
                    let row = array_cursor % rows;
                    let col = array_cursor / rows;
                    entries.push(MatrixEntry { row, col, value });
                    if symmetry == Symmetry::Symmetric && row != col {
                        entries.push(MatrixEntry {
                            row: col,
                            col: row,
                            value,
                        });
                    }
                    array_cursor += 1;
                }
            }
        }
    }

    match layout {
        Layout::Coordinate => {
            if let Some(declared) = declared {
                if seen != declared {
                    return Err(SolverError::parse(
                        size_lineno,
                        format!("declared {declared} entries but file contains {seen}"),
                    ));
                }
            }
        }
        Layout::Array => {
            if array_cursor != rows * cols {
                return Err(SolverError::parse(
                    size_lineno,
                    format!(
                        "array data has {array_cursor} values, expected {}",
                        rows * cols
                    ),
                ));
            }
        }
    }

    Ok((
        MatrixInfo {
            rows,
            cols,
            nonzeros: entries.len(),
        },
        entries,
    ))
}

fn parse_banner(banner: &str) -> Result<(Layout, Symmetry)> {
    let tokens: Vec<String> = banner.split_whitespace().map(str::to_lowercase).collect();
    let [tag, object, layout, field, symmetry] = tokens.as_slice() else {
        return Err(SolverError::parse(
            1,
            format!("malformed MatrixMarket banner '{banner}'"),
        ));
    };

    if tag.as_str() != "%%matrixmarket" || object.as_str() != "matrix" {
        return Err(SolverError::parse(
            1,
            format!("not a MatrixMarket matrix file: '{banner}'"),
        ));
    }

    let layout = match layout.as_str() {
        "coordinate" => Layout::Coordinate,
        "array" => Layout::Array,
        other => return Err(SolverError::parse(1, format!("unsupported layout '{other}'"))),
    };

    match field.as_str() {
        "real" | "integer" => {}
        other => return Err(SolverError::parse(1, format!("unsupported field '{other}'"))),
    }

    let symmetry = match symmetry.as_str() {
        "general" => Symmetry::General,
        "symmetric" => Symmetry::Symmetric,
        other => {
            return Err(SolverError::parse(
                1,
                format!("unsupported symmetry '{other}'"),
            ))
        }
    };

    Ok((layout, symmetry))
}

fn parse_usize(token: &str, lineno: usize) -> Result<usize> {
    token
        .parse()
        .map_err(|_| SolverError::parse(lineno, format!("invalid integer '{token}'")))
}

fn parse_f64(token: &str, lineno: usize) -> Result<f64> {
    token
        .parse()
        .map_err(|_| SolverError::parse(lineno, format!("invalid number '{token}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("relaxsolve_read_{name}_{}", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_coordinate_matrix() {
        let path = write_temp(
            "coord",
            "%%MatrixMarket matrix coordinate real general\n\
             % 3x3 test system\n\
             3 3 5\n\
             1 1 4.0\n\
             1 2 -1.0\n\
             2 2 4.0\n\
             3 3 4.0\n\
             3 1 -1.0\n",
        );
        let (info, entries) = load_matrix(&path, FileFormat::MatrixMarket).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(info.rows, 3);
        assert_eq!(info.cols, 3);
        assert_eq!(entries.len(), 5);
        assert_eq!(
            entries[1],
            MatrixEntry {
                row: 0,
                col: 1,
                value: -1.0
            }
        );
    }

    #[test]
    fn test_parse_symmetric_expands_mirror() {
        let path = write_temp(
            "symm",
            "%%MatrixMarket matrix coordinate real symmetric\n\
             2 2 3\n\
             1 1 4.0\n\
             2 1 -1.0\n\
             2 2 4.0\n",
        );
        let (info, entries) = load_matrix(&path, FileFormat::MatrixMarket).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(info.nonzeros, 4);
        assert!(entries.contains(&MatrixEntry {
            row: 0,
            col: 1,
            value: -1.0
        }));
    }

    #[test]
    fn test_parse_array_vector() {
        let path = write_temp(
            "vec",
            "%%MatrixMarket matrix array real general\n\
             3 1\n\
             3.0\n\
             6.0\n\
             9.0\n",
        );
        let values = load_vector(&path, FileFormat::MatrixMarket, 3).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(values, vec![3.0, 6.0, 9.0]);
    }

    #[test]
    fn test_vector_dimension_mismatch() {
        let path = write_temp(
            "short",
            "%%MatrixMarket matrix array real general\n\
             2 1\n\
             1.0\n\
             2.0\n",
        );
        let err = load_vector(&path, FileFormat::MatrixMarket, 3).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            err,
            SolverError::DimensionMismatch {
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_rejects_bad_banner() {
        let path = write_temp("banner", "%%NotMatrixMarket\n1 1 1\n1 1 1.0\n");
        let err = load_matrix(&path, FileFormat::MatrixMarket).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, SolverError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_rejects_entry_count_mismatch() {
        let path = write_temp(
            "count",
            "%%MatrixMarket matrix coordinate real general\n\
             2 2 3\n\
             1 1 1.0\n\
             2 2 1.0\n",
        );
        let err = load_matrix(&path, FileFormat::MatrixMarket).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, SolverError::ParseError { .. }));
    }
}
