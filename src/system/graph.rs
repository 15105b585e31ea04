//! System graph structure.
//!
//! The coefficient matrix is stored as a graph: one vertex per equation
//! (matrix row) and one directed edge per nonzero off-diagonal
//! coefficient, pointing from row `i` to the column `j` it references.
//! Topology is fixed for the whole solve; only each vertex's estimate
//! cells mutate.

use super::types::{AtomicF64, VertexId};
use crate::error::{Result, SolverError};
use crate::mm::{MatrixEntry, MatrixInfo};

/// One linear equation `i`: the diagonal coefficient, the right-hand
/// side, and the current/previous iterate.
#[derive(Debug)]
pub struct Vertex {
    /// Right-hand-side scalar b_i (immutable after load)
    pub y: f64,
    /// Diagonal coefficient A_ii (immutable after load, never zero)
    pub diagonal: f64,
    /// Known true value x_i, used only for the absolute error norm.
    /// Zero when no ground truth is supplied.
    pub reference: f64,
    /// Current iterate x_i. Written only by this vertex's own update;
    /// read by any neighbor's update without synchronization.
    pub estimate: AtomicF64,
    /// Iterate from the previous update of this vertex. Seeded to the
    /// +infinity "unknown" sentinel until the first update runs.
    pub previous_estimate: AtomicF64,
}

impl Vertex {
    fn new(diagonal: f64) -> Self {
        Self {
            y: 0.0,
            diagonal,
            reference: 0.0,
            estimate: AtomicF64::new(0.0),
            previous_estimate: AtomicF64::new(f64::INFINITY),
        }
    }

    /// True once this vertex has been relaxed at least once.
    pub fn has_updated(&self) -> bool {
        self.previous_estimate.load().is_finite()
    }
}

/// One off-diagonal coefficient A_ij, directed from row i to column j.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// The column vertex j whose estimate this coefficient multiplies
    pub target: VertexId,
    /// Coefficient value A_ij (immutable after load)
    pub weight: f64,
}

/// A square linear system ready for relaxation.
///
/// Edges are grouped per source row with CSR-style offsets, giving each
/// vertex O(degree) access to its off-diagonal coefficients.
#[derive(Debug)]
pub struct SystemGraph {
    vertices: Vec<Vertex>,
    edge_offsets: Vec<usize>,
    edges: Vec<Edge>,
}

impl SystemGraph {
    /// Assemble a graph from parsed matrix triplets.
    ///
    /// Diagonal entries become vertex coefficients, off-diagonal entries
    /// become edges. Duplicate coordinates are summed. Fails on
    /// non-square dimensions, out-of-bounds entries, empty systems, and
    /// any zero or missing diagonal (reported with the offending row).
    pub fn assemble(info: &MatrixInfo, entries: &[MatrixEntry]) -> Result<Self> {
        if info.rows != info.cols {
            return Err(SolverError::NotSquare {
                rows: info.rows,
                cols: info.cols,
            });
        }
        if info.rows == 0 {
            return Err(SolverError::EmptySystem);
        }

        let n = info.rows;
        let mut diagonals = vec![0.0f64; n];
        let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];

        for entry in entries {
            if entry.row >= n || entry.col >= n {
                return Err(SolverError::EntryOutOfBounds {
                    row: entry.row,
                    col: entry.col,
                    rows: n,
                    cols: n,
                });
            }
            if entry.row == entry.col {
                diagonals[entry.row] += entry.value;
            } else {
                rows[entry.row].push((entry.col, entry.value));
            }
        }

        let mut vertices = Vec::with_capacity(n);
        for (i, &diagonal) in diagonals.iter().enumerate() {
            if diagonal == 0.0 {
                return Err(SolverError::zero_diagonal(i));
            }
            vertices.push(Vertex::new(diagonal));
        }

        // Sort each adjacency row and merge duplicate coordinates
        let mut edge_offsets = Vec::with_capacity(n + 1);
        let mut edges = Vec::new();
        edge_offsets.push(0);
        for row in &mut rows {
            row.sort_by_key(|&(col, _)| col);
            let mut merged: Vec<Edge> = Vec::with_capacity(row.len());
            for &(col, weight) in row.iter() {
                match merged.last_mut() {
                    Some(last) if last.target.0 == col => last.weight += weight,
                    _ => merged.push(Edge {
                        target: VertexId(col),
                        weight,
                    }),
                }
            }
            edges.extend(merged);
            edge_offsets.push(edges.len());
        }

        Ok(Self {
            vertices,
            edge_offsets,
            edges,
        })
    }

    /// Attach the right-hand-side vector b.
    pub fn attach_rhs(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.vertices.len() {
            return Err(SolverError::DimensionMismatch {
                expected: self.vertices.len(),
                found: values.len(),
            });
        }
        for (vertex, &value) in self.vertices.iter_mut().zip(values) {
            vertex.y = value;
        }
        Ok(())
    }

    /// Attach a known true solution, enabling a meaningful absolute
    /// error norm.
    pub fn attach_reference(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.vertices.len() {
            return Err(SolverError::DimensionMismatch {
                expected: self.vertices.len(),
                found: values.len(),
            });
        }
        for (vertex, &value) in self.vertices.iter_mut().zip(values) {
            vertex.reference = value;
        }
        Ok(())
    }

    /// Number of vertices (equations).
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True if the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// All vertices, indexed by row.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The vertex for row `v`.
    pub fn vertex(&self, v: VertexId) -> &Vertex {
        &self.vertices[v.0]
    }

    /// Off-diagonal coefficients of row `v`.
    pub fn neighbors(&self, v: VertexId) -> &[Edge] {
        &self.edges[self.edge_offsets[v.0]..self.edge_offsets[v.0 + 1]]
    }

    /// Total number of off-diagonal edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterate all vertex ids in row order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len()).map(VertexId)
    }

    /// Snapshot the current estimates, ordered by vertex index.
    pub fn solution(&self) -> Vec<f64> {
        self.vertices.iter().map(|v| v.estimate.load()).collect()
    }
}
