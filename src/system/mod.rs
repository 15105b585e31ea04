//! Graph representation of the linear system and validation.
//!
//! This module provides the internal representation of `Ax = b` after
//! loading: one [`Vertex`] per equation, one [`Edge`] per nonzero
//! off-diagonal coefficient, held by a [`SystemGraph`] in a form
//! suitable for concurrent relaxation.

mod graph;
mod types;
mod validate;

pub use graph::{Edge, SystemGraph, Vertex};
pub use types::*;
pub use validate::validate_system;
