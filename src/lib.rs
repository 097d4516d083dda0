//! # Topograph
//!
//! Topograph is a mutable graph engine with cached structural properties,
//! and a stable topological sort built on top of it.
//!
//! - [`Graph`] stores directed or undirected edges over user values compared
//!   through a pluggable [`Equivalence`]. Order, size, cyclicity and weak
//!   connectivity are memoized and kept coherent under mutation.
//! - Structural algorithms (transpose, reflexive and transitive reduction,
//!   transitive closure, induced subgraphs) come in in-place and copy forms.
//! - [`TopologicalSort`] orders any sequence under a dependency relation while
//!   keeping unrelated elements in input order.

pub mod equivalence;
pub mod error;
pub mod graph;
pub mod topological;
pub mod typed_vec;
pub mod union_find;

pub use equivalence::{EdgeEquivalence, Equivalence, KeyedBy, NaturalEq};
pub use error::{GraphError, Result};
pub use graph::{Direction, Edge, Graph, GraphId, GraphOptions};
pub use topological::{TopologicalOrder, TopologicalSort};
