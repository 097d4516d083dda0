use thiserror::Error;

/// Errors raised by graph operations and topological ordering.
///
/// All errors are reported synchronously at the point of detection. An
/// operation that fails leaves the graph exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A required argument does not fit the graph, e.g. a vertex that is not a
    /// member or a cursor created by another graph.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The dependency relation contains a cycle.
    ///
    /// `positions` are the indices, in the source sequence, of the elements
    /// whose keys lie on a cycle.
    #[error("Circular dependency between elements at positions {positions:?}")]
    CircularDependency { positions: Vec<usize> },

    /// The graph was mutated while a cursor over one of its views was live.
    #[error("Graph was modified during enumeration (version {expected}, now {found})")]
    ConcurrentModification { expected: u64, found: u64 },

    /// The operation is not defined for this graph.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;

impl GraphError {
    pub(crate) fn missing_vertex(operation: &str) -> Self {
        GraphError::InvalidArgument(format!("{operation}: vertex is not in the graph"))
    }

    pub(crate) fn missing_edge(operation: &str) -> Self {
        GraphError::InvalidArgument(format!("{operation}: edge is not in the graph"))
    }

    /// Returns `true` for [`GraphError::CircularDependency`].
    pub fn is_circular_dependency(&self) -> bool {
        matches!(self, GraphError::CircularDependency { .. })
    }
}
