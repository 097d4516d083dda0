/// Whether edges are ordered or unordered pairs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    Directed,
    Undirected,
}

/// Construction-time settings of a [`Graph`](super::Graph).
///
/// ```
/// use topograph::{Direction, Graph, GraphOptions};
///
/// let opts = GraphOptions::default().with_reverse_index(true);
/// let g: Graph<u8> = Graph::with_options(opts);
/// assert_eq!(g.direction(), Direction::Directed);
/// assert!(g.has_reverse_index());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphOptions {
    pub direction: Direction,
    /// Maintain a predecessor index alongside the successor rows.
    ///
    /// Speeds up `indegree`, `incoming_vertices` and vertex removal at the cost
    /// of memory. Ignored for undirected graphs, whose rows are symmetric.
    pub reverse_index: bool,
}

impl GraphOptions {
    pub fn directed() -> Self {
        GraphOptions::default()
    }

    pub fn undirected() -> Self {
        GraphOptions {
            direction: Direction::Undirected,
            ..Default::default()
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_reverse_index(mut self, reverse_index: bool) -> Self {
        self.reverse_index = reverse_index;
        self
    }
}
