//! Detached enumeration of vertices and edges.
//!
//! A cursor does not borrow its graph. It remembers which graph it was made
//! for and the version it saw; every step re-validates both, so a cursor that
//! survives a mutation fails with [`GraphError::ConcurrentModification`]
//! instead of yielding stale data.
//!
//! [`GraphError::ConcurrentModification`]: crate::GraphError::ConcurrentModification

use crate::error::Result;

use super::{Edge, Graph, GraphId};

/// Cursor over a graph's vertices, in insertion order.
///
/// ```
/// use topograph::{Graph, GraphError};
///
/// let mut g = Graph::new();
/// g.add_vertex("a");
/// g.add_vertex("b");
///
/// let mut cursor = g.vertices().cursor();
/// assert_eq!(cursor.advance(&g).unwrap(), Some(&"a"));
///
/// g.add_vertex("c");
/// assert!(matches!(
///     cursor.advance(&g),
///     Err(GraphError::ConcurrentModification { .. })
/// ));
/// ```
#[derive(Clone, Debug)]
pub struct VertexCursor {
    graph: GraphId,
    version: u64,
    next: usize,
}

impl VertexCursor {
    pub(crate) fn new<V, S>(graph: &Graph<V, S>) -> Self {
        VertexCursor {
            graph: graph.id(),
            version: graph.version(),
            next: 0,
        }
    }

    /// Version of the graph this cursor was created against.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn advance<'g, V, S>(&mut self, graph: &'g Graph<V, S>) -> Result<Option<&'g V>> {
        graph.check_live(self.graph, self.version)?;
        let slots = graph.store().raw_slots();
        while let Some(slot) = slots.get(self.next) {
            self.next += 1;
            if let Some(slot) = slot {
                return Ok(Some(&slot.vertex));
            }
        }
        Ok(None)
    }

    /// Rewinds to the first vertex and adopts the graph's current version.
    pub fn reset<V, S>(&mut self, graph: &Graph<V, S>) {
        *self = VertexCursor::new(graph);
    }
}

/// Cursor over a graph's edges, in the order of [`EdgeSet::iter`].
///
/// [`EdgeSet::iter`]: super::EdgeSet::iter
#[derive(Clone, Debug)]
pub struct EdgeCursor {
    graph: GraphId,
    version: u64,
    from: usize,
    offset: usize,
}

impl EdgeCursor {
    pub(crate) fn new<V, S>(graph: &Graph<V, S>) -> Self {
        EdgeCursor {
            graph: graph.id(),
            version: graph.version(),
            from: 0,
            offset: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn advance<'g, V, S>(&mut self, graph: &'g Graph<V, S>) -> Result<Option<Edge<&'g V>>> {
        graph.check_live(self.graph, self.version)?;
        let store = graph.store();
        Ok(store
            .link_at_or_after(&mut self.from, &mut self.offset)
            .map(|(from, to)| Edge::new(store.vertex(from), store.vertex(to))))
    }

    pub fn reset<V, S>(&mut self, graph: &Graph<V, S>) {
        *self = EdgeCursor::new(graph);
    }
}
