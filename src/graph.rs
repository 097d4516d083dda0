//! # Mutable graphs with cached properties
//!
//! [`Graph`] is a simple (multi-edge free) graph over user supplied vertex
//! values. Edges may be directed or undirected, self-loops are allowed in both
//! modes. The graph memoizes its size, cyclicity and weak connectivity and
//! keeps them coherent under mutation.
//!
//! ## Layout
//!
//! - [`store`]: arena of adjacency rows with an optional predecessor index
//! - [`cache`]: memoized properties and the version counter
//! - [`views`]: set-like façades over vertices and edges
//! - [`cursor`]: detached, version-checked enumeration
//! - [`structure`]: transpose, reductions, closure and induced subgraphs
//! - [`algebra`]: union/intersection/difference and subgraph predicates
//! - [`connectivity`]: reachability, cycles, components and degrees
//!
//! Copy-producing algorithms (`get_*`, `union`, ...) build an independent
//! graph; in-place ones mutate the receiver and bump its version once.

use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::equivalence::{Equivalence, NaturalEq};
use crate::error::{GraphError, Result};

use cache::Cache;
use store::{AdjacencyStore, VertexIndex};

pub mod algebra;
mod cache;
pub mod connectivity;
pub mod cursor;
mod edge;
mod options;
pub(crate) mod store;
pub mod structure;
pub mod views;

pub use cursor::{EdgeCursor, VertexCursor};
pub use edge::Edge;
pub use options::{Direction, GraphOptions};
pub use views::{EdgeSet, EdgeSetMut, Edges, VertexSet, VertexSetMut, Vertices};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a graph instance. Clones receive a fresh id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display)]
#[display(fmt = "graph#{}", _0)]
pub struct GraphId(u64);

impl GraphId {
    fn fresh() -> Self {
        GraphId(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A directed or undirected graph over vertices of type `V`.
///
/// Vertices are compared with the equivalence strategy `S`, stored once and
/// used for every lookup.
///
/// ```
/// use topograph::Graph;
///
/// let mut g = Graph::new();
/// g.add_edge(1, 2);
/// g.add_edge(2, 3);
/// assert!(g.has_path(&1, &3));
/// assert!(!g.is_cyclic());
///
/// g.add_edge(3, 1);
/// assert!(g.is_cyclic());
/// ```
pub struct Graph<V, S = NaturalEq> {
    store: AdjacencyStore<V, S>,
    cache: Cache,
    id: GraphId,
}

impl<V, S: Default> Default for Graph<V, S> {
    fn default() -> Self {
        Graph {
            store: AdjacencyStore::new(Direction::Directed, S::default(), false),
            cache: Cache::empty(),
            id: GraphId::fresh(),
        }
    }
}

impl<V: Clone, S: Clone> Clone for Graph<V, S> {
    fn clone(&self) -> Self {
        Graph {
            store: self.store.clone(),
            cache: self.cache.clone(),
            id: GraphId::fresh(),
        }
    }
}

impl<V> Graph<V, NaturalEq> {
    /// A directed graph holding `edges` and their endpoints.
    pub fn from_edges<I>(edges: I) -> Self
    where
        V: Eq + std::hash::Hash,
        I: IntoIterator,
        I::Item: Into<Edge<V>>,
    {
        let mut g = Self::new();
        g.extend_edges(edges);
        g
    }

    /// An empty directed graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty undirected graph.
    pub fn undirected() -> Self {
        Self::with_options(GraphOptions::undirected())
    }

    pub fn with_options(options: GraphOptions) -> Self {
        Graph {
            store: AdjacencyStore::new(options.direction, NaturalEq, options.reverse_index),
            cache: Cache::empty(),
            id: GraphId::fresh(),
        }
    }
}

impl<V, S> Graph<V, S> {
    pub fn with_equivalence(options: GraphOptions, equivalence: S) -> Self {
        Graph {
            store: AdjacencyStore::new(options.direction, equivalence, options.reverse_index),
            cache: Cache::empty(),
            id: GraphId::fresh(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn options(&self) -> GraphOptions {
        GraphOptions {
            direction: self.store.direction(),
            reverse_index: self.store.has_reverse(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.store.direction()
    }

    pub fn is_directed(&self) -> bool {
        self.direction() == Direction::Directed
    }

    pub fn equivalence(&self) -> &S {
        self.store.equivalence()
    }

    /// Structural version; increases on every mutation.
    pub fn version(&self) -> u64 {
        self.cache.version()
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.store.len()
    }

    /// Number of edges; an undirected pair counts once.
    pub fn size(&self) -> usize {
        self.cache.size_or_else(|| self.store.count_links())
    }

    pub fn is_empty(&self) -> bool {
        self.order() == 0
    }

    pub fn vertices(&self) -> VertexSet<'_, V, S> {
        VertexSet::new(self)
    }

    pub fn edges(&self) -> EdgeSet<'_, V, S> {
        EdgeSet::new(self)
    }

    pub fn vertices_mut(&mut self) -> VertexSetMut<'_, V, S> {
        VertexSetMut::new(self)
    }

    pub fn edges_mut(&mut self) -> EdgeSetMut<'_, V, S> {
        EdgeSetMut::new(self)
    }

    pub fn has_reverse_index(&self) -> bool {
        self.store.has_reverse()
    }

    /// Builds the predecessor index now; no-op for undirected graphs.
    pub fn materialize_reverse_index(&mut self) {
        self.store.materialize_reverse();
    }

    pub fn drop_reverse_index(&mut self) {
        self.store.drop_reverse();
    }

    /// Removes every vertex and edge.
    pub fn clear(&mut self) {
        if self.store.len() == 0 {
            return;
        }
        self.store.clear();
        self.cache.reset();
        self.cache.bump();
    }

    pub(crate) fn store(&self) -> &AdjacencyStore<V, S> {
        &self.store
    }

    pub(crate) fn cache(&self) -> &Cache {
        &self.cache
    }

    #[inline]
    pub(crate) fn vertex_at(&self, idx: VertexIndex) -> &V {
        self.store.vertex(idx)
    }

    pub(crate) fn link_at(&mut self, from: VertexIndex, to: VertexIndex) -> bool {
        let added = self.store.insert_link(from, to);
        if added {
            self.cache.edge_added();
        }
        added
    }

    pub(crate) fn unlink_at(&mut self, from: VertexIndex, to: VertexIndex) -> bool {
        let removed = self.store.remove_link(from, to);
        if removed {
            self.cache.edge_removed();
        }
        removed
    }

    pub(crate) fn remove_at(&mut self, idx: VertexIndex) -> V {
        let vertex = self.store.remove_at(idx);
        self.cache.vertex_removed();
        vertex
    }

    /// Ends a mutation: bumps the version and compacts the arena if needed.
    ///
    /// Any `VertexIndex` held across this call is stale.
    pub(crate) fn commit(&mut self) {
        self.cache.bump();
        self.store.compact_if_sparse();
    }

    /// Validates a cursor's captured graph id and version.
    pub(crate) fn check_live(&self, id: GraphId, version: u64) -> Result<()> {
        if id != self.id {
            return Err(GraphError::InvalidArgument(format!(
                "cursor belongs to {id}, not {}",
                self.id
            )));
        }
        if version != self.version() {
            return Err(GraphError::ConcurrentModification {
                expected: version,
                found: self.version(),
            });
        }
        Ok(())
    }
}

impl<V, S: Equivalence<V>> Graph<V, S> {
    /// A graph with the given options, vertices and edges.
    pub fn from_parts<IV, IE>(options: GraphOptions, equivalence: S, vertices: IV, edges: IE) -> Self
    where
        IV: IntoIterator<Item = V>,
        IE: IntoIterator,
        IE::Item: Into<Edge<V>>,
    {
        let mut g = Self::with_equivalence(options, equivalence);
        for v in vertices {
            g.insert_vertex_at(v);
        }
        g.extend_edges(edges);
        g
    }

    pub(crate) fn extend_edges<I>(&mut self, edges: I)
    where
        I: IntoIterator,
        I::Item: Into<Edge<V>>,
    {
        let mut changed = false;
        for edge in edges {
            let Edge { from, to } = edge.into();
            changed |= self.insert_edge_at(from, to);
        }
        if changed {
            self.commit();
        }
    }

    #[inline]
    pub(crate) fn index_of(&self, vertex: &V) -> Option<VertexIndex> {
        self.store.find(vertex)
    }

    pub(crate) fn require(&self, vertex: &V, operation: &str) -> Result<VertexIndex> {
        self.index_of(vertex)
            .ok_or_else(|| GraphError::missing_vertex(operation))
    }

    pub(crate) fn insert_vertex_at(&mut self, vertex: V) -> (VertexIndex, bool) {
        let (idx, inserted) = self.store.insert_vertex(vertex);
        if inserted {
            self.cache.vertex_added();
        }
        (idx, inserted)
    }

    /// Inserts `from -> to`, registering endpoints. Returns whether anything
    /// changed. Does not bump the version.
    pub(crate) fn insert_edge_at(&mut self, from: V, to: V) -> bool {
        let (a, new_a) = self.insert_vertex_at(from);
        let (b, new_b) = self.insert_vertex_at(to);
        self.link_at(a, b) || new_a || new_b
    }

    /// Adds `vertex`; returns `false` if it was already present.
    pub fn add_vertex(&mut self, vertex: V) -> bool {
        let (_, inserted) = self.insert_vertex_at(vertex);
        if inserted {
            self.cache.bump();
        }
        inserted
    }

    /// Removes `vertex` and every incident edge; returns `false` if absent.
    pub fn remove_vertex(&mut self, vertex: &V) -> bool {
        match self.index_of(vertex) {
            Some(idx) => {
                self.remove_at(idx);
                self.commit();
                true
            }
            None => false,
        }
    }

    /// Removes `vertex` and returns the stored value, which may differ from
    /// the argument under a non-natural equivalence.
    pub fn take_vertex(&mut self, vertex: &V) -> Option<V> {
        let idx = self.index_of(vertex)?;
        let taken = self.remove_at(idx);
        self.commit();
        Some(taken)
    }

    pub fn contains_vertex(&self, vertex: &V) -> bool {
        self.index_of(vertex).is_some()
    }

    /// The stored vertex equivalent to `vertex`.
    pub fn get_vertex(&self, vertex: &V) -> Option<&V> {
        self.index_of(vertex).map(|idx| self.vertex_at(idx))
    }

    /// Adds the edge `from -> to`, registering missing endpoints.
    ///
    /// Returns `false` if the edge was already present.
    pub fn add_edge(&mut self, from: V, to: V) -> bool {
        let changed = self.insert_edge_at(from, to);
        if changed {
            self.cache.bump();
        }
        changed
    }

    /// Removes the edge `from -> to`; endpoints stay. Returns `false` if absent.
    pub fn remove_edge(&mut self, from: &V, to: &V) -> bool {
        let (Some(a), Some(b)) = (self.index_of(from), self.index_of(to)) else {
            return false;
        };
        let removed = self.unlink_at(a, b);
        if removed {
            self.cache.bump();
        }
        removed
    }

    /// Whether the edge is present, honoring the direction mode.
    pub fn contains_edge(&self, from: &V, to: &V) -> bool {
        match (self.index_of(from), self.index_of(to)) {
            (Some(a), Some(b)) => self.store.contains_link(a, b),
            _ => false,
        }
    }

    /// Successors of `vertex`, empty if it is absent.
    pub fn outgoing_vertices<'g>(&'g self, vertex: &V) -> impl Iterator<Item = &'g V> + 'g {
        let store = &self.store;
        self.index_of(vertex)
            .into_iter()
            .flat_map(move |idx| store.successors(idx).iter().map(move |&s| store.vertex(s)))
    }

    /// Predecessors of `vertex`, empty if it is absent.
    ///
    /// Scans every row unless the reverse index is materialized.
    pub fn incoming_vertices<'g>(&'g self, vertex: &V) -> impl Iterator<Item = &'g V> + 'g {
        let store = &self.store;
        self.index_of(vertex)
            .into_iter()
            .flat_map(move |idx| store.predecessors(idx).map(move |p| store.vertex(p)))
    }
}

impl<V, S: Equivalence<V>> Graph<V, S> {
    /// Whether every item of `vertices` is a member.
    pub(crate) fn contains_all<I>(&self, vertices: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<V>,
    {
        vertices
            .into_iter()
            .all(|v| self.contains_vertex(v.borrow()))
    }
}

impl<V, S: Equivalence<V>> PartialEq for Graph<V, S> {
    /// Set equality of vertices and edges.
    fn eq(&self, other: &Self) -> bool {
        self.graph_equals(other)
    }
}

impl<V: fmt::Debug, S> fmt::Debug for Graph<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("direction", &self.direction())
            .field("vertices", &self.vertices().iter().collect::<Vec<_>>())
            .field(
                "edges",
                &self
                    .edges()
                    .iter()
                    .map(|e| (e.from, e.to))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<V, S: Equivalence<V> + Default> FromIterator<Edge<V>> for Graph<V, S> {
    fn from_iter<I: IntoIterator<Item = Edge<V>>>(iter: I) -> Self {
        let mut g = Self::default();
        g.extend_edges(iter);
        g
    }
}

impl<V, S: Equivalence<V>> Extend<Edge<V>> for Graph<V, S> {
    fn extend<I: IntoIterator<Item = Edge<V>>>(&mut self, iter: I) {
        self.extend_edges(iter);
    }
}

#[cfg(test)]
mod tests;
