//! Set façades over a graph's vertices and edges.
//!
//! The views hold no data of their own: every query and mutation goes to the
//! adjacency store, and mutations keep the graph's cache coherent.

use std::borrow::Borrow;
use std::iter::FusedIterator;

use crate::equivalence::{EdgeEquivalence, Equivalence, ProbeSet};

use super::cursor::{EdgeCursor, VertexCursor};
use super::store::{Slot, VertexIndex};
use super::{Direction, Edge, Graph};

/// Read-only view of a graph's vertex set.
pub struct VertexSet<'g, V, S> {
    graph: &'g Graph<V, S>,
}

impl<V, S> Clone for VertexSet<'_, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, S> Copy for VertexSet<'_, V, S> {}

impl<'g, V, S> VertexSet<'g, V, S> {
    pub(crate) fn new(graph: &'g Graph<V, S>) -> Self {
        VertexSet { graph }
    }

    pub fn len(&self) -> usize {
        self.graph.order()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vertices in insertion order.
    pub fn iter(&self) -> Vertices<'g, V> {
        Vertices::new(self.graph)
    }

    /// A detached cursor; see [`VertexCursor`].
    pub fn cursor(&self) -> VertexCursor {
        VertexCursor::new(self.graph)
    }
}

impl<'g, V, S: Equivalence<V>> VertexSet<'g, V, S> {
    pub fn contains(&self, vertex: &V) -> bool {
        self.graph.contains_vertex(vertex)
    }

    /// Every vertex of this set occurs in `other`.
    pub fn is_subset_of<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
        'g: 'a,
    {
        let strategy = VertexStrategy(self.graph.equivalence());
        let probe = ProbeSet::new(&strategy, other);
        probe.len() >= self.len() && self.iter().all(|v| probe.contains(&v))
    }

    pub fn is_proper_subset_of<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
        'g: 'a,
    {
        let strategy = VertexStrategy(self.graph.equivalence());
        let probe = ProbeSet::new(&strategy, other);
        probe.len() > self.len() && self.iter().all(|v| probe.contains(&v))
    }

    /// Every item of `other` is a vertex of this set.
    pub fn is_superset_of<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        other.into_iter().all(|v| self.contains(v))
    }

    pub fn is_proper_superset_of<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        let strategy = VertexStrategy(self.graph.equivalence());
        let probe = ProbeSet::new(&strategy, other);
        probe.len() < self.len() && probe.iter().all(|v| self.contains(v))
    }

    /// Same members as `other`, ignoring duplicates and order.
    pub fn set_equals<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        let strategy = VertexStrategy(self.graph.equivalence());
        let probe = ProbeSet::new(&strategy, other);
        probe.len() == self.len() && probe.iter().all(|v| self.contains(v))
    }

    pub fn overlaps<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        other.into_iter().any(|v| self.contains(v))
    }
}

impl<'g, V, S> IntoIterator for VertexSet<'g, V, S> {
    type Item = &'g V;
    type IntoIter = Vertices<'g, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lifts a vertex strategy to references, for probing borrowed collections.
pub(crate) struct VertexStrategy<'s, S>(pub(crate) &'s S);

impl<'v, V, S: Equivalence<V>> Equivalence<&'v V> for VertexStrategy<'_, S> {
    fn equivalent(&self, a: &&'v V, b: &&'v V) -> bool {
        self.0.equivalent(a, b)
    }

    fn hash<H: std::hash::Hasher>(&self, value: &&'v V, state: &mut H) {
        self.0.hash(value, state)
    }
}

/// Iterator over vertices, in insertion order.
pub struct Vertices<'g, V> {
    slots: std::slice::Iter<'g, Option<Slot<V>>>,
    remaining: usize,
}

impl<'g, V> Vertices<'g, V> {
    fn new<S>(graph: &'g Graph<V, S>) -> Self {
        Vertices {
            slots: graph.store().raw_slots().iter(),
            remaining: graph.order(),
        }
    }
}

impl<'g, V> Iterator for Vertices<'g, V> {
    type Item = &'g V;

    fn next(&mut self) -> Option<Self::Item> {
        let vertex = self.slots.by_ref().find_map(|slot| slot.as_ref())?;
        self.remaining -= 1;
        Some(&vertex.vertex)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Vertices<'_, V> {}
impl<V> FusedIterator for Vertices<'_, V> {}

/// Mutable view of a graph's vertex set.
pub struct VertexSetMut<'g, V, S> {
    graph: &'g mut Graph<V, S>,
}

impl<'g, V, S> VertexSetMut<'g, V, S> {
    pub(crate) fn new(graph: &'g mut Graph<V, S>) -> Self {
        VertexSetMut { graph }
    }

    pub fn view(&self) -> VertexSet<'_, V, S> {
        VertexSet::new(self.graph)
    }

    pub fn len(&self) -> usize {
        self.graph.order()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every vertex, and with them every edge.
    pub fn clear(&mut self) {
        self.graph.clear();
    }
}

impl<'g, V, S: Equivalence<V>> VertexSetMut<'g, V, S> {
    pub fn contains(&self, vertex: &V) -> bool {
        self.graph.contains_vertex(vertex)
    }

    pub fn add(&mut self, vertex: V) -> bool {
        self.graph.add_vertex(vertex)
    }

    pub fn remove(&mut self, vertex: &V) -> bool {
        self.graph.remove_vertex(vertex)
    }

    /// Adds every item; one version bump for the whole batch.
    pub fn union_with<I: IntoIterator<Item = V>>(&mut self, vertices: I) {
        let mut changed = false;
        for v in vertices {
            changed |= self.graph.insert_vertex_at(v).1;
        }
        if changed {
            self.graph.commit();
        }
    }

    /// Keeps only the vertices that occur in `vertices`.
    pub fn intersect_with<I>(&mut self, vertices: I)
    where
        I: IntoIterator,
        I::Item: Borrow<V>,
    {
        let keep: Vec<VertexIndex> = vertices
            .into_iter()
            .filter_map(|v| self.graph.index_of(v.borrow()))
            .collect();
        let mut marked = bitvec::vec::BitVec::<usize>::repeat(false, self.graph.store().capacity());
        for idx in keep {
            marked.set(idx.0, true);
        }
        self.retain_indices(|idx| marked[idx.0]);
    }

    /// Removes every vertex that occurs in `vertices`.
    pub fn except_with<I>(&mut self, vertices: I)
    where
        I: IntoIterator,
        I::Item: Borrow<V>,
    {
        let drop: Vec<VertexIndex> = vertices
            .into_iter()
            .filter_map(|v| self.graph.index_of(v.borrow()))
            .collect();
        let mut marked = bitvec::vec::BitVec::<usize>::repeat(false, self.graph.store().capacity());
        for idx in drop {
            marked.set(idx.0, true);
        }
        self.retain_indices(|idx| !marked[idx.0]);
    }

    /// Keeps the vertices for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&V) -> bool) {
        let graph = &*self.graph;
        let doomed: Vec<VertexIndex> = graph
            .store()
            .iter()
            .filter(|(_, v)| !keep(*v))
            .map(|(idx, _)| idx)
            .collect();
        self.remove_indices(doomed);
    }

    fn retain_indices(&mut self, keep: impl Fn(VertexIndex) -> bool) {
        let doomed: Vec<VertexIndex> = self.graph.store().indices().filter(|&i| !keep(i)).collect();
        self.remove_indices(doomed);
    }

    fn remove_indices(&mut self, doomed: Vec<VertexIndex>) {
        if doomed.is_empty() {
            return;
        }
        for idx in doomed {
            self.graph.remove_at(idx);
        }
        self.graph.commit();
    }
}

/// Read-only view of a graph's edge set.
pub struct EdgeSet<'g, V, S> {
    graph: &'g Graph<V, S>,
}

impl<V, S> Clone for EdgeSet<'_, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, S> Copy for EdgeSet<'_, V, S> {}

impl<'g, V, S> EdgeSet<'g, V, S> {
    pub(crate) fn new(graph: &'g Graph<V, S>) -> Self {
        EdgeSet { graph }
    }

    /// Number of edges; an undirected pair counts once.
    pub fn len(&self) -> usize {
        self.graph.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn direction(&self) -> Direction {
        self.graph.direction()
    }

    /// Edges grouped by source vertex, sources in insertion order.
    ///
    /// Undirected pairs are yielded once, oriented from the earlier inserted
    /// endpoint.
    pub fn iter(&self) -> Edges<'g, V, S> {
        Edges::new(self.graph)
    }

    pub fn cursor(&self) -> EdgeCursor {
        EdgeCursor::new(self.graph)
    }
}

impl<'g, V, S: Equivalence<V>> EdgeSet<'g, V, S> {
    /// Whether the edge is present, honoring the direction mode.
    pub fn contains(&self, from: &V, to: &V) -> bool {
        self.graph.contains_edge(from, to)
    }

    pub fn contains_edge(&self, edge: Edge<&V>) -> bool {
        self.graph.contains_edge(edge.from, edge.to)
    }

    fn strategy(&self) -> EdgeEquivalence<'g, S> {
        EdgeEquivalence::new(self.graph.direction(), self.graph.equivalence())
    }

    /// Every edge of this set occurs in `other`, compared under this set's
    /// direction mode.
    pub fn is_subset_of<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = Edge<&'a V>>,
        V: 'a,
        'g: 'a,
    {
        let strategy = self.strategy();
        let probe = ProbeSet::new(&strategy, other);
        self.iter().all(|e| probe.contains(&e))
    }

    pub fn is_superset_of<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = Edge<&'a V>>,
        V: 'a,
    {
        other.into_iter().all(|e| self.contains_edge(e))
    }

    pub fn set_equals<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = Edge<&'a V>>,
        V: 'a,
        'g: 'a,
    {
        let strategy = self.strategy();
        let probe = ProbeSet::new(&strategy, other);
        probe.len() == self.len() && probe.iter().all(|e| self.contains_edge(*e))
    }

    pub fn overlaps<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = Edge<&'a V>>,
        V: 'a,
    {
        other.into_iter().any(|e| self.contains_edge(e))
    }
}

impl<'g, V, S> IntoIterator for EdgeSet<'g, V, S> {
    type Item = Edge<&'g V>;
    type IntoIter = Edges<'g, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over edges; see [`EdgeSet::iter`].
pub struct Edges<'g, V, S> {
    graph: &'g Graph<V, S>,
    from: usize,
    offset: usize,
}

impl<'g, V, S> Edges<'g, V, S> {
    fn new(graph: &'g Graph<V, S>) -> Self {
        Edges {
            graph,
            from: 0,
            offset: 0,
        }
    }
}

impl<'g, V, S> Iterator for Edges<'g, V, S> {
    type Item = Edge<&'g V>;

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.graph.store();
        let (from, to) = store.link_at_or_after(&mut self.from, &mut self.offset)?;
        Some(Edge::new(store.vertex(from), store.vertex(to)))
    }
}

impl<V, S> FusedIterator for Edges<'_, V, S> {}

/// Mutable view of a graph's edge set.
pub struct EdgeSetMut<'g, V, S> {
    graph: &'g mut Graph<V, S>,
}

impl<'g, V, S> EdgeSetMut<'g, V, S> {
    pub(crate) fn new(graph: &'g mut Graph<V, S>) -> Self {
        EdgeSetMut { graph }
    }

    pub fn view(&self) -> EdgeSet<'_, V, S> {
        EdgeSet::new(self.graph)
    }

    pub fn len(&self) -> usize {
        self.graph.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every edge; vertices stay.
    pub fn clear(&mut self) {
        let links: Vec<_> = self.graph.store().links().collect();
        self.unlink_all(links);
    }

    fn unlink_all(&mut self, links: Vec<(VertexIndex, VertexIndex)>) {
        let mut changed = false;
        for (from, to) in links {
            changed |= self.graph.unlink_at(from, to);
        }
        if changed {
            self.graph.commit();
        }
    }
}

impl<'g, V, S: Equivalence<V>> EdgeSetMut<'g, V, S> {
    pub fn contains(&self, from: &V, to: &V) -> bool {
        self.graph.contains_edge(from, to)
    }

    /// Adds `from -> to`, registering missing endpoints.
    pub fn add(&mut self, from: V, to: V) -> bool {
        self.graph.add_edge(from, to)
    }

    pub fn remove(&mut self, from: &V, to: &V) -> bool {
        self.graph.remove_edge(from, to)
    }

    /// Adds every edge; one version bump for the whole batch.
    pub fn union_with<I>(&mut self, edges: I)
    where
        I: IntoIterator,
        I::Item: Into<Edge<V>>,
    {
        self.graph.extend_edges(edges);
    }

    /// Keeps only the edges that occur in `edges`.
    pub fn intersect_with<'a, I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = Edge<&'a V>>,
        V: 'a,
    {
        let graph = &*self.graph;
        let mut keep = ahash::AHashSet::new();
        for e in edges {
            if let (Some(a), Some(b)) = (graph.index_of(e.from), graph.index_of(e.to)) {
                if graph.store().contains_link(a, b) {
                    keep.insert((a, b));
                    if graph.direction() == Direction::Undirected {
                        keep.insert((b, a));
                    }
                }
            }
        }
        let doomed: Vec<_> = graph
            .store()
            .links()
            .filter(|link| !keep.contains(link))
            .collect();
        self.unlink_all(doomed);
    }

    /// Removes every edge that occurs in `edges`.
    pub fn except_with<'a, I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = Edge<&'a V>>,
        V: 'a,
    {
        let graph = &*self.graph;
        let doomed: Vec<_> = edges
            .into_iter()
            .filter_map(|e| Some((graph.index_of(e.from)?, graph.index_of(e.to)?)))
            .collect();
        self.unlink_all(doomed);
    }

    /// Keeps the edges for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(Edge<&V>) -> bool) {
        let graph = &*self.graph;
        let store = graph.store();
        let doomed: Vec<_> = store
            .links()
            .filter(|&(a, b)| !keep(Edge::new(store.vertex(a), store.vertex(b))))
            .collect();
        self.unlink_all(doomed);
    }
}
