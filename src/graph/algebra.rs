//! Set algebra between graphs and subgraph predicates.
//!
//! Two graphs are compared vertex-by-value through the receiver's
//! equivalence, and edge-by-value under the receiver's direction mode.

use crate::equivalence::Equivalence;

use super::store::VertexIndex;
use super::Graph;

impl<V, S: Equivalence<V>> Graph<V, S> {
    fn all_edges_in(&self, other: &Self) -> bool {
        let store = self.store();
        store
            .links()
            .all(|(a, b)| other.contains_edge(store.vertex(a), store.vertex(b)))
    }

    fn all_vertices_in(&self, other: &Self) -> bool {
        self.vertices().iter().all(|v| other.contains_vertex(v))
    }

    /// Same vertex set and same edge set.
    pub fn graph_equals(&self, other: &Self) -> bool {
        self.direction() == other.direction()
            && self.order() == other.order()
            && self.size() == other.size()
            && self.all_vertices_in(other)
            && self.all_edges_in(other)
    }

    pub fn is_subgraph_of(&self, other: &Self) -> bool {
        self.order() <= other.order()
            && self.size() <= other.size()
            && self.all_vertices_in(other)
            && self.all_edges_in(other)
    }

    pub fn is_proper_subgraph_of(&self, other: &Self) -> bool {
        self.is_subgraph_of(other) && (self.order() < other.order() || self.size() < other.size())
    }

    pub fn is_supergraph_of(&self, other: &Self) -> bool {
        other.is_subgraph_of(self)
    }

    pub fn is_proper_supergraph_of(&self, other: &Self) -> bool {
        other.is_proper_subgraph_of(self)
    }

    /// A subgraph that also holds every edge of `other` between its vertices.
    pub fn is_vertex_induced_subgraph_of(&self, other: &Self) -> bool {
        if !self.is_subgraph_of(other) {
            return false;
        }
        let theirs = other.store();
        theirs.links().all(|(a, b)| {
            let (from, to) = (theirs.vertex(a), theirs.vertex(b));
            !(self.contains_vertex(from) && self.contains_vertex(to))
                || self.contains_edge(from, to)
        })
    }

    pub fn is_vertex_induced_supergraph_of(&self, other: &Self) -> bool {
        other.is_vertex_induced_subgraph_of(self)
    }

    /// A subgraph in which every vertex is the endpoint of some edge.
    pub fn is_edge_induced_subgraph_of(&self, other: &Self) -> bool {
        self.is_subgraph_of(other) && self.isolated_vertices().is_empty()
    }

    pub fn is_edge_induced_supergraph_of(&self, other: &Self) -> bool {
        other.is_edge_induced_subgraph_of(self)
    }

    /// Keeps only what `self` and `other` share: edges present in both, then
    /// vertices present in both.
    pub fn intersect_with(&mut self, other: &Self) {
        let store = self.store();
        let links: Vec<(VertexIndex, VertexIndex)> = store
            .links()
            .filter(|&(a, b)| !other.contains_edge(store.vertex(a), store.vertex(b)))
            .collect();
        let vertices: Vec<VertexIndex> = store
            .iter()
            .filter(|(_, v)| !other.contains_vertex(v))
            .map(|(idx, _)| idx)
            .collect();
        self.remove_all(links, vertices);
    }

    /// Removes `other`'s edges, then `other`'s vertices together with every
    /// edge still touching them.
    pub fn except_with(&mut self, other: &Self) {
        let store = self.store();
        let links: Vec<(VertexIndex, VertexIndex)> = store
            .links()
            .filter(|&(a, b)| other.contains_edge(store.vertex(a), store.vertex(b)))
            .collect();
        let vertices: Vec<VertexIndex> = store
            .iter()
            .filter(|(_, v)| other.contains_vertex(v))
            .map(|(idx, _)| idx)
            .collect();
        self.remove_all(links, vertices);
    }
}

impl<V: Clone, S: Equivalence<V>> Graph<V, S> {
    /// Adds every vertex and edge of `other`; edges are read under `self`'s
    /// direction mode.
    pub fn union_with(&mut self, other: &Self) {
        let mut changed = false;
        for v in other.vertices() {
            changed |= self.insert_vertex_at(v.clone()).1;
        }
        for e in other.edges() {
            changed |= self.insert_edge_at(e.from.clone(), e.to.clone());
        }
        if changed {
            self.commit();
        }
    }
}

impl<V: Clone, S: Equivalence<V> + Clone> Graph<V, S> {
    pub fn union(&self, other: &Self) -> Self {
        let mut copy = self.clone();
        copy.union_with(other);
        copy
    }

    pub fn intersect(&self, other: &Self) -> Self {
        let mut copy = self.clone();
        copy.intersect_with(other);
        copy
    }

    pub fn except(&self, other: &Self) -> Self {
        let mut copy = self.clone();
        copy.except_with(other);
        copy
    }
}
