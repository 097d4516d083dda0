//! # Structural transformations
//!
//! Every transformation comes in two forms: an in-place one that mutates the
//! receiver (bumping its version once if anything changed) and a `get_*` /
//! `*_subgraph` one that leaves the receiver untouched and returns a new
//! graph with the same options and equivalence.
//!
//! ## Transitive reduction
//!
//! Edges are visited in enumeration order; an edge `(u, v)` with `u != v` is
//! dropped as soon as `v` is still reachable from `u` without it. Removing an
//! edge never changes reachability, so the result has the same transitive
//! closure. On acyclic graphs this is the unique transitive reduction; on
//! cyclic graphs it is a minimal equivalent subgraph. Self-loops are kept.

use std::borrow::Borrow;
use std::collections::VecDeque;

use ahash::AHashSet;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;
use log::debug;

use crate::equivalence::Equivalence;
use crate::error::{GraphError, Result};

use super::store::VertexIndex;
use super::{Direction, Edge, Graph};

impl<V, S> Graph<V, S> {
    /// Reverses every edge. Undirected graphs are unchanged.
    pub fn transpose(&mut self) {
        if self.direction() == Direction::Undirected
            || !self.store.links().any(|(a, b)| a != b)
        {
            return;
        }
        self.store.transpose();
        self.cache.bump();
    }

    /// Removes every self-loop.
    pub fn reduce_reflexes(&mut self) {
        let loops: Vec<VertexIndex> = self
            .store
            .indices()
            .filter(|&idx| self.store.contains_link(idx, idx))
            .collect();
        if loops.is_empty() {
            return;
        }
        for idx in loops {
            self.unlink_at(idx, idx);
        }
        self.commit();
    }

    /// Removes every edge implied by a longer path; see the module docs.
    ///
    /// Returns [`GraphError::Unsupported`] for undirected graphs.
    pub fn reduce_transitions(&mut self) -> Result<()> {
        if self.direction() == Direction::Undirected {
            return Err(GraphError::Unsupported(
                "transitive reduction of an undirected graph",
            ));
        }
        let candidates: Vec<(VertexIndex, VertexIndex)> =
            self.store.links().filter(|&(a, b)| a != b).collect();
        let mut removed = 0;
        for (from, to) in candidates {
            if self.reaches_bypassing(from, to) {
                self.unlink_at(from, to);
                removed += 1;
            }
        }
        debug!("transitive reduction dropped {removed} edges");
        if removed > 0 {
            self.commit();
        }
        Ok(())
    }

    /// Whether `to` is reachable from `from` without using the edge
    /// `from -> to` itself.
    fn reaches_bypassing(&self, from: VertexIndex, to: VertexIndex) -> bool {
        let store = &self.store;
        let mut seen: BitVec = BitVec::repeat(false, store.capacity());
        let mut queue = VecDeque::from([from]);
        seen.set(from.0, true);
        while let Some(node) = queue.pop_front() {
            for &next in store.successors(node) {
                if node == from && next == to {
                    continue;
                }
                if next == to {
                    return true;
                }
                if !seen.replace(next.0, true) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Adds `(u, w)` for every path `u ⇝ w` of length ≥ 1, including `(u, u)`
    /// for vertices on a cycle.
    ///
    /// Returns [`GraphError::Unsupported`] for undirected graphs.
    pub fn close_transitions(&mut self) -> Result<()> {
        if self.direction() == Direction::Undirected {
            return Err(GraphError::Unsupported(
                "transitive closure of an undirected graph",
            ));
        }
        let reach: Vec<(VertexIndex, BitVec)> = self
            .store
            .indices()
            .map(|idx| (idx, self.strict_reach(idx)))
            .collect();
        let mut added = 0;
        for (from, targets) in reach {
            for to in targets.iter_ones() {
                if self.link_at(from, VertexIndex(to)) {
                    added += 1;
                }
            }
        }
        debug!("transitive closure added {added} edges");
        if added > 0 {
            self.commit();
        }
        Ok(())
    }

    /// Slots reachable from `from` along paths of length ≥ 1.
    fn strict_reach(&self, from: VertexIndex) -> BitVec {
        let store = &self.store;
        let mut seen: BitVec = BitVec::repeat(false, store.capacity());
        let mut stack: Vec<VertexIndex> = Vec::new();
        for &next in store.successors(from) {
            if !seen.replace(next.0, true) {
                stack.push(next);
            }
        }
        while let Some(node) = stack.pop() {
            for &next in store.successors(node) {
                if !seen.replace(next.0, true) {
                    stack.push(next);
                }
            }
        }
        seen
    }

    pub(crate) fn remove_all(
        &mut self,
        links: Vec<(VertexIndex, VertexIndex)>,
        vertices: Vec<VertexIndex>,
    ) {
        if links.is_empty() && vertices.is_empty() {
            return;
        }
        for (from, to) in links {
            self.unlink_at(from, to);
        }
        for idx in vertices {
            self.remove_at(idx);
        }
        self.commit();
    }
}

impl<V: Clone, S: Clone> Graph<V, S> {
    pub fn get_transposition(&self) -> Self {
        let mut copy = self.clone();
        copy.transpose();
        copy
    }

    pub fn get_reflexive_reduction(&self) -> Self {
        let mut copy = self.clone();
        copy.reduce_reflexes();
        copy
    }

    pub fn get_transitive_reduction(&self) -> Result<Self> {
        let mut copy = self.clone();
        copy.reduce_transitions()?;
        Ok(copy)
    }

    pub fn get_transitive_closure(&self) -> Result<Self> {
        let mut copy = self.clone();
        copy.close_transitions()?;
        Ok(copy)
    }
}

impl<V: Clone, S: Equivalence<V> + Clone> Graph<V, S> {
    /// A new graph holding the marked slots and every link the predicate
    /// accepts between them, in this graph's enumeration order.
    pub(crate) fn copy_where(
        &self,
        keep_vertex: &BitSlice,
        mut keep_link: impl FnMut(VertexIndex, VertexIndex) -> bool,
    ) -> Self {
        let mut copy = Graph::with_equivalence(self.options(), self.equivalence().clone());
        let mut remap: Vec<Option<VertexIndex>> = vec![None; self.store.capacity()];
        for (idx, vertex) in self.store.iter() {
            if keep_vertex[idx.0] {
                remap[idx.0] = Some(copy.insert_vertex_at(vertex.clone()).0);
            }
        }
        for (from, to) in self.store.links() {
            if let (Some(a), Some(b)) = (remap[from.0], remap[to.0]) {
                if keep_link(from, to) {
                    copy.link_at(a, b);
                }
            }
        }
        copy
    }

    /// Copy restricted to the marked slots and the links between them.
    pub(crate) fn induced_copy(&self, keep: &BitSlice) -> Self {
        self.copy_where(keep, |_, _| true)
    }

    /// The subgraph on exactly `vertices`, with every edge between them.
    ///
    /// Fails with [`GraphError::InvalidArgument`] if any item is not a vertex.
    pub fn vertex_induced_subgraph<I>(&self, vertices: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Borrow<V>,
    {
        let keep = self.mark_vertices(vertices, "vertex_induced_subgraph")?;
        Ok(self.induced_copy(&keep))
    }

    /// The subgraph made of exactly `edges` and their endpoints.
    ///
    /// Fails with [`GraphError::InvalidArgument`] if any item is not an edge.
    pub fn edge_induced_subgraph<'a, I>(&self, edges: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Edge<&'a V>>,
        V: 'a,
    {
        let (vertices, links) = self.mark_edges(edges, "edge_induced_subgraph")?;
        Ok(self.copy_where(&vertices, |a, b| links.contains(&(a, b))))
    }
}

impl<V, S: Equivalence<V>> Graph<V, S> {
    fn mark_vertices<I>(&self, vertices: I, operation: &str) -> Result<BitVec>
    where
        I: IntoIterator,
        I::Item: Borrow<V>,
    {
        let mut keep: BitVec = BitVec::repeat(false, self.store.capacity());
        for v in vertices {
            let idx = self.require(v.borrow(), operation)?;
            keep.set(idx.0, true);
        }
        Ok(keep)
    }

    /// Endpoint marks plus the set of named links. Undirected links are
    /// recorded in both orientations.
    fn mark_edges<'a, I>(
        &self,
        edges: I,
        operation: &str,
    ) -> Result<(BitVec, AHashSet<(VertexIndex, VertexIndex)>)>
    where
        I: IntoIterator,
        I::Item: Into<Edge<&'a V>>,
        V: 'a,
    {
        let mut vertices: BitVec = BitVec::repeat(false, self.store.capacity());
        let mut links = AHashSet::new();
        for edge in edges {
            let Edge { from, to } = edge.into();
            let link = match (self.index_of(from), self.index_of(to)) {
                (Some(a), Some(b)) if self.store.contains_link(a, b) => (a, b),
                _ => return Err(GraphError::missing_edge(operation)),
            };
            vertices.set(link.0 .0, true);
            vertices.set(link.1 .0, true);
            links.insert(link);
            if self.direction() == Direction::Undirected {
                links.insert((link.1, link.0));
            }
        }
        Ok((vertices, links))
    }

    /// Restricts the graph to exactly `vertices` and the edges between them.
    ///
    /// Every item is validated before anything is removed; on
    /// [`GraphError::InvalidArgument`] the graph is unchanged.
    pub fn subgraph_vertices<I>(&mut self, vertices: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Borrow<V>,
    {
        let keep = self.mark_vertices(vertices, "subgraph_vertices")?;
        let doomed: Vec<VertexIndex> = self.store.indices().filter(|i| !keep[i.0]).collect();
        self.remove_all(Vec::new(), doomed);
        Ok(())
    }

    /// Restricts the graph to exactly `edges` and their endpoints.
    ///
    /// Every item is validated before anything is removed; on
    /// [`GraphError::InvalidArgument`] the graph is unchanged.
    pub fn subgraph_edges<'a, I>(&mut self, edges: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Edge<&'a V>>,
        V: 'a,
    {
        let (vertices, links) = self.mark_edges(edges, "subgraph_edges")?;
        let doomed_links: Vec<_> = self
            .store
            .links()
            .filter(|link| !links.contains(link))
            .collect();
        let doomed: Vec<VertexIndex> = self.store.indices().filter(|i| !vertices[i.0]).collect();
        self.remove_all(doomed_links, doomed);
        Ok(())
    }
}
