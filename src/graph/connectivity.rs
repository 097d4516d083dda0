//! # Reachability, cycles and components
//!
//! All traversals run over slot indices with dense `Vec`/`BitVec` scratch
//! space sized to the arena capacity, and are iterative so that deep graphs
//! cannot overflow the call stack.
//!
//! - [`Graph::has_path`]: breadth-first search, short-circuiting on the target
//! - [`Graph::is_cyclic`]: three-colour DFS (directed) or union-find
//!   (undirected); memoized
//! - [`Graph::is_connected`]: weak connectivity via union-find; memoized
//! - [`Graph::strongly_connected_components`]: Tarjan's algorithm
//!
//! Degree queries report an absent vertex as [`GraphError::InvalidArgument`].

use std::collections::VecDeque;

use bitvec::vec::BitVec;

use crate::equivalence::Equivalence;
use crate::error::Result;
use crate::union_find::UnionFind;

use super::store::VertexIndex;
use super::{Direction, Graph};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Grey,
    Black,
}

impl<V, S> Graph<V, S> {
    /// Whether `to` is reachable from `from` along a path of length ≥ 0.
    pub(crate) fn reaches(&self, from: VertexIndex, to: VertexIndex) -> bool {
        if from == to {
            return true;
        }
        let store = self.store();
        let mut seen: BitVec = BitVec::repeat(false, store.capacity());
        let mut queue = VecDeque::from([from]);
        seen.set(from.0, true);
        while let Some(node) = queue.pop_front() {
            for &next in store.successors(node) {
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

    /// Every slot reachable from `from`, `from` included.
    pub(crate) fn reachable_from(&self, from: VertexIndex) -> BitVec {
        let store = self.store();
        let mut seen: BitVec = BitVec::repeat(false, store.capacity());
        let mut stack = vec![from];
        seen.set(from.0, true);
        while let Some(node) = stack.pop() {
            for &next in store.successors(node) {
                if !seen.replace(next.0, true) {
                    stack.push(next);
                }
            }
        }
        seen
    }

    /// Whether some vertex reaches itself along a path of length ≥ 1.
    ///
    /// Self-loops count. For undirected graphs a cycle needs a self-loop or
    /// two distinct paths between a pair of vertices; a single edge walked
    /// back and forth does not count.
    pub fn is_cyclic(&self) -> bool {
        self.cache().cyclic_or_else(|| match self.direction() {
            Direction::Directed => self.find_directed_cycle(),
            Direction::Undirected => self.find_undirected_cycle(),
        })
    }

    fn find_directed_cycle(&self) -> bool {
        let store = self.store();
        let mut color = vec![Color::White; store.capacity()];
        for root in store.indices() {
            if color[root.0] != Color::White {
                continue;
            }
            color[root.0] = Color::Grey;
            let mut stack: Vec<(VertexIndex, usize)> = vec![(root, 0)];
            while let Some(top) = stack.last_mut() {
                let (node, pos) = *top;
                match store.successors(node).get_index(pos).copied() {
                    Some(next) => {
                        top.1 += 1;
                        match color[next.0] {
                            Color::Grey => return true,
                            Color::White => {
                                color[next.0] = Color::Grey;
                                stack.push((next, 0));
                            }
                            Color::Black => {}
                        }
                    }
                    None => {
                        color[node.0] = Color::Black;
                        stack.pop();
                    }
                }
            }
        }
        false
    }

    fn find_undirected_cycle(&self) -> bool {
        let store = self.store();
        let mut uf = UnionFind::new(store.capacity());
        store
            .links()
            .any(|(a, b)| a == b || !uf.union(a.0, b.0))
    }

    /// Weak connectivity. Empty and single-vertex graphs are connected.
    pub fn is_connected(&self) -> bool {
        self.cache().connected_or_else(|| {
            let store = self.store();
            if store.len() <= 1 {
                return true;
            }
            let uf = self.weak_components();
            let dead = store.capacity() - store.len();
            uf.n_sets() - dead == 1
        })
    }

    fn weak_components(&self) -> UnionFind {
        let store = self.store();
        let mut uf = UnionFind::new(store.capacity());
        for (a, b) in store.links() {
            uf.union(a.0, b.0);
        }
        uf
    }

    /// Weak components as slot groups, each in insertion order, ordered by
    /// their first vertex.
    pub(crate) fn weak_component_indices(&self) -> Vec<Vec<VertexIndex>> {
        let store = self.store();
        self.weak_components()
            .groups()
            .into_iter()
            .map(|group| group.into_iter().map(VertexIndex).collect::<Vec<_>>())
            .filter(|group| store.slot(group[0]).is_some())
            .collect()
    }

    /// Strong components as slot groups, each in insertion order, ordered
    /// by their first vertex.
    pub(crate) fn strong_component_indices(&self) -> Vec<Vec<VertexIndex>> {
        let mut tarjan = Tarjan::new(self.store().capacity());
        for root in self.store().indices() {
            if tarjan.index[root.0] == UNVISITED {
                tarjan.run(self, root);
            }
        }
        let mut components = tarjan.components;
        for component in &mut components {
            component.sort_unstable();
        }
        components.sort_unstable_by_key(|c| c[0]);
        components
    }

    /// Strongly connected components, each in insertion order and ordered
    /// by their first vertex. Every vertex belongs to exactly one component.
    pub fn strongly_connected_components(&self) -> Vec<Vec<&V>> {
        self.strong_component_indices()
            .into_iter()
            .map(|c| c.into_iter().map(|idx| self.vertex_at(idx)).collect())
            .collect()
    }

    /// In-degree of every slot; dead slots read zero.
    fn indegrees(&self) -> Vec<usize> {
        let store = self.store();
        let mut degrees = vec![0; store.capacity()];
        for idx in store.indices() {
            for &to in store.successors(idx) {
                degrees[to.0] += 1;
            }
        }
        degrees
    }

    /// Vertices without incoming or outgoing edges, in insertion order.
    pub fn isolated_vertices(&self) -> Vec<&V> {
        let store = self.store();
        let indegrees = self.indegrees();
        store
            .iter()
            .filter(|&(idx, _)| store.successors(idx).is_empty() && indegrees[idx.0] == 0)
            .map(|(_, v)| v)
            .collect()
    }

    /// Vertices without incoming edges, in insertion order.
    pub fn sources(&self) -> Vec<&V> {
        let indegrees = self.indegrees();
        self.store()
            .iter()
            .filter(|&(idx, _)| indegrees[idx.0] == 0)
            .map(|(_, v)| v)
            .collect()
    }

    /// Vertices without outgoing edges, in insertion order.
    pub fn sinks(&self) -> Vec<&V> {
        let store = self.store();
        store
            .iter()
            .filter(|&(idx, _)| store.successors(idx).is_empty())
            .map(|(_, v)| v)
            .collect()
    }
}

impl<V, S: Equivalence<V>> Graph<V, S> {
    /// Whether `to` is reachable from `from`. A present vertex reaches
    /// itself; an absent endpoint reaches nothing.
    pub fn has_path(&self, from: &V, to: &V) -> bool {
        match (self.index_of(from), self.index_of(to)) {
            (Some(a), Some(b)) => self.reaches(a, b),
            _ => false,
        }
    }

    /// Number of edges leaving `vertex`; a self-loop counts once.
    ///
    /// For undirected graphs this is the number of distinct neighbours.
    pub fn outdegree(&self, vertex: &V) -> Result<usize> {
        let idx = self.require(vertex, "outdegree")?;
        Ok(self.store().successors(idx).len())
    }

    /// Number of edges entering `vertex`; a self-loop counts once.
    ///
    /// For undirected graphs this equals [`Graph::outdegree`].
    pub fn indegree(&self, vertex: &V) -> Result<usize> {
        let idx = self.require(vertex, "indegree")?;
        Ok(self.store().predecessors(idx).count())
    }

    /// `outdegree + indegree` for directed graphs.
    ///
    /// Undirected graphs use the handshake degree instead: each incident edge
    /// counts once and a self-loop twice, so `1-2, 1-1` gives vertex `1`
    /// degree 3 while its outdegree and indegree are both 2.
    pub fn degree(&self, vertex: &V) -> Result<usize> {
        let idx = self.require(vertex, "degree")?;
        let store = self.store();
        let out = store.successors(idx).len();
        Ok(match self.direction() {
            Direction::Directed => out + store.predecessors(idx).count(),
            Direction::Undirected => out + usize::from(store.contains_link(idx, idx)),
        })
    }

    pub fn is_vertex_isolated(&self, vertex: &V) -> Result<bool> {
        let idx = self.require(vertex, "is_vertex_isolated")?;
        let store = self.store();
        Ok(store.successors(idx).is_empty() && store.predecessors(idx).next().is_none())
    }
}

impl<V: Clone, S: Equivalence<V> + Clone> Graph<V, S> {
    /// One graph per weak component, ordered by each component's first
    /// vertex. Options and equivalence are inherited.
    pub fn connected_components(&self) -> Vec<Self> {
        self.weak_component_indices()
            .into_iter()
            .map(|members| {
                let mut keep: BitVec = BitVec::repeat(false, self.store().capacity());
                for idx in members {
                    keep.set(idx.0, true);
                }
                self.induced_copy(&keep)
            })
            .collect()
    }
}

const UNVISITED: usize = usize::MAX;

/// Scratch state for an iterative Tarjan walk.
struct Tarjan {
    index: Vec<usize>,
    lowlink: Vec<usize>,
    on_stack: BitVec,
    stack: Vec<VertexIndex>,
    counter: usize,
    components: Vec<Vec<VertexIndex>>,
}

impl Tarjan {
    fn new(capacity: usize) -> Self {
        Tarjan {
            index: vec![UNVISITED; capacity],
            lowlink: vec![0; capacity],
            on_stack: BitVec::repeat(false, capacity),
            stack: Vec::new(),
            counter: 0,
            components: Vec::new(),
        }
    }

    fn visit(&mut self, v: VertexIndex) {
        self.index[v.0] = self.counter;
        self.lowlink[v.0] = self.counter;
        self.counter += 1;
        self.stack.push(v);
        self.on_stack.set(v.0, true);
    }

    fn run<V, S>(&mut self, graph: &Graph<V, S>, root: VertexIndex) {
        let store = graph.store();
        self.visit(root);
        let mut calls: Vec<(VertexIndex, usize)> = vec![(root, 0)];
        while let Some(top) = calls.last_mut() {
            let (v, pos) = *top;
            if let Some(&w) = store.successors(v).get_index(pos) {
                top.1 += 1;
                if self.index[w.0] == UNVISITED {
                    self.visit(w);
                    calls.push((w, 0));
                } else if self.on_stack[w.0] {
                    self.lowlink[v.0] = self.lowlink[v.0].min(self.index[w.0]);
                }
                continue;
            }

            calls.pop();
            if let Some(&(parent, _)) = calls.last() {
                self.lowlink[parent.0] = self.lowlink[parent.0].min(self.lowlink[v.0]);
            }
            if self.lowlink[v.0] == self.index[v.0] {
                let mut component = Vec::new();
                while let Some(w) = self.stack.pop() {
                    self.on_stack.set(w.0, false);
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                self.components.push(component);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphError;
    use similar_asserts::assert_eq;

    #[test]
    fn cycle_appears_and_disappears() {
        let mut g = Graph::from_edges([(1, 2), (2, 3), (3, 1)]);
        assert!(g.is_cyclic());
        assert!(g.remove_edge(&3, &1));
        assert!(!g.is_cyclic());
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut g = Graph::from_edges([(1, 2)]);
        assert!(!g.is_cyclic());
        g.add_edge(2, 2);
        assert!(g.is_cyclic());

        let mut u = Graph::undirected();
        u.add_edge(1, 1);
        assert!(u.is_cyclic());
    }

    #[test]
    fn undirected_cycles_need_two_routes() {
        let mut g = Graph::undirected();
        g.add_edge('a', 'b');
        g.add_edge('b', 'c');
        assert!(!g.is_cyclic());
        g.add_edge('c', 'a');
        assert!(g.is_cyclic());
    }

    #[test]
    fn paths_follow_direction() {
        let g = Graph::from_edges([(1, 2), (2, 3)]);
        assert!(g.has_path(&1, &3));
        assert!(!g.has_path(&3, &1));
        assert!(g.has_path(&2, &2));
        assert!(!g.has_path(&9, &9));

        let mut u = Graph::undirected();
        u.add_edge(1, 2);
        u.add_edge(2, 3);
        assert!(u.has_path(&3, &1));
    }

    #[test]
    fn weak_connectivity() {
        let mut g: Graph<i32> = Graph::new();
        assert!(g.is_connected());
        g.add_vertex(1);
        assert!(g.is_connected());
        g.add_vertex(2);
        assert!(!g.is_connected());
        g.add_edge(2, 1);
        assert!(g.is_connected());
        g.add_edge(3, 4);
        assert!(!g.is_connected());
        g.remove_vertex(&4);
        g.remove_vertex(&3);
        assert!(g.is_connected());
    }

    #[test]
    fn components_split_by_weak_connectivity() {
        let mut g = Graph::from_edges([(1, 2), (3, 4), (4, 3), (2, 5)]);
        g.add_vertex(6);
        let parts = g.connected_components();
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts
                .iter()
                .map(|p| p.vertices().iter().copied().collect::<Vec<_>>())
                .collect::<Vec<_>>(),
            vec![vec![1, 2, 5], vec![3, 4], vec![6]]
        );
        assert_eq!(parts[1].size(), 2);
        assert!(parts.iter().all(Graph::is_connected));
    }

    #[test]
    fn strong_components() {
        let g = Graph::from_edges([(1, 2), (2, 3), (3, 2), (3, 4), (4, 5), (5, 4)]);
        assert_eq!(
            g.strongly_connected_components(),
            vec![vec![&1], vec![&2, &3], vec![&4, &5]]
        );
    }

    #[test]
    fn degrees_count_self_loops_once_per_side() {
        let g = Graph::from_edges([('a', 'a'), ('a', 'b'), ('c', 'a')]);
        assert_eq!(g.outdegree(&'a'), Ok(2));
        assert_eq!(g.indegree(&'a'), Ok(2));
        assert_eq!(g.degree(&'a'), Ok(4));
        assert_eq!(g.is_vertex_isolated(&'b'), Ok(false));
        assert!(matches!(
            g.degree(&'z'),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn undirected_degrees() {
        let mut g = Graph::undirected();
        g.add_edge('a', 'b');
        g.add_edge('a', 'a');
        g.add_vertex('c');
        assert_eq!(g.outdegree(&'a'), Ok(2));
        assert_eq!(g.indegree(&'a'), Ok(2));
        assert_eq!(g.degree(&'a'), Ok(3));
        assert_ne!(g.degree(&'a'), Ok(4));
        assert_eq!(g.degree(&'b'), Ok(1));
        assert_eq!(g.outdegree(&'b'), g.indegree(&'b'));
        assert_eq!(g.is_vertex_isolated(&'c'), Ok(true));
    }

    #[test]
    fn sources_sinks_and_isolated() {
        let mut g = Graph::from_edges([(1, 2), (2, 3), (4, 3)]);
        g.add_vertex(5);
        assert_eq!(g.sources(), vec![&1, &4, &5]);
        assert_eq!(g.sinks(), vec![&3, &5]);
        assert_eq!(g.isolated_vertices(), vec![&5]);
    }

    #[test]
    fn reverse_index_gives_same_answers() {
        let mut g = Graph::from_edges([(1, 2), (3, 2), (2, 2)]);
        let before = g.indegree(&2);
        g.materialize_reverse_index();
        assert_eq!(g.indegree(&2), before);
        assert_eq!(g.indegree(&2), Ok(3));
    }
}
