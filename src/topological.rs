//! # Stable topological ordering
//!
//! Orders an arbitrary sequence so that every element comes after the
//! elements it (transitively) depends on, while elements that are unrelated
//! keep their relative input order.
//!
//! ## Dependency relation
//!
//! Elements are projected to keys, and the relation lives on keys in a
//! directed [`Graph`] where an edge `x -> y` means *x depends on y*. It can be
//! given three ways:
//!
//! - a pairwise predicate, [`TopologicalSort::depends_on`]
//! - a per-key dependency list, [`TopologicalSort::dependencies`]
//! - a prebuilt graph, [`TopologicalSort::dependency_graph`]
//!
//! Self-dependencies are ignored. A key that lies on a cycle of length ≥ 2
//! makes the whole request fail with [`GraphError::CircularDependency`],
//! detected while the relation is built.
//!
//! ## Algorithm
//!
//! Selection sort over the partial order: for each position `i`, scan the
//! remaining elements for one that must precede the current pick and move
//! the final pick to `i` without disturbing the others. Element `b` must
//! precede `a` when `b` is reachable from `a` but not the other way round.
//! This is quadratic by nature; a comparison sort would not be stable under a
//! partial order.
//!
//! Secondary keys ([`TopologicalOrder::then_by`]) are applied as one stable
//! sort of the input before the selection pass, so they only decide between
//! unrelated elements. [`TopologicalOrder::reverse`] flips the operands of
//! the precedence test; it does not reverse the output.
//!
//! ```
//! use topograph::TopologicalSort;
//!
//! let tasks = ["test", "link", "compile", "lint"];
//! let order = TopologicalSort::new(tasks)
//!     .depends_on(|a, b| matches!((*a, *b), ("test", "link") | ("link", "compile")))
//!     .unwrap();
//! assert_eq!(order.to_vec(), ["compile", "link", "test", "lint"]);
//! ```

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::fmt;

use bitvec::vec::BitVec;
use itertools::Itertools;
use log::{debug, trace};

use crate::equivalence::{Equivalence, NaturalEq};
use crate::error::{GraphError, Result};
use crate::graph::store::VertexIndex;
use crate::graph::{Direction, Graph, GraphOptions};

/// Builder pairing a source sequence with its keys.
///
/// Finish it with one of the three ways of stating dependencies.
pub struct TopologicalSort<T, K = T, S = NaturalEq> {
    source: Vec<T>,
    keys: Vec<K>,
    equivalence: S,
}

impl<T: Clone> TopologicalSort<T, T, NaturalEq> {
    /// Each element is its own key.
    pub fn new(source: impl IntoIterator<Item = T>) -> Self {
        let source: Vec<T> = source.into_iter().collect();
        TopologicalSort {
            keys: source.clone(),
            source,
            equivalence: NaturalEq,
        }
    }
}

impl<T, K> TopologicalSort<T, K, NaturalEq> {
    /// Keys are projected from the elements by `key`.
    pub fn by_key(source: impl IntoIterator<Item = T>, key: impl FnMut(&T) -> K) -> Self {
        let source: Vec<T> = source.into_iter().collect();
        TopologicalSort {
            keys: source.iter().map(key).collect(),
            source,
            equivalence: NaturalEq,
        }
    }
}

impl<T, K, S> TopologicalSort<T, K, S> {
    /// Compares keys with `equivalence` instead of their natural equality.
    pub fn with_equivalence<S2>(self, equivalence: S2) -> TopologicalSort<T, K, S2> {
        TopologicalSort {
            source: self.source,
            keys: self.keys,
            equivalence,
        }
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

impl<T, K, S: Equivalence<K>> TopologicalSort<T, K, S> {
    /// Registers every key and returns the slot of each element's key.
    fn seed(keys: Vec<K>, graph: &mut Graph<K, S>) -> Vec<VertexIndex> {
        keys.into_iter()
            .map(|key| graph.insert_vertex_at(key).0)
            .collect()
    }

    /// `depends(a, b)` states that `b` must precede `a`.
    ///
    /// The predicate is evaluated once per ordered pair of distinct keys.
    pub fn depends_on<'r>(
        self,
        mut depends: impl FnMut(&K, &K) -> bool,
    ) -> Result<TopologicalOrder<'r, T>> {
        let mut graph = Graph::with_equivalence(GraphOptions::directed(), self.equivalence);
        let slots = Self::seed(self.keys, &mut graph);
        let distinct: Vec<VertexIndex> = slots.iter().copied().unique().collect();
        for (&a, &b) in distinct.iter().tuple_combinations() {
            if depends(graph.vertex_at(a), graph.vertex_at(b)) {
                graph.link_at(a, b);
            }
            if depends(graph.vertex_at(b), graph.vertex_at(a)) {
                graph.link_at(b, a);
            }
        }
        TopologicalOrder::assemble(self.source, &slots, &graph)
    }

    /// `dependencies(k)` lists the keys that must precede `k`.
    ///
    /// Listed keys outside the source are queried in turn, so paths through
    /// them order the source elements. Every distinct key is queried once.
    pub fn dependencies<'r, I>(
        self,
        mut dependencies: impl FnMut(&K) -> I,
    ) -> Result<TopologicalOrder<'r, T>>
    where
        I: IntoIterator<Item = K>,
    {
        let mut graph = Graph::with_equivalence(GraphOptions::directed(), self.equivalence);
        let slots = Self::seed(self.keys, &mut graph);
        let mut pending: Vec<VertexIndex> = slots.iter().copied().unique().collect();
        pending.reverse();
        while let Some(a) = pending.pop() {
            let listed: Vec<K> = dependencies(graph.vertex_at(a)).into_iter().collect();
            for dep in listed {
                let (b, fresh) = graph.insert_vertex_at(dep);
                if fresh {
                    pending.push(b);
                }
                if a != b {
                    graph.link_at(a, b);
                }
            }
        }
        TopologicalOrder::assemble(self.source, &slots, &graph)
    }

    /// Uses `graph` as the relation; an edge `x -> y` means *x depends on
    /// y*. Keys are looked up with the graph's own equivalence; keys the
    /// graph lacks are unrelated to everything. Self-loops are removed
    /// before ordering and never count as a cycle.
    ///
    /// Fails with [`GraphError::Unsupported`] for an undirected graph.
    pub fn dependency_graph<'r>(self, mut graph: Graph<K, S>) -> Result<TopologicalOrder<'r, T>> {
        if graph.direction() == Direction::Undirected {
            return Err(GraphError::Unsupported(
                "topological order over an undirected dependency graph",
            ));
        }
        graph.reduce_reflexes();
        let slots = Self::seed(self.keys, &mut graph);
        TopologicalOrder::assemble(self.source, &slots, &graph)
    }
}

impl<V, S> Graph<V, S> {
    /// The graph's own vertices in topological order: for an edge `(a, b)`,
    /// `a` comes before `b`. Unrelated vertices keep insertion order.
    ///
    /// Self-loops are ignored. A graph whose only cycles are self-loops is
    /// therefore orderable even though [`Graph::is_cyclic`] reports `true`;
    /// any longer cycle fails with [`GraphError::CircularDependency`].
    ///
    /// ```
    /// use topograph::Graph;
    ///
    /// let g = Graph::from_edges([(2, 3), (1, 2)]);
    /// let order = g.order_topologically().unwrap();
    /// assert_eq!(order.to_vec(), [&1, &2, &3]);
    /// ```
    pub fn order_topologically(&self) -> Result<TopologicalOrder<'_, &V>> {
        if self.direction() == Direction::Undirected {
            return Err(GraphError::Unsupported(
                "topological order of an undirected graph",
            ));
        }
        let store = self.store();
        let mut deps: Graph<VertexIndex> = Graph::new();
        let mut slot_of: Vec<Option<VertexIndex>> = vec![None; store.capacity()];
        let mut source = Vec::with_capacity(store.len());
        let mut slots = Vec::with_capacity(store.len());
        for (idx, vertex) in store.iter() {
            let (slot, _) = deps.insert_vertex_at(idx);
            slot_of[idx.0] = Some(slot);
            source.push(vertex);
            slots.push(slot);
        }
        for (a, b) in store.links().filter(|(a, b)| a != b) {
            if let (Some(a), Some(b)) = (slot_of[a.0], slot_of[b.0]) {
                deps.link_at(b, a);
            }
        }
        TopologicalOrder::assemble(source, &slots, &deps)
    }
}

type Comparator<'r, T> = Box<dyn Fn(&T, &T) -> Ordering + 'r>;

/// A lazily evaluated, restartable topological order of a sequence.
///
/// The order is computed on first access and kept until a secondary key is
/// added or the direction of the precedence test is flipped.
pub struct TopologicalOrder<'r, T> {
    source: Vec<T>,
    /// Dense key id of each element.
    ids: Vec<usize>,
    /// `reach[x][y]`: key `y` is reachable from key `x` (length ≥ 0).
    reach: Vec<BitVec>,
    secondary: Vec<Comparator<'r, T>>,
    reversed: bool,
    order: OnceCell<Vec<usize>>,
}

impl<'r, T> TopologicalOrder<'r, T> {
    fn assemble<K, S>(
        source: Vec<T>,
        slots: &[VertexIndex],
        graph: &Graph<K, S>,
    ) -> Result<Self> {
        let capacity = graph.store().capacity();

        let mut cyclic: BitVec = BitVec::repeat(false, capacity);
        for component in graph.strong_component_indices() {
            if component.len() > 1 {
                for idx in component {
                    cyclic.set(idx.0, true);
                }
            }
        }
        let positions: Vec<usize> = slots
            .iter()
            .positions(|slot| cyclic[slot.0])
            .collect();
        if !positions.is_empty() {
            debug!("rejecting ordering: {} elements lie on a cycle", positions.len());
            return Err(GraphError::CircularDependency { positions });
        }

        let mut id_of: Vec<Option<usize>> = vec![None; capacity];
        let mut distinct: Vec<VertexIndex> = Vec::new();
        let ids: Vec<usize> = slots
            .iter()
            .map(|slot| {
                *id_of[slot.0].get_or_insert_with(|| {
                    distinct.push(*slot);
                    distinct.len() - 1
                })
            })
            .collect();

        let reach: Vec<BitVec> = distinct
            .iter()
            .map(|&from| {
                let reachable = graph.reachable_from(from);
                distinct.iter().map(|to| reachable[to.0]).collect()
            })
            .collect();

        debug!(
            "dependency relation over {} elements: {} keys, {} edges",
            source.len(),
            distinct.len(),
            graph.size()
        );

        Ok(TopologicalOrder {
            source,
            ids,
            reach,
            secondary: Vec::new(),
            reversed: false,
            order: OnceCell::new(),
        })
    }

    /// Adds a secondary key, less significant than those already added.
    pub fn then_by<K: Ord>(self, key: impl Fn(&T) -> K + 'r) -> Self {
        self.then_by_comparator(move |a, b| key(a).cmp(&key(b)))
    }

    /// Like [`Self::then_by`], largest key first.
    pub fn then_by_descending<K: Ord>(self, key: impl Fn(&T) -> K + 'r) -> Self {
        self.then_by_comparator(move |a, b| key(b).cmp(&key(a)))
    }

    pub fn then_by_comparator(mut self, compare: impl Fn(&T, &T) -> Ordering + 'r) -> Self {
        self.secondary.push(Box::new(compare));
        self.order = OnceCell::new();
        self
    }

    /// Flips the operands of the precedence test. Calling it twice restores
    /// the original order.
    pub fn reverse(mut self) -> Self {
        self.reversed = !self.reversed;
        self.order = OnceCell::new();
        self
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Whether element `b` must come before element `a`.
    fn must_precede(&self, a: usize, b: usize) -> bool {
        let (x, y) = (self.ids[a], self.ids[b]);
        self.reach[x][y] && !self.reach[y][x]
    }

    fn compute(&self) -> Vec<usize> {
        let n = self.source.len();
        let mut list: Vec<usize> = (0..n).collect();
        if !self.secondary.is_empty() {
            list.sort_by(|&a, &b| {
                let (a, b) = (&self.source[a], &self.source[b]);
                self.secondary
                    .iter()
                    .fold(Ordering::Equal, |acc, compare| acc.then_with(|| compare(a, b)))
            });
        }

        for i in 0..n.saturating_sub(1) {
            let mut pick = i;
            for j in i + 1..n {
                let (a, b) = if self.reversed {
                    (list[j], list[pick])
                } else {
                    (list[pick], list[j])
                };
                if self.must_precede(a, b) {
                    pick = j;
                }
            }
            if pick != i {
                let moved = list.remove(pick);
                trace!("moving element {moved} from slot {pick} to {i}");
                list.insert(i, moved);
            }
        }
        list
    }

    /// Source positions in output order.
    pub fn positions(&self) -> &[usize] {
        self.order.get_or_init(|| self.compute())
    }

    pub fn iter(&self) -> Ordered<'_, T> {
        Ordered {
            source: &self.source,
            positions: self.positions().iter(),
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    pub fn into_vec(self) -> Vec<T> {
        let positions = self.positions().to_vec();
        let mut slots: Vec<Option<T>> = self.source.into_iter().map(Some).collect();
        positions
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect()
    }
}

/// Iterator over a [`TopologicalOrder`].
pub struct Ordered<'a, T> {
    source: &'a [T],
    positions: std::slice::Iter<'a, usize>,
}

impl<'a, T> Iterator for Ordered<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.positions.next().map(|&i| &self.source[i])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

impl<T> ExactSizeIterator for Ordered<'_, T> {}

impl<'a, T> IntoIterator for &'a TopologicalOrder<'_, T> {
    type Item = &'a T;
    type IntoIter = Ordered<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for TopologicalOrder<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests;
