//! Pluggable equality/hash strategies for vertices and edges.
//!
//! A graph stores one strategy instance and routes every vertex lookup through
//! it, so two vertices are "the same" exactly when the strategy says so.

use std::hash::{BuildHasher, Hash, Hasher};

use ahash::AHashMap;

use crate::graph::{Direction, Edge};

/// An equality relation with a compatible hash.
///
/// Implementations must uphold `equivalent(a, b) => hash(a) == hash(b)`.
pub trait Equivalence<T: ?Sized> {
    fn equivalent(&self, a: &T, b: &T) -> bool;

    fn hash<H: Hasher>(&self, value: &T, state: &mut H);
}

/// The natural `Eq + Hash` equality of the value type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NaturalEq;

impl<T: Eq + Hash + ?Sized> Equivalence<T> for NaturalEq {
    #[inline]
    fn equivalent(&self, a: &T, b: &T) -> bool {
        a == b
    }

    #[inline]
    fn hash<H: Hasher>(&self, value: &T, state: &mut H) {
        value.hash(state)
    }
}

/// Compares values by a projected key.
///
/// ```
/// use topograph::{Graph, GraphOptions, KeyedBy};
///
/// let mut g = Graph::with_equivalence(
///     GraphOptions::default(),
///     KeyedBy(|s: &String| s.to_lowercase()),
/// );
/// g.add_vertex("Core".to_string());
/// assert!(g.contains_vertex(&"CORE".to_string()));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct KeyedBy<F>(pub F);

impl<T: ?Sized, K: Eq + Hash, F: Fn(&T) -> K> Equivalence<T> for KeyedBy<F> {
    fn equivalent(&self, a: &T, b: &T) -> bool {
        (self.0)(a) == (self.0)(b)
    }

    fn hash<H: Hasher>(&self, value: &T, state: &mut H) {
        (self.0)(value).hash(state)
    }
}

/// Edge equality under a direction mode, built on a vertex strategy.
///
/// Directed edges compare as ordered pairs. Undirected edges compare as
/// unordered pairs, and hash symmetrically.
#[derive(Clone, Copy, Debug)]
pub struct EdgeEquivalence<'s, S> {
    pub direction: Direction,
    pub vertices: &'s S,
}

impl<'s, S> EdgeEquivalence<'s, S> {
    pub fn new(direction: Direction, vertices: &'s S) -> Self {
        EdgeEquivalence {
            direction,
            vertices,
        }
    }
}

impl<'v, V, S: Equivalence<V>> Equivalence<Edge<&'v V>> for EdgeEquivalence<'_, S> {
    fn equivalent(&self, a: &Edge<&'v V>, b: &Edge<&'v V>) -> bool {
        let eq = |x: &V, y: &V| self.vertices.equivalent(x, y);
        let same = eq(a.from, b.from) && eq(a.to, b.to);
        match self.direction {
            Direction::Directed => same,
            Direction::Undirected => same || (eq(a.from, b.to) && eq(a.to, b.from)),
        }
    }

    fn hash<H: Hasher>(&self, value: &Edge<&'v V>, state: &mut H) {
        match self.direction {
            Direction::Directed => {
                self.vertices.hash(value.from, state);
                self.vertices.hash(value.to, state);
            }
            Direction::Undirected => {
                // Fixed seeds: both endpoints must hash identically across calls.
                let fixed = ahash::RandomState::with_seeds(1, 2, 3, 4);
                let from = hash_with(&fixed, self.vertices, value.from);
                let to = hash_with(&fixed, self.vertices, value.to);
                state.write_u64(from.min(to));
                state.write_u64(from.max(to));
            }
        }
    }
}

/// A throwaway hash set over borrowed values, keyed by an [`Equivalence`].
///
/// Used to compare graph views against arbitrary collections.
pub(crate) struct ProbeSet<'e, T, E> {
    buckets: AHashMap<u64, Vec<T>>,
    hasher: ahash::RandomState,
    strategy: &'e E,
    len: usize,
}

impl<'e, T, E: Equivalence<T>> ProbeSet<'e, T, E> {
    pub(crate) fn new(strategy: &'e E, items: impl IntoIterator<Item = T>) -> Self {
        let mut set = ProbeSet {
            buckets: AHashMap::new(),
            hasher: ahash::RandomState::new(),
            strategy,
            len: 0,
        };
        for item in items {
            set.insert(item);
        }
        set
    }

    fn insert(&mut self, item: T) -> bool {
        let hash = hash_with(&self.hasher, self.strategy, &item);
        let bucket = self.buckets.entry(hash).or_default();
        if bucket.iter().any(|x| self.strategy.equivalent(x, &item)) {
            return false;
        }
        bucket.push(item);
        self.len += 1;
        true
    }

    pub(crate) fn contains(&self, item: &T) -> bool {
        let hash = hash_with(&self.hasher, self.strategy, item);
        self.buckets
            .get(&hash)
            .is_some_and(|bucket| bucket.iter().any(|x| self.strategy.equivalent(x, item)))
    }

    /// Number of distinct items.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.buckets.values().flatten()
    }
}

/// Hashes `value` under `strategy` with a fresh hasher from `build`.
pub(crate) fn hash_with<T: ?Sized, S: Equivalence<T>, B: BuildHasher>(
    build: &B,
    strategy: &S,
    value: &T,
) -> u64 {
    let mut hasher = build.build_hasher();
    strategy.hash(value, &mut hasher);
    hasher.finish()
}
