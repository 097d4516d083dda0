use std::fmt;

/// A directed pair of vertices.
///
/// The derived `PartialEq` compares ordered pairs. How a graph compares edges
/// depends on its [`Direction`](super::Direction); see
/// [`EdgeEquivalence`](crate::equivalence::EdgeEquivalence).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge<V> {
    pub from: V,
    pub to: V,
}

impl<V> Edge<V> {
    pub fn new(from: V, to: V) -> Self {
        Edge { from, to }
    }

    /// The same edge pointing the other way.
    pub fn reversed(self) -> Self {
        Edge {
            from: self.to,
            to: self.from,
        }
    }

    pub fn as_ref(&self) -> Edge<&V> {
        Edge {
            from: &self.from,
            to: &self.to,
        }
    }

    pub fn map<W>(self, mut f: impl FnMut(V) -> W) -> Edge<W> {
        Edge {
            from: f(self.from),
            to: f(self.to),
        }
    }
}

impl<V: Clone> Edge<&V> {
    pub fn cloned(self) -> Edge<V> {
        Edge {
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

impl<V> From<(V, V)> for Edge<V> {
    fn from((from, to): (V, V)) -> Self {
        Edge { from, to }
    }
}

impl<V> From<Edge<V>> for (V, V) {
    fn from(edge: Edge<V>) -> Self {
        (edge.from, edge.to)
    }
}

impl<V: fmt::Display> fmt::Display for Edge<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
