//! Arena-backed adjacency storage.
//!
//! Vertices live in slots addressed by [`VertexIndex`]. A removed vertex
//! leaves a tombstone so that the remaining slots keep their insertion order;
//! the arena is compacted once tombstones dominate. Lookup by value goes
//! through hash buckets computed with the graph's [`Equivalence`] strategy.

use ahash::{AHashMap, RandomState};
use indexmap::IndexSet;
use itertools::Either;

use crate::equivalence::{hash_with, Equivalence};

use super::Direction;

crate::define_indexed_vec!(
    /// Position of a vertex in the adjacency arena.
    pub(crate) struct VertexIndex;

    pub(crate) struct SlotVec;
);

/// Successor (or predecessor) set of one vertex, in insertion order.
pub(crate) type Row = IndexSet<VertexIndex, RandomState>;

const COMPACT_THRESHOLD: usize = 32;

#[derive(Clone, Debug)]
pub(crate) struct Slot<V> {
    pub(crate) vertex: V,
    hash: u64,
    pub(crate) successors: Row,
}

#[derive(Clone, Debug)]
pub(crate) struct AdjacencyStore<V, S> {
    slots: SlotVec<Option<Slot<V>>>,
    /// Predecessor rows, parallel to `slots`. Only kept for directed graphs.
    reverse: Option<SlotVec<Row>>,
    buckets: AHashMap<u64, Vec<VertexIndex>>,
    hasher: RandomState,
    live: usize,
    direction: Direction,
    equivalence: S,
}

fn new_row() -> Row {
    IndexSet::with_hasher(RandomState::new())
}

impl<V, S> AdjacencyStore<V, S> {
    pub(crate) fn new(direction: Direction, equivalence: S, reverse_index: bool) -> Self {
        AdjacencyStore {
            slots: SlotVec::new(),
            reverse: (reverse_index && direction == Direction::Directed).then(SlotVec::new),
            buckets: AHashMap::new(),
            hasher: RandomState::new(),
            live: 0,
            direction,
            equivalence,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub(crate) fn equivalence(&self) -> &S {
        &self.equivalence
    }

    /// Number of slots, live or dead. Indices below this bound may be probed.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn slot(&self, idx: VertexIndex) -> Option<&Slot<V>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn live_slot(&self, idx: VertexIndex) -> &Slot<V> {
        self.slot(idx).expect("vertex index must point at a live slot")
    }

    fn live_slot_mut(&mut self, idx: VertexIndex) -> &mut Slot<V> {
        self.slots[idx]
            .as_mut()
            .expect("vertex index must point at a live slot")
    }

    #[inline]
    pub(crate) fn vertex(&self, idx: VertexIndex) -> &V {
        &self.live_slot(idx).vertex
    }

    #[inline]
    pub(crate) fn successors(&self, idx: VertexIndex) -> &Row {
        &self.live_slot(idx).successors
    }

    pub(crate) fn raw_slots(&self) -> &[Option<Slot<V>>] {
        self.slots.as_slice()
    }

    pub(crate) fn has_reverse(&self) -> bool {
        self.reverse.is_some()
    }

    /// Live vertex indices in insertion order.
    pub(crate) fn indices(&self) -> impl Iterator<Item = VertexIndex> + '_ {
        self.slots
            .iter()
            .filter_map(|(idx, slot)| slot.as_ref().map(|_| idx))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (VertexIndex, &V)> + '_ {
        self.slots
            .iter()
            .filter_map(|(idx, slot)| slot.as_ref().map(|s| (idx, &s.vertex)))
    }

    /// Predecessors of `idx`.
    ///
    /// Served from the successor row for undirected graphs, from the reverse
    /// index when it is materialized, and by a full scan otherwise.
    pub(crate) fn predecessors(&self, idx: VertexIndex) -> impl Iterator<Item = VertexIndex> + '_ {
        match (self.direction, &self.reverse) {
            (Direction::Undirected, _) => Either::Left(self.successors(idx).iter().copied()),
            (Direction::Directed, Some(reverse)) => Either::Left(reverse[idx].iter().copied()),
            (Direction::Directed, None) => Either::Right(
                self.iter_slots()
                    .filter(move |(_, slot)| slot.successors.contains(&idx))
                    .map(|(i, _)| i),
            ),
        }
    }

    fn iter_slots(&self) -> impl Iterator<Item = (VertexIndex, &Slot<V>)> + '_ {
        self.slots
            .iter()
            .filter_map(|(idx, slot)| slot.as_ref().map(|s| (idx, s)))
    }

    pub(crate) fn contains_link(&self, from: VertexIndex, to: VertexIndex) -> bool {
        self.live_slot(from).successors.contains(&to)
    }

    /// Inserts the link `from -> to` (both directions when undirected).
    /// Returns `false` if it was already present.
    pub(crate) fn insert_link(&mut self, from: VertexIndex, to: VertexIndex) -> bool {
        if !self.live_slot_mut(from).successors.insert(to) {
            return false;
        }
        match self.direction {
            Direction::Undirected => {
                self.live_slot_mut(to).successors.insert(from);
            }
            Direction::Directed => {
                if let Some(reverse) = &mut self.reverse {
                    reverse[to].insert(from);
                }
            }
        }
        true
    }

    pub(crate) fn remove_link(&mut self, from: VertexIndex, to: VertexIndex) -> bool {
        if !self.live_slot_mut(from).successors.shift_remove(&to) {
            return false;
        }
        match self.direction {
            Direction::Undirected => {
                self.live_slot_mut(to).successors.shift_remove(&from);
            }
            Direction::Directed => {
                if let Some(reverse) = &mut self.reverse {
                    reverse[to].shift_remove(&from);
                }
            }
        }
        true
    }

    /// Every link once, grouped by source in slot order. Undirected pairs are
    /// reported as `(lower, higher)` slot index.
    pub(crate) fn links(&self) -> impl Iterator<Item = (VertexIndex, VertexIndex)> + '_ {
        let undirected = self.direction == Direction::Undirected;
        self.iter_slots().flat_map(move |(from, slot)| {
            slot.successors
                .iter()
                .copied()
                .filter(move |&to| !undirected || from <= to)
                .map(move |to| (from, to))
        })
    }

    /// Finds the first link at or after position `(from, offset)` and moves
    /// the position just past it. Same order and filtering as [`Self::links`].
    pub(crate) fn link_at_or_after(
        &self,
        from: &mut usize,
        offset: &mut usize,
    ) -> Option<(VertexIndex, VertexIndex)> {
        while *from < self.slots.len() {
            let source = VertexIndex(*from);
            if let Some(slot) = self.slot(source) {
                while let Some(&to) = slot.successors.get_index(*offset) {
                    *offset += 1;
                    if self.direction == Direction::Directed || source <= to {
                        return Some((source, to));
                    }
                }
            }
            *from += 1;
            *offset = 0;
        }
        None
    }

    /// Number of edges, counting an undirected pair once.
    pub(crate) fn count_links(&self) -> usize {
        match self.direction {
            Direction::Directed => self.iter_slots().map(|(_, s)| s.successors.len()).sum(),
            Direction::Undirected => self
                .iter_slots()
                .map(|(from, s)| s.successors.iter().filter(|&&to| from <= to).count())
                .sum(),
        }
    }

    pub(crate) fn materialize_reverse(&mut self) {
        if self.reverse.is_some() || self.direction == Direction::Undirected {
            return;
        }
        let mut reverse: SlotVec<Row> = (0..self.slots.len()).map(|_| new_row()).collect();
        for (from, slot) in self.iter_slots() {
            for &to in &slot.successors {
                reverse[to].insert(from);
            }
        }
        self.reverse = Some(reverse);
    }

    pub(crate) fn drop_reverse(&mut self) {
        self.reverse = None;
    }

    /// Reverses every directed link.
    pub(crate) fn transpose(&mut self) {
        if self.direction == Direction::Undirected {
            return;
        }
        let keep_reverse = self.reverse.is_some();
        let mut rows = match self.reverse.take() {
            Some(reverse) => reverse,
            None => {
                let mut rows: SlotVec<Row> = (0..self.slots.len()).map(|_| new_row()).collect();
                for (from, slot) in self.iter_slots() {
                    for &to in &slot.successors {
                        rows[to].insert(from);
                    }
                }
                rows
            }
        };
        // After the swap `rows` holds the old successors, which is exactly the
        // predecessor index of the transposed graph.
        for (idx, slot) in self.slots.iter_mut() {
            if let Some(slot) = slot {
                std::mem::swap(&mut slot.successors, &mut rows[idx]);
            }
        }
        if keep_reverse {
            self.reverse = Some(rows);
        }
    }

    /// Removes the vertex at `idx` and every link touching it.
    pub(crate) fn remove_at(&mut self, idx: VertexIndex) -> V {
        let slot = self.slots[idx]
            .take()
            .expect("vertex index must point at a live slot");
        self.live -= 1;

        if let Some(bucket) = self.buckets.get_mut(&slot.hash) {
            bucket.retain(|&i| i != idx);
            if bucket.is_empty() {
                self.buckets.remove(&slot.hash);
            }
        }

        match (self.direction, self.reverse.as_mut()) {
            (Direction::Undirected, _) => {
                for &other in &slot.successors {
                    if let Some(other) = self.slots[other].as_mut() {
                        other.successors.shift_remove(&idx);
                    }
                }
            }
            (Direction::Directed, Some(reverse)) => {
                let predecessors = std::mem::take(&mut reverse[idx]);
                for &from in &predecessors {
                    if let Some(from) = self.slots[from].as_mut() {
                        from.successors.shift_remove(&idx);
                    }
                }
                for &to in &slot.successors {
                    reverse[to].shift_remove(&idx);
                }
            }
            (Direction::Directed, None) => {
                for (_, other) in self.slots.iter_mut() {
                    if let Some(other) = other {
                        other.successors.shift_remove(&idx);
                    }
                }
            }
        }

        slot.vertex
    }

    /// Drops tombstones once they outnumber live slots, renumbering indices.
    ///
    /// Every index handed out before the call is invalidated.
    pub(crate) fn compact_if_sparse(&mut self) -> bool {
        let dead = self.slots.len() - self.live;
        if self.slots.len() < COMPACT_THRESHOLD || dead <= self.live {
            return false;
        }

        let mut remap: Vec<Option<VertexIndex>> = Vec::with_capacity(self.slots.len());
        let mut next = 0;
        for (_, slot) in &self.slots {
            remap.push(slot.as_ref().map(|_| {
                next += 1;
                VertexIndex(next - 1)
            }));
        }
        let renumber = |row: &Row| -> Row {
            let mut out = new_row();
            out.extend(row.iter().filter_map(|idx| remap[idx.0]));
            out
        };

        let old = std::mem::take(&mut self.slots);
        let mut slots = SlotVec::with_capacity(self.live);
        for slot in old.into_raw().into_iter().flatten() {
            let successors = renumber(&slot.successors);
            slots.push(Some(Slot {
                vertex: slot.vertex,
                hash: slot.hash,
                successors,
            }));
        }
        self.slots = slots;

        if let Some(reverse) = self.reverse.take() {
            let rows: SlotVec<Row> = reverse
                .iter()
                .filter(|(idx, _)| remap[idx.0].is_some())
                .map(|(_, row)| renumber(row))
                .collect();
            self.reverse = Some(rows);
        }

        self.buckets.clear();
        for (idx, slot) in self.slots.iter() {
            if let Some(slot) = slot {
                self.buckets.entry(slot.hash).or_default().push(idx);
            }
        }
        true
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        if let Some(reverse) = &mut self.reverse {
            reverse.clear();
        }
        self.buckets.clear();
        self.live = 0;
    }
}

impl<V, S: Equivalence<V>> AdjacencyStore<V, S> {
    fn hash_of(&self, vertex: &V) -> u64 {
        hash_with(&self.hasher, &self.equivalence, vertex)
    }

    fn find_hashed(&self, hash: u64, vertex: &V) -> Option<VertexIndex> {
        self.buckets.get(&hash)?.iter().copied().find(|&idx| {
            self.equivalence
                .equivalent(&self.live_slot(idx).vertex, vertex)
        })
    }

    pub(crate) fn find(&self, vertex: &V) -> Option<VertexIndex> {
        self.find_hashed(self.hash_of(vertex), vertex)
    }

    /// Registers `vertex`, returning its index and whether it was new.
    pub(crate) fn insert_vertex(&mut self, vertex: V) -> (VertexIndex, bool) {
        let hash = self.hash_of(&vertex);
        if let Some(idx) = self.find_hashed(hash, &vertex) {
            return (idx, false);
        }
        let idx = self.slots.push(Some(Slot {
            vertex,
            hash,
            successors: new_row(),
        }));
        if let Some(reverse) = &mut self.reverse {
            reverse.push(new_row());
        }
        self.buckets.entry(hash).or_default().push(idx);
        self.live += 1;
        (idx, true)
    }
}
