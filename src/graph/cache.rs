use std::cell::Cell;

/// Memoized derived properties plus the structural version counter.
///
/// Every slot is "unknown unless computed". Reads go through the `*_or_else`
/// accessors, which recompute and store on a miss, so a stale value is never
/// handed out as long as mutators invalidate what they could affect.
#[derive(Clone, Debug, Default)]
pub(crate) struct Cache {
    version: u64,
    size: Cell<Option<usize>>,
    cyclic: Cell<Option<bool>>,
    connected: Cell<Option<bool>>,
}

fn memo<T: Copy>(cell: &Cell<Option<T>>, compute: impl FnOnce() -> T) -> T {
    match cell.get() {
        Some(value) => value,
        None => {
            let value = compute();
            cell.set(Some(value));
            value
        }
    }
}

impl Cache {
    /// A cache for a graph known to be empty.
    pub(crate) fn empty() -> Self {
        Cache {
            version: 0,
            size: Cell::new(Some(0)),
            cyclic: Cell::new(Some(false)),
            connected: Cell::new(Some(true)),
        }
    }

    #[inline]
    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        self.version += 1;
    }

    pub(crate) fn size_or_else(&self, compute: impl FnOnce() -> usize) -> usize {
        memo(&self.size, compute)
    }

    pub(crate) fn cyclic_or_else(&self, compute: impl FnOnce() -> bool) -> bool {
        memo(&self.cyclic, compute)
    }

    pub(crate) fn connected_or_else(&self, compute: impl FnOnce() -> bool) -> bool {
        memo(&self.connected, compute)
    }

    pub(crate) fn edge_added(&mut self) {
        self.size.set(self.size.get().map(|n| n + 1));
        self.invalidate_topology();
    }

    pub(crate) fn edge_removed(&mut self) {
        self.size.set(self.size.get().map(|n| n - 1));
        self.invalidate_topology();
    }

    /// A new isolated vertex cannot close a cycle, but it does split the graph.
    pub(crate) fn vertex_added(&mut self) {
        self.connected.set(None);
    }

    pub(crate) fn vertex_removed(&mut self) {
        self.size.set(None);
        self.invalidate_topology();
    }

    pub(crate) fn invalidate_topology(&mut self) {
        self.cyclic.set(None);
        self.connected.set(None);
    }

    /// Back to the empty-graph state; the version keeps counting.
    pub(crate) fn reset(&mut self) {
        let version = self.version;
        *self = Cache::empty();
        self.version = version;
    }

    #[cfg(test)]
    pub(crate) fn known_size(&self) -> Option<usize> {
        self.size.get()
    }

    #[cfg(test)]
    pub(crate) fn known_cyclic(&self) -> Option<bool> {
        self.cyclic.get()
    }
}
