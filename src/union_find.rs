//! Disjoint-set forest over dense element indices.
//!
//! Union by rank with path compression. The parent-pointer tree is stored in
//! `Cell`s so that [`UnionFind::find`] can compress paths through a shared
//! reference.

use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetRoot(pub usize);

/// A node in the union–find tree.
///
/// - `Root { rank }`: representative of its set.
/// - `Child(parent)`: points towards the representative.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum UFNode {
    Root { rank: usize },
    Child(usize),
}

#[derive(Debug, Clone)]
pub struct UnionFind {
    nodes: Vec<Cell<UFNode>>,
    n_sets: usize,
}

impl UnionFind {
    /// `n` singleton sets, one per element `0..n`.
    pub fn new(n: usize) -> Self {
        UnionFind {
            nodes: (0..n).map(|_| Cell::new(UFNode::Root { rank: 0 })).collect(),
            n_sets: n,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of disjoint sets.
    pub fn n_sets(&self) -> usize {
        self.n_sets
    }

    pub fn find(&self, x: usize) -> SetRoot {
        match self.nodes[x].get() {
            UFNode::Root { .. } => SetRoot(x),
            UFNode::Child(parent) => {
                let root = self.find(parent);
                self.nodes[x].set(UFNode::Child(root.0));
                root
            }
        }
    }

    fn rank(&self, root: SetRoot) -> usize {
        match self.nodes[root.0].get() {
            UFNode::Root { rank } => rank,
            UFNode::Child(_) => unreachable!("find() should always return a root"),
        }
    }

    /// Merges the sets of `x` and `y`. Returns `false` if they were already
    /// the same set.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }

        let (rank_x, rank_y) = (self.rank(root_x), self.rank(root_y));
        let (winner, loser) = if rank_x < rank_y {
            (root_y, root_x)
        } else {
            (root_x, root_y)
        };
        if rank_x == rank_y {
            self.nodes[winner.0].set(UFNode::Root { rank: rank_x + 1 });
        }
        self.nodes[loser.0].set(UFNode::Child(winner.0));
        self.n_sets -= 1;
        true
    }

    pub fn same_set(&self, x: usize, y: usize) -> bool {
        self.find(x) == self.find(y)
    }

    /// Elements grouped by set, groups ordered by their smallest element.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut slot_of_root: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut groups: Vec<Vec<usize>> = Vec::with_capacity(self.n_sets);
        for x in 0..self.nodes.len() {
            let root = self.find(x);
            let slot = *slot_of_root[root.0].get_or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(x);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_union_find() {
        let mut uf = UnionFind::new(5);
        assert_eq!(uf.n_sets(), 5);
        assert!(uf.union(0, 1));
        assert!(!uf.union(1, 0));
        assert!(uf.same_set(0, 1));
        assert!(!uf.same_set(0, 2));
        assert_eq!(uf.n_sets(), 4);
    }

    #[test]
    fn test_path_compression() {
        let mut uf = UnionFind::new(4);
        uf.union(0, 1);
        uf.union(1, 2);
        uf.union(2, 3);

        let root = uf.find(3);
        assert_eq!(uf.find(2), root);
        assert_eq!(uf.find(1), root);
        assert_eq!(uf.n_sets(), 1);
    }

    #[test]
    fn groups_follow_first_member() {
        let mut uf = UnionFind::new(6);
        uf.union(4, 1);
        uf.union(5, 0);
        assert_eq!(
            uf.groups(),
            vec![vec![0, 5], vec![1, 4], vec![2], vec![3]]
        );
    }
}
