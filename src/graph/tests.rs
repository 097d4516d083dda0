use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use similar_asserts::assert_eq;

use super::*;
use crate::KeyedBy;

fn sorted_edges<V: Ord + Copy, S>(g: &Graph<V, S>) -> Vec<(V, V)> {
    let mut edges: Vec<_> = g.edges().iter().map(|e| (*e.from, *e.to)).collect();
    edges.sort();
    edges
}

#[test]
fn three_cycle_and_its_removal() {
    let mut g = Graph::from_edges([(1, 2), (2, 3), (3, 1)]);
    assert!(g.is_cyclic());
    assert!(g.is_connected());
    g.remove_edge(&3, &1);
    assert!(!g.is_cyclic());
    assert_eq!(g.size(), 2);
}

#[test]
fn removing_a_vertex_drops_incident_edges() {
    let mut g = Graph::from_parts(
        GraphOptions::default(),
        NaturalEq,
        [1, 2, 3],
        [(1, 2), (2, 3)],
    );
    assert!(g.remove_vertex(&2));
    assert_eq!(g.order(), 2);
    assert_eq!(g.size(), 0);
    assert!(g.edges().is_empty());
    assert_eq!(g.vertices().iter().copied().collect::<Vec<_>>(), vec![1, 3]);
}

#[test]
fn reflexive_reduction_of_looped_chain() {
    let mut g = Graph::from_edges([('a', 'a'), ('a', 'b'), ('b', 'c'), ('c', 'c')]);
    g.reduce_reflexes();
    assert_eq!(sorted_edges(&g), vec![('a', 'b'), ('b', 'c')]);
}

#[test]
fn version_moves_only_on_change() {
    let mut g = Graph::new();
    let v0 = g.version();
    assert!(g.add_vertex(1));
    assert!(!g.add_vertex(1));
    assert_eq!(g.version(), v0 + 1);
    assert!(g.add_edge(1, 2));
    assert!(!g.add_edge(1, 2));
    assert!(!g.remove_edge(&2, &1));
    assert_eq!(g.version(), v0 + 2);
    g.clear();
    assert_eq!(g.version(), v0 + 3);
    g.clear();
    assert_eq!(g.version(), v0 + 3);
    assert!(g.is_empty());
}

#[test]
fn add_edge_registers_endpoints() {
    let mut g = Graph::new();
    g.add_edge("x", "y");
    assert_eq!(g.order(), 2);
    assert!(g.contains_edge(&"x", &"y"));
    assert!(!g.contains_edge(&"y", &"x"));
    assert_eq!(g.outgoing_vertices(&"x").collect::<Vec<_>>(), vec![&"y"]);
    assert_eq!(g.incoming_vertices(&"y").collect::<Vec<_>>(), vec![&"x"]);
    assert_eq!(g.outgoing_vertices(&"nope").count(), 0);
}

#[test]
fn undirected_edges_are_unordered() {
    let mut g = Graph::undirected();
    assert!(g.add_edge(1, 2));
    assert!(!g.add_edge(2, 1));
    assert!(g.contains_edge(&2, &1));
    assert_eq!(g.size(), 1);
    assert_eq!(g.edges().len(), 1);
    assert!(g.edges().contains_edge(Edge::new(&2, &1)));
    assert!(g.remove_edge(&2, &1));
    assert_eq!(g.size(), 0);
}

#[test]
fn vertex_set_algebra() {
    let mut g = Graph::from_edges([(1, 2), (2, 3), (3, 4)]);
    let view = g.vertices();
    assert!(view.is_subset_of(&[1, 2, 3, 4, 5]));
    assert!(view.is_proper_subset_of(&[1, 2, 3, 4, 5]));
    assert!(view.is_superset_of(&[2, 3]));
    assert!(view.is_proper_superset_of(&[2, 3, 3]));
    assert!(view.set_equals(&[4, 3, 2, 1, 1]));
    assert!(view.overlaps(&[9, 4]));
    assert!(!view.overlaps(&[9]));

    let version = g.version();
    g.vertices_mut().union_with([5, 6, 1]);
    assert_eq!(g.version(), version + 1);
    g.vertices_mut().intersect_with([1, 2, 3, 9]);
    assert_eq!(sorted_edges(&g), vec![(1, 2), (2, 3)]);
    g.vertices_mut().except_with([1]);
    assert_eq!(g.vertices().iter().copied().collect::<Vec<_>>(), vec![2, 3]);
    g.vertices_mut().retain(|&v| v != 3);
    assert_eq!(g.order(), 1);
    assert_eq!(g.size(), 0);
}

#[test]
fn edge_set_algebra() {
    let mut g = Graph::from_edges([(1, 2), (2, 3), (3, 4)]);
    assert!(g.edges().is_subset_of([(&1, &2), (&2, &3), (&3, &4), (&4, &5)].map(Edge::from)));
    assert!(g.edges().is_superset_of([Edge::new(&2, &3)]));
    assert!(!g.edges().is_superset_of([Edge::new(&3, &2)]));
    assert!(g.edges().set_equals([(&3, &4), (&1, &2), (&2, &3), (&1, &2)].map(Edge::from)));

    g.edges_mut().union_with([(4, 5)]);
    assert_eq!(g.order(), 5);
    g.edges_mut().intersect_with([Edge::new(&1, &2), Edge::new(&4, &5), Edge::new(&7, &8)]);
    assert_eq!(sorted_edges(&g), vec![(1, 2), (4, 5)]);
    assert_eq!(g.order(), 5);
    g.edges_mut().except_with([Edge::new(&1, &2)]);
    assert_eq!(sorted_edges(&g), vec![(4, 5)]);
    g.edges_mut().retain(|e| *e.from != 4);
    assert!(g.edges().is_empty());
    g.add_edge(1, 1);
    g.edges_mut().clear();
    assert_eq!(g.size(), 0);
    assert_eq!(g.order(), 5);
}

#[test]
fn undirected_edge_views_ignore_orientation() {
    let mut g = Graph::undirected();
    g.add_edge('a', 'b');
    g.add_edge('b', 'c');
    assert!(g.edges().set_equals([Edge::new(&'b', &'a'), Edge::new(&'c', &'b')]));
    g.edges_mut().intersect_with([Edge::new(&'c', &'b')]);
    assert_eq!(g.size(), 1);
    assert!(g.contains_edge(&'b', &'c'));
}

#[test]
fn keyed_equivalence_merges_vertices() {
    let mut g = Graph::with_equivalence(
        GraphOptions::default(),
        KeyedBy(|s: &&str| s.to_ascii_lowercase()),
    );
    g.add_edge("Core", "io");
    assert!(!g.add_vertex("CORE"));
    assert!(g.contains_edge(&"core", &"IO"));
    assert_eq!(g.get_vertex(&"cOrE"), Some(&"Core"));
    assert!(g.vertices().set_equals(&["CORE", "Io"]));
    assert!(g.vertices().is_proper_subset_of(&["core", "IO", "fs"]));
    assert!(g.vertices().is_proper_superset_of(&["io", "IO"]));
    assert_eq!(g.take_vertex(&"IO"), Some("io"));
    assert_eq!(g.order(), 1);
    assert!(g.vertices().is_subset_of(&["CORE"]));
}

#[test]
fn reverse_index_survives_mutation() {
    let mut g = Graph::with_options(GraphOptions::directed().with_reverse_index(true));
    g.add_edge(1, 2);
    g.add_edge(3, 2);
    g.remove_vertex(&1);
    assert_eq!(g.incoming_vertices(&2).collect::<Vec<_>>(), vec![&3]);
    g.drop_reverse_index();
    assert!(!g.has_reverse_index());
    assert_eq!(g.incoming_vertices(&2).collect::<Vec<_>>(), vec![&3]);
}

#[test]
fn compaction_is_invisible() {
    let mut g = Graph::new();
    for i in 0..100u32 {
        g.add_edge(i, i + 1);
    }
    for i in 0..90u32 {
        g.remove_vertex(&i);
    }
    assert_eq!(g.order(), 11);
    assert_eq!(g.size(), 10);
    assert!(g.has_path(&90, &100));
    assert_eq!(
        g.vertices().iter().copied().collect::<Vec<_>>(),
        (90..=100).collect::<Vec<_>>()
    );
}

#[test]
fn debug_lists_vertices_and_edges() {
    let g = Graph::from_edges([(1, 2)]);
    insta::assert_snapshot!(
        format!("{g:?}"),
        @"Graph { direction: Directed, vertices: [1, 2], edges: [(1, 2)] }"
    );
}

#[derive(Debug, Clone)]
enum Op {
    AddVertex(u8),
    RemoveVertex(u8),
    AddEdge(u8, u8),
    RemoveEdge(u8, u8),
}

fn op() -> impl Strategy<Value = Op> {
    let v = 0u8..12;
    prop_oneof![
        v.clone().prop_map(Op::AddVertex),
        v.clone().prop_map(Op::RemoveVertex),
        (v.clone(), v.clone()).prop_map(|(a, b)| Op::AddEdge(a, b)),
        (v.clone(), v).prop_map(|(a, b)| Op::RemoveEdge(a, b)),
    ]
}

/// Plain set model the graph is checked against.
#[derive(Default)]
struct Model {
    vertices: BTreeSet<u8>,
    edges: HashSet<(u8, u8)>,
}

impl Model {
    fn key(&self, undirected: bool, a: u8, b: u8) -> (u8, u8) {
        if undirected {
            (a.min(b), a.max(b))
        } else {
            (a, b)
        }
    }

    fn apply(&mut self, op: &Op, undirected: bool) {
        match *op {
            Op::AddVertex(v) => {
                self.vertices.insert(v);
            }
            Op::RemoveVertex(v) => {
                self.vertices.remove(&v);
                self.edges.retain(|&(a, b)| a != v && b != v);
            }
            Op::AddEdge(a, b) => {
                self.vertices.insert(a);
                self.vertices.insert(b);
                let key = self.key(undirected, a, b);
                self.edges.insert(key);
            }
            Op::RemoveEdge(a, b) => {
                let key = self.key(undirected, a, b);
                self.edges.remove(&key);
            }
        }
    }
}

fn run(g: &mut Graph<u8>, op: &Op) {
    match *op {
        Op::AddVertex(v) => {
            g.add_vertex(v);
        }
        Op::RemoveVertex(v) => {
            g.remove_vertex(&v);
        }
        Op::AddEdge(a, b) => {
            g.add_edge(a, b);
        }
        Op::RemoveEdge(a, b) => {
            g.remove_edge(&a, &b);
        }
    }
}

proptest! {
    #[test]
    fn counts_match_a_set_model(
        ops in prop::collection::vec(op(), 0..80),
        undirected in any::<bool>(),
        reverse_index in any::<bool>(),
    ) {
        let direction = if undirected { Direction::Undirected } else { Direction::Directed };
        let mut g = Graph::with_options(
            GraphOptions::default().with_direction(direction).with_reverse_index(reverse_index),
        );
        let mut model = Model::default();
        for op in &ops {
            run(&mut g, op);
            model.apply(op, undirected);
            // Read the cached size between steps so incremental upkeep is tested.
            prop_assert_eq!(g.size(), model.edges.len());
        }
        prop_assert_eq!(g.order(), model.vertices.len());
        prop_assert_eq!(g.edges().iter().count(), model.edges.len());
        for &(a, b) in &model.edges {
            prop_assert!(g.contains_edge(&a, &b));
        }
        for v in &model.vertices {
            prop_assert!(g.contains_vertex(v));
        }
    }

    #[test]
    fn transpose_twice_is_identity(edges in prop::collection::vec((0u8..10, 0u8..10), 0..40)) {
        let g = Graph::from_edges(edges);
        prop_assert!(g.get_transposition().get_transposition() == g);
        let mut h = g.clone();
        h.transpose();
        h.transpose();
        prop_assert!(h == g);
    }

    #[test]
    fn reflexive_reduction_is_idempotent(edges in prop::collection::vec((0u8..10, 0u8..10), 0..40)) {
        let once = Graph::from_edges(edges).get_reflexive_reduction();
        let twice = once.get_reflexive_reduction();
        prop_assert!(once == twice);
        prop_assert!(once.vertices().iter().all(|v| !once.contains_edge(v, v)));
    }

    #[test]
    fn cached_cyclicity_matches_a_fresh_graph(
        ops in prop::collection::vec(op(), 0..60),
    ) {
        let mut g = Graph::new();
        for op in &ops {
            run(&mut g, op);
            let fresh = Graph::from_parts(
                GraphOptions::default(),
                NaturalEq,
                g.vertices().iter().copied(),
                g.edges().iter().map(Edge::cloned),
            );
            prop_assert_eq!(g.is_cyclic(), fresh.is_cyclic());
            prop_assert_eq!(g.is_connected(), fresh.is_connected());
        }
    }

    #[test]
    fn transitive_reduction_keeps_reachability(
        edges in prop::collection::vec((0u8..8, 0u8..8), 0..30),
    ) {
        let g = Graph::from_edges(edges);
        let reduced = g.get_transitive_reduction().unwrap();
        prop_assert!(reduced.is_subgraph_of(&g));
        for a in g.vertices() {
            for b in g.vertices() {
                prop_assert_eq!(reduced.has_path(a, b), g.has_path(a, b));
            }
        }
    }
}
