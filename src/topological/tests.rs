use itertools::Itertools;
use proptest::prelude::*;
use similar_asserts::assert_eq;

use super::*;
use crate::KeyedBy;

fn render<T: fmt::Display>(order: &TopologicalOrder<'_, T>) -> String {
    order.iter().join(" ")
}

#[test]
fn chain_order_ignores_insertion_order() {
    let edges = [(0, 1), (1, 2), (2, 3)];
    for permutation in edges.iter().copied().permutations(edges.len()) {
        let g = Graph::from_edges(permutation);
        let order = g.order_topologically().unwrap();
        assert_eq!(render(&order), "0 1 2 3");
    }
}

#[test]
fn star_forward_and_reversed() {
    let g = Graph::from_edges([(1, 0), (2, 0), (3, 0)]);
    let forward = g.order_topologically().unwrap();
    insta::assert_snapshot!(render(&forward), @"1 2 3 0");

    let reversed = forward.reverse();
    insta::assert_snapshot!(render(&reversed), @"0 1 2 3");

    let back = reversed.reverse();
    assert!(!back.is_reversed());
    assert_eq!(render(&back), "1 2 3 0");
}

#[test]
fn unrelated_elements_keep_input_order() {
    let order = TopologicalSort::new([5, 3, 9, 1, 3])
        .depends_on(|_, _| false)
        .unwrap();
    assert_eq!(order.to_vec(), vec![5, 3, 9, 1, 3]);
    assert_eq!(order.positions().to_vec(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn predicate_relation() {
    // Every number depends on its proper divisors present in the input.
    let order = TopologicalSort::new([12, 5, 6, 2, 3, 1])
        .depends_on(|a, b| a != b && a % b == 0)
        .unwrap();
    insta::assert_snapshot!(render(&order), @"1 2 3 6 12 5");
}

#[derive(Debug, Clone, PartialEq)]
struct Task {
    name: &'static str,
    needs: &'static [&'static str],
    cost: u32,
}

const fn task(name: &'static str, needs: &'static [&'static str], cost: u32) -> Task {
    Task { name, needs, cost }
}

fn tasks() -> Vec<Task> {
    vec![
        task("deploy", &["package", "test"], 3),
        task("docs", &[], 2),
        task("test", &["build"], 5),
        task("package", &["build"], 1),
        task("build", &["fetch"], 4),
        task("lint", &[], 1),
    ]
}

#[test]
fn dependency_lists_with_foreign_keys() {
    let all = tasks();
    let order = TopologicalSort::by_key(all.clone(), |t| t.name)
        .dependencies(|name| {
            all.iter()
                .find(|t| t.name == *name)
                .map(|t| t.needs.to_vec())
                .unwrap_or_default()
        })
        .unwrap();
    let names = order.iter().map(|t| t.name).join(" ");
    insta::assert_snapshot!(names, @"build test package deploy docs lint");
}

#[test]
fn dependency_lists_follow_keys_outside_the_source() {
    let mut queried = Vec::new();
    let order = TopologicalSort::new(["a", "b"])
        .dependencies(|k| {
            queried.push(*k);
            match *k {
                "a" => vec!["x", "y"],
                "x" => vec!["y", "b"],
                "y" => vec!["b"],
                _ => vec![],
            }
        })
        .unwrap();
    assert_eq!(order.to_vec(), vec!["b", "a"]);
    queried.sort();
    assert_eq!(queried, vec!["a", "b", "x", "y"]);

    let err = TopologicalSort::new(["a", "c", "b"])
        .dependencies(|k| match *k {
            "a" => vec!["x"],
            "x" => vec!["b"],
            "b" => vec!["a"],
            _ => vec![],
        })
        .unwrap_err();
    assert_eq!(err, GraphError::CircularDependency { positions: vec![0, 2] });
}

#[test]
fn secondary_keys_only_break_ties() {
    let all = tasks();
    let lookup = all.clone();
    let order = TopologicalSort::by_key(all, |t| t.name)
        .dependencies(|name| {
            lookup
                .iter()
                .find(|t| t.name == *name)
                .map(|t| t.needs.to_vec())
                .unwrap_or_default()
        })
        .unwrap()
        .then_by(|t| t.cost);
    let names = order.iter().map(|t| t.name).join(" ");
    insta::assert_snapshot!(names, @"build package lint docs test deploy");

    let order = order.then_by_descending(|t| t.name.len());
    assert_eq!(order.len(), 6);
    let positions = order.positions().to_vec();
    let names: Vec<_> = order.into_vec().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["build", "package", "lint", "docs", "test", "deploy"]);
    assert_eq!(positions, vec![4, 3, 5, 1, 2, 0]);
}

#[test]
fn secondary_keys_chain_in_declaration_order() {
    let words = ["bb", "a", "cc", "b", "aa"];
    let order = TopologicalSort::new(words)
        .depends_on(|_, _| false)
        .unwrap()
        .then_by(|w| w.len())
        .then_by_descending(|w| w.to_string());
    assert_eq!(order.to_vec(), vec!["b", "a", "cc", "bb", "aa"]);
}

#[test]
fn cycles_are_reported_with_positions() {
    let err = TopologicalSort::new(['x', 'a', 'b', 'c', 'y'])
        .depends_on(|a, b| matches!((a, b), ('a', 'b') | ('b', 'c') | ('c', 'a')))
        .unwrap_err();
    assert_eq!(
        err,
        GraphError::CircularDependency {
            positions: vec![1, 2, 3]
        }
    );
    assert!(err.is_circular_dependency());
}

#[test]
fn prebuilt_graph_relation() {
    let mut deps = Graph::new();
    deps.add_edge("app", "lib");
    deps.add_edge("lib", "core");
    deps.add_edge("core", "core");
    deps.add_vertex("unused");

    let order = TopologicalSort::new(["core", "app", "extra", "lib"])
        .dependency_graph(deps.clone())
        .unwrap();
    assert_eq!(order.to_vec(), vec!["core", "lib", "app", "extra"]);

    // Paths through keys missing from the source still count.
    let order = TopologicalSort::new(["app", "core"])
        .dependency_graph(deps.clone())
        .unwrap();
    assert_eq!(order.to_vec(), vec!["core", "app"]);

    deps.add_edge("core", "app");
    let err = TopologicalSort::new(["app", "extra", "core"])
        .dependency_graph(deps)
        .unwrap_err();
    assert_eq!(err, GraphError::CircularDependency { positions: vec![0, 2] });
}

#[test]
fn self_loops_do_not_block_ordering() {
    let g = Graph::from_edges([(1, 1), (1, 2)]);
    assert!(g.is_cyclic());
    let order = g.order_topologically().unwrap();
    assert_eq!(order.to_vec(), vec![&1, &2]);

    let order = TopologicalSort::new([2, 1])
        .dependency_graph(Graph::from_edges([(2, 2), (2, 1)]))
        .unwrap();
    assert_eq!(order.to_vec(), vec![1, 2]);

    let mut looped = Graph::from_edges([(1, 1), (1, 2), (2, 1)]);
    assert!(matches!(
        looped.order_topologically(),
        Err(GraphError::CircularDependency { .. })
    ));
    looped.remove_edge(&2, &1);
    assert!(looped.order_topologically().is_ok());
}

#[test]
fn undirected_relations_are_rejected() {
    let mut g = Graph::undirected();
    g.add_edge(1, 2);
    assert!(matches!(
        g.order_topologically(),
        Err(GraphError::Unsupported(_))
    ));
    assert!(matches!(
        TopologicalSort::new([1, 2]).dependency_graph(g),
        Err(GraphError::Unsupported(_))
    ));
}

#[test]
fn keys_compare_through_the_equivalence() {
    let order = TopologicalSort::new(["Zlib", "app", "ZLIB", "APP"])
        .with_equivalence(KeyedBy(|s: &&str| s.to_ascii_lowercase()))
        .depends_on(|a, b| a.eq_ignore_ascii_case("app") && b.eq_ignore_ascii_case("zlib"))
        .unwrap();
    assert_eq!(order.to_vec(), vec!["Zlib", "ZLIB", "app", "APP"]);
}

#[test]
fn order_is_restartable_and_lazy() {
    let g = Graph::from_edges([('b', 'c'), ('a', 'b')]);
    let order = g.order_topologically().unwrap();
    let first: Vec<_> = order.iter().collect();
    let second: Vec<_> = (&order).into_iter().collect();
    assert_eq!(first, second);
    assert_eq!(order.iter().len(), 3);
    assert_eq!(format!("{order:?}"), "['a', 'b', 'c']");
}

#[test]
fn empty_and_single_inputs() {
    let order = TopologicalSort::new(Vec::<u8>::new())
        .depends_on(|_, _| true)
        .unwrap();
    assert!(order.is_empty());
    assert_eq!(order.to_vec(), Vec::<u8>::new());

    let order = TopologicalSort::new([7]).depends_on(|_, _| true).unwrap();
    assert_eq!(order.to_vec(), vec![7]);
}

fn dag_and_shuffle() -> impl Strategy<Value = (Vec<(usize, usize)>, Vec<usize>)> {
    (1usize..12).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n), 0..3 * n).prop_map(|pairs| {
            pairs
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (a.max(b), a.min(b)))
                .collect::<Vec<_>>()
        });
        let source = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
        (edges, source)
    })
}

proptest! {
    #[test]
    fn dependencies_precede_dependents((edges, source) in dag_and_shuffle()) {
        let mut deps: Graph<usize> = Graph::new();
        for &v in &source {
            deps.add_vertex(v);
        }
        for &(from, to) in &edges {
            deps.add_edge(from, to);
        }
        let order = TopologicalSort::new(source.clone())
            .dependency_graph(deps.clone())
            .unwrap();
        let out = order.to_vec();
        let rank: Vec<usize> = {
            let mut rank = vec![0; out.len()];
            for (i, &v) in out.iter().enumerate() {
                rank[v] = i;
            }
            rank
        };
        prop_assert_eq!(out.iter().copied().sorted().collect::<Vec<_>>(), (0..source.len()).collect::<Vec<_>>());
        for &(dependent, dependency) in &edges {
            prop_assert!(rank[dependency] < rank[dependent]);
        }

        let reversed = order.reverse().to_vec();
        prop_assert_eq!(reversed.len(), source.len());
    }

    #[test]
    fn no_relation_means_identity(source in prop::collection::vec(0u16..50, 0..30)) {
        let order = TopologicalSort::new(source.clone()).depends_on(|_, _| false).unwrap();
        prop_assert_eq!(order.to_vec(), source);
    }
}
