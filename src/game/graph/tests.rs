//! Tests for the graph store and its connectivity queries.
//!
//! Most fixtures use integer payloads so nodes can be looked up by value,
//! mirroring how settlements are looked up by the game layer.

use super::*;
use crate::game::error::GameError;

/// Builds nodes 1..=5 with edges 1-2, 2-3, 2-4, 3-4 and optionally 1-5.
fn five_node_graph(with_tail: bool) -> Graph<i32> {
    let mut graph = Graph::new();
    for value in 1..=5 {
        graph.add_node(value);
    }
    let n = |g: &Graph<i32>, v: i32| g.get_node(&v).expect("fixture node");

    let pairs: &[(i32, i32)] = if with_tail {
        &[(1, 2), (2, 3), (2, 4), (3, 4), (1, 5)]
    } else {
        &[(1, 2), (2, 3), (2, 4), (3, 4)]
    };
    for &(a, b) in pairs {
        let (na, nb) = (n(&graph, a), n(&graph, b));
        graph.add_edge(na, nb);
    }
    graph
}

#[test]
fn test_add_edge_is_idempotent() {
    let mut graph = Graph::new();
    let a = graph.add_node('a');
    let b = graph.add_node('b');

    let first = graph.add_edge(a, b);
    let before = graph.edges_of(a).len();
    let second = graph.add_edge(a, b);
    let reversed = graph.add_edge(b, a);

    assert_eq!(first, second);
    assert_eq!(first, reversed);
    assert_eq!(graph.edges_of(a).len(), before);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_edge_equality_ignores_direction() {
    let mut graph = Graph::new();
    let a = graph.add_node(0);
    let b = graph.add_node(1);
    let c = graph.add_node(2);
    graph.add_edge(a, b);
    graph.add_edge(b, c);

    let ab = graph.get_edge(a, b).unwrap();
    let ba = graph.get_edge(b, a).unwrap();
    let bc = graph.get_edge(b, c).unwrap();
    assert_eq!(ab, ba);
    assert_ne!(ab, bc);
    assert_eq!(ab.other(a), Some(b));
    assert_eq!(ab.other(c), None);
    assert!(graph.get_edge(a, c).is_none());
}

#[test]
fn test_equal_payloads_stay_distinct_nodes() {
    let mut graph = Graph::new();
    let first = graph.add_node("keep");
    let second = graph.add_node("keep");

    assert_ne!(first, second);
    assert_eq!(graph.node_count(), 2);
    // Value lookup returns the first match in insertion order.
    assert_eq!(graph.get_node(&"keep"), Some(first));
    assert_eq!(graph.get_node(&"moat"), None);
}

#[test]
fn test_edges_of_follow_insertion_order() {
    let mut graph = Graph::new();
    for value in 1..=5 {
        graph.add_node(value);
    }
    let n = |v: i32| NodeId((v - 1) as usize);
    graph.add_edge(n(2), n(1));
    graph.add_edge(n(1), n(3));
    graph.add_edge(n(1), n(4));

    let edges = graph.edges_of(n(1));
    let expected = vec![
        graph.get_edge(n(1), n(2)).unwrap(),
        graph.get_edge(n(1), n(3)).unwrap(),
        graph.get_edge(n(1), n(4)).unwrap(),
    ];
    assert_eq!(edges, expected);
    assert!(graph.edges_of(n(5)).is_empty());
    assert_eq!(graph.neighbors(n(1)), vec![n(2), n(3), n(4)]);
    assert_eq!(graph.degree(n(1)), 3);
}

#[test]
fn test_values_in_node_order() {
    let mut graph = Graph::new();
    for value in [4, 3, 9] {
        graph.add_node(value);
    }
    assert_eq!(graph.values(), vec![&4, &3, &9]);
    assert!(Graph::<i32>::new().values().is_empty());
}

#[test]
fn test_graph_connected() {
    let graph = five_node_graph(true);
    assert!(graph.all_nodes_connected().unwrap());
}

#[test]
fn test_removing_tail_edge_disconnects() {
    let graph = five_node_graph(false);
    assert!(!graph.all_nodes_connected().unwrap());

    let components = graph.components();
    assert_eq!(components.len(), 2);
    assert_eq!(components[0].len(), 4);
    assert_eq!(components[1], vec![graph.get_node(&5).unwrap()]);
}

#[test]
fn test_empty_graph_connectivity_is_an_error() {
    let graph: Graph<u8> = Graph::new();
    assert!(matches!(
        graph.all_nodes_connected(),
        Err(GameError::InvalidArgument(_))
    ));
    assert!(graph.components().is_empty());
}

#[test]
fn test_single_node_is_connected() {
    let mut graph = Graph::new();
    graph.add_node(());
    assert!(graph.all_nodes_connected().unwrap());
}

#[test]
fn test_territories_respect_membership() {
    // Chain 1-2-3-4-5 where only odd payloads plus 2 are "owned":
    // 1,2,3 form one territory and 5 another (4 breaks the chain).
    let mut graph = Graph::new();
    let ids: Vec<NodeId> = (1..=5).map(|v| graph.add_node(v)).collect();
    for pair in ids.windows(2) {
        graph.add_edge(pair[0], pair[1]);
    }

    let owned = |v: &i32| *v != 4;
    let territories = graph.territories(owned);
    assert_eq!(territories.len(), 2);
    assert_eq!(territories[0].len(), 3);
    assert_eq!(territories[1], vec![ids[4]]);

    let largest = graph.largest_territory(owned).unwrap();
    assert_eq!(largest.len(), 3);
    assert!(graph.largest_territory(|_| false).is_none());
}

#[test]
fn test_value_mut_relabels_without_touching_topology() {
    let mut graph = five_node_graph(true);
    let node = graph.get_node(&3).unwrap();
    let edges_before = graph.edge_count();

    *graph.value_mut(node).unwrap() = 30;

    assert_eq!(graph.value(node), Some(&30));
    assert_eq!(graph.edge_count(), edges_before);
    assert_eq!(graph.get_node(&3), None);
}

#[test]
fn test_node_id_by_index() {
    let graph = five_node_graph(true);
    assert_eq!(graph.node_id(0), graph.get_node(&1));
    assert_eq!(graph.node_id(4), graph.get_node(&5));
    assert_eq!(graph.node_id(5), None);
}

#[test]
fn test_try_add_edge_rejects_foreign_handles() {
    let mut graph = five_node_graph(false);
    let a = graph.node_id(0).unwrap();

    assert!(matches!(graph.try_add_edge(a, NodeId(5)), Err(GameError::NotFound(_))));
    assert!(matches!(graph.try_add_edge(a, a), Err(GameError::InvalidArgument(_))));
    assert_eq!(graph.edge_count(), 4);

    let tail = graph.try_add_edge(a, NodeId(4)).unwrap();
    assert_eq!(graph.try_add_edge(NodeId(4), a).unwrap(), tail);
}

fn tampered(graph: &Graph<i32>, edit: impl FnOnce(&mut serde_json::Value)) -> Graph<i32> {
    let mut value = serde_json::to_value(graph).unwrap();
    edit(&mut value);
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_validate_accepts_built_graphs() {
    assert!(five_node_graph(true).validate().is_ok());
    assert!(Graph::<i32>::new().validate().is_ok());
}

#[test]
fn test_validate_rejects_corrupt_graphs() {
    let graph = five_node_graph(true);

    // Incidence pointing past the edge list.
    let dangling = tampered(&graph, |v| v["incidence"][0] = serde_json::json!([7]));
    assert!(matches!(dangling.validate(), Err(GameError::InvalidArgument(_))));

    // Edge endpoint outside the node list.
    let bad_endpoint = tampered(&graph, |v| v["edges"][0]["b"] = serde_json::json!(42));
    assert!(bad_endpoint.validate().is_err());

    // Node without an incidence list.
    let short_incidence = tampered(&graph, |v| {
        v["incidence"].as_array_mut().unwrap().pop();
    });
    assert!(short_incidence.validate().is_err());

    // Edge list emptied while incidence still refers to it.
    let no_edges = tampered(&graph, |v| v["edges"] = serde_json::json!([]));
    assert!(no_edges.validate().is_err());

    // Same pair stored twice.
    let duplicate = tampered(&graph, |v| {
        let edges = v["edges"].as_array_mut().unwrap();
        let mut copy = edges[0].clone();
        copy["id"] = serde_json::json!(edges.len());
        edges.push(copy);
    });
    assert!(duplicate.validate().is_err());
}
