use fiefdom::game::config::WorldConfig;
use fiefdom::game::graph::{Graph, NodeId};
use fiefdom::game::map::{GameMap, Settlement};
use fiefdom::game::mapgen::generate_map;
use fiefdom::game::search::{FnPolicy, ShortestPaths, UniformCost};
use fiefdom::game::terrain::Uniform;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn sample_map(seed: u64) -> GameMap {
    let config = WorldConfig {
        settlement_count: 25,
        map_width: 40,
        map_height: 25,
        ..Default::default()
    };
    generate_map(&config, &Uniform(1.0), &mut StdRng::seed_from_u64(seed)).unwrap()
}

#[test]
fn test_routes_are_contiguous_and_source_first() {
    let map = sample_map(31);
    let ids: Vec<NodeId> = map.graph().node_ids().collect();
    let from = ids[0];

    for &to in &ids[1..] {
        let route = map.route(from, to).unwrap().expect("generated maps are connected");
        assert!(!route.is_empty());
        assert!(route[0].contains(from), "route to {:?} does not start at source", to);
        assert!(route[route.len() - 1].contains(to));

        // Consecutive roads share a settlement.
        let mut at = from;
        for road in &route {
            at = road.other(at).expect("road continues from the previous one");
        }
        assert_eq!(at, to);
    }
}

#[test]
fn test_travel_cost_matches_route_length() {
    let map = sample_map(8);
    let paths = map.travel_paths(map.graph().node_id(0).unwrap()).unwrap();

    for (node, cost) in paths.reached() {
        let nodes = paths.path_nodes(node).unwrap();
        let length: f64 = nodes
            .windows(2)
            .map(|pair| {
                let a = map.settlement(pair[0]).unwrap().position;
                let b = map.settlement(pair[1]).unwrap().position;
                a.distance(b) as f64
            })
            .sum();
        assert!((length - cost).abs() < 1e-3, "{:?}: {} vs {}", node, length, cost);
    }
}

#[test]
fn test_hop_distance_never_exceeds_node_count() {
    let map = sample_map(4);
    let graph = map.graph();
    for source in graph.node_ids() {
        let paths = ShortestPaths::run(graph, source, &UniformCost).unwrap();
        for (_, hops) in paths.reached() {
            assert!(hops < graph.node_count() as f64);
        }
        assert_eq!(paths.reached().count(), graph.node_count());
    }
}

#[test]
fn test_enemy_kingdom_blocks_transit_but_not_attack() {
    let map = sample_map(19);
    let Some(home) = map.kingdoms().first() else {
        return;
    };
    let capital = map.graph().node_id(home.center()).unwrap();

    // Move/attack range: travel through own settlements only, but any
    // adjacent foreign settlement may be targeted.
    let policy = FnPolicy::new(|_, _| 1.0).with_node_filter(
        |g: &Graph<Settlement>, node: NodeId| g.value(node).and_then(|s| s.kingdom) == Some(0),
    );
    let paths = ShortestPaths::run(map.graph(), capital, &policy).unwrap();

    for (node, _) in paths.reached() {
        if node == capital {
            continue;
        }
        let nodes = paths.path_nodes(node).unwrap();
        // Every waypoint strictly between source and target is friendly.
        for waypoint in &nodes[1..nodes.len() - 1] {
            assert_eq!(map.settlement(*waypoint).unwrap().kingdom, Some(0));
        }
    }
}
