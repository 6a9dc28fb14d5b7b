use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use rustc_hash::FxHashSet;

use crate::game::error::GameError;
use crate::game::graph::{EdgeId, Graph, NodeId};
use crate::game::math::Located;
use crate::game::profiling::profile;
use crate::profile_log;

/// Default ratio above which a two-hop detour no longer counts as a better way.
pub const DEFAULT_DETOUR_RATIO: f32 = 1.3;

/// What a repair pass added to the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Edges added by the nearest-neighbour seeding pass.
    pub seeded_edges: usize,
    /// Edges added between components while merging.
    pub bridge_edges: usize,
    pub merge_rounds: usize,
    /// Edges added to lift dead ends and weak pairs.
    pub reinforcement_edges: usize,
    /// Weak nodes that were already adjacent to every other node.
    pub exhausted_nodes: usize,
}

impl RepairStats {
    pub fn total_edges(&self) -> usize {
        self.seeded_edges + self.bridge_edges + self.reinforcement_edges
    }
}

/// Turns a set of placed nodes into one connected graph without dead ends.
///
/// Three passes run in order:
///
/// 1. **Seeding** - every node gets an edge to its nearest non-adjacent node,
///    unless a two-hop detour through a common neighbour is already shorter
///    than `detour_ratio` times the direct distance.
/// 2. **Merging** - components are bridged through their closest node pair,
///    round after round, until one component remains. Within a round a
///    component never merges back into the component that just picked it.
/// 3. **Reinforcement** - dead ends (degree < 2) and nodes of degree < 3 next to a
///    neighbour of degree < 3 get extra edges the same way as in seeding.
///    When the detour rule leaves no candidate the nearest unconnected node
///    is taken; a node already adjacent to every other node is skipped from
///    then on, which bounds the pass.
///
/// Node positions never change during repair; only edges are added.
#[derive(Clone, Copy, Debug)]
pub struct ConnectivityRepair {
    detour_ratio: f32,
}

impl Default for ConnectivityRepair {
    fn default() -> Self {
        Self { detour_ratio: DEFAULT_DETOUR_RATIO }
    }
}

impl ConnectivityRepair {
    pub fn new(detour_ratio: f32) -> Self {
        Self { detour_ratio }
    }

    pub fn detour_ratio(&self) -> f32 {
        self.detour_ratio
    }

    /// Run all three passes and verify the result.
    ///
    /// Returns `InvalidArgument` for an empty graph and `GenerationFailure`
    /// if the graph is still disconnected afterwards.
    #[profile(label = "connectivity repair", threshold_ms = 5)]
    pub fn repair<T: Located>(&self, graph: &mut Graph<T>) -> Result<RepairStats, GameError> {
        if graph.is_empty() {
            return Err(GameError::InvalidArgument(
                "cannot repair an empty graph".to_string(),
            ));
        }

        let positions: Vec<Vec2> = graph.values().into_iter().map(|v| v.position()).collect();
        let mut stats = RepairStats::default();

        stats.seeded_edges = self.seed(graph, &positions);
        debug!("[REPAIR] seeding added {} edges", stats.seeded_edges);

        let (bridges, rounds) = self.merge_components(graph, &positions);
        stats.bridge_edges = bridges;
        stats.merge_rounds = rounds;
        debug!("[REPAIR] merged components in {} rounds ({} bridges)", rounds, bridges);

        let (reinforced, exhausted) = self.reinforce(graph, &positions);
        stats.reinforcement_edges = reinforced;
        stats.exhausted_nodes = exhausted;

        if !graph.all_nodes_connected()? {
            return Err(GameError::GenerationFailure(format!(
                "graph still has {} components after repair",
                graph.components().len()
            )));
        }

        info!(
            "[REPAIR] {} nodes, {} edges (seeded {}, bridges {}, reinforced {}, exhausted nodes {})",
            graph.node_count(),
            graph.edge_count(),
            stats.seeded_edges,
            stats.bridge_edges,
            stats.reinforcement_edges,
            stats.exhausted_nodes
        );

        Ok(stats)
    }

    fn seed<T>(&self, graph: &mut Graph<T>, positions: &[Vec2]) -> usize {
        let nodes: Vec<NodeId> = graph.node_ids().collect();
        nodes
            .into_iter()
            .filter(|&node| self.connect_nearest(graph, positions, node, true).is_some())
            .count()
    }

    fn merge_components<T>(&self, graph: &mut Graph<T>, positions: &[Vec2]) -> (usize, usize) {
        let mut bridges = 0;
        let mut rounds = 0;

        loop {
            let components = graph.components();
            if components.len() < 2 {
                break;
            }
            rounds += 1;

            // (i, j): component i must not pick j again this round because j
            // already merged into i.
            let mut merged: FxHashSet<(usize, usize)> = FxHashSet::default();

            for i in 0..components.len() {
                let mut closest: Option<(f32, usize, NodeId, NodeId)> = None;
                for j in 0..components.len() {
                    if i == j || merged.contains(&(i, j)) {
                        continue;
                    }
                    let Some((distance, a, b)) =
                        closest_pair(positions, &components[i], &components[j])
                    else {
                        continue;
                    };
                    if closest.map_or(true, |(best, ..)| distance < best) {
                        closest = Some((distance, j, a, b));
                    }
                }

                if let Some((_, j, a, b)) = closest {
                    let before = graph.edge_count();
                    graph.add_edge(a, b);
                    bridges += graph.edge_count() - before;
                    merged.insert((j, i));
                }
            }

            profile_log!(
                rounds,
                "[REPAIR] merge round {}: {} components before",
                rounds,
                components.len()
            );
        }

        (bridges, rounds)
    }

    fn reinforce<T>(&self, graph: &mut Graph<T>, positions: &[Vec2]) -> (usize, usize) {
        let mut exhausted = FixedBitSet::with_capacity(graph.node_count());
        let mut added = 0;
        let mut exhausted_count = 0;

        while let Some(node) = find_weak_node(graph, &exhausted) {
            let edge = self
                .connect_nearest(graph, positions, node, true)
                .or_else(|| self.connect_nearest(graph, positions, node, false));

            match edge {
                Some(_) => added += 1,
                None => {
                    exhausted.insert(node.index());
                    exhausted_count += 1;
                }
            }
        }

        (added, exhausted_count)
    }

    /// Connect `node` to the nearest node it is not adjacent to yet.
    fn connect_nearest<T>(
        &self,
        graph: &mut Graph<T>,
        positions: &[Vec2],
        node: NodeId,
        honor_detour: bool,
    ) -> Option<EdgeId> {
        let candidate = nodes_by_distance(graph, positions, node)
            .into_iter()
            .filter(|&other| !graph.are_adjacent(node, other))
            .find(|&other| !honor_detour || !self.has_detour(graph, positions, node, other))?;
        Some(graph.add_edge(node, candidate))
    }

    /// Whether some neighbour of `start` is adjacent to `dest` and the route
    /// through it is shorter than `detour_ratio` times the direct distance.
    fn has_detour<T>(&self, graph: &Graph<T>, positions: &[Vec2], start: NodeId, dest: NodeId) -> bool {
        let s = positions[start.index()];
        let d = positions[dest.index()];
        let limit = s.distance(d) * self.detour_ratio;

        graph.neighbors(start).into_iter().any(|via| {
            if !graph.are_adjacent(via, dest) {
                return false;
            }
            let v = positions[via.index()];
            s.distance(v) + v.distance(d) < limit
        })
    }
}

/// Run [`ConnectivityRepair`] with the given detour ratio.
pub fn repair_connectivity<T: Located>(
    graph: &mut Graph<T>,
    detour_ratio: f32,
) -> Result<RepairStats, GameError> {
    ConnectivityRepair::new(detour_ratio).repair(graph)
}

/// Every other node, nearest first. Equal distances keep insertion order.
fn nodes_by_distance<T>(graph: &Graph<T>, positions: &[Vec2], node: NodeId) -> Vec<NodeId> {
    let origin = positions[node.index()];
    let mut others: Vec<(f32, NodeId)> = graph
        .node_ids()
        .filter(|&other| other != node)
        .map(|other| (origin.distance(positions[other.index()]), other))
        .collect();
    others.sort_by(|a, b| a.0.total_cmp(&b.0));
    others.into_iter().map(|(_, other)| other).collect()
}

/// Closest cross pair between two components; the first pair found wins ties.
fn closest_pair(
    positions: &[Vec2],
    from: &[NodeId],
    to: &[NodeId],
) -> Option<(f32, NodeId, NodeId)> {
    let mut best: Option<(f32, NodeId, NodeId)> = None;
    for &a in from {
        for &b in to {
            let distance = positions[a.index()].distance(positions[b.index()]);
            if best.map_or(true, |(d, ..)| distance < d) {
                best = Some((distance, a, b));
            }
        }
    }
    best
}

/// First node that is a dead end (degree < 2) or part of a weak pair
/// (degree < 3 next to a neighbour of degree < 3), skipping exhausted nodes.
fn find_weak_node<T>(graph: &Graph<T>, exhausted: &FixedBitSet) -> Option<NodeId> {
    graph.node_ids().find(|&node| {
        if exhausted.contains(node.index()) {
            return false;
        }
        match graph.degree(node) {
            0 | 1 => true,
            2 => graph.neighbors(node).into_iter().any(|n| graph.degree(n) < 3),
            _ => false,
        }
    })
}
