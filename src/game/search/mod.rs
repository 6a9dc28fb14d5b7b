//! Single-source shortest paths over a [`Graph`] with pluggable costs.
//!
//! A search is configured by a [`SearchPolicy`]: edge cost, edge passability
//! and node passability. The framework itself knows nothing about what a cost
//! means in the game.
//!
//! # Algorithm
//!
//! Label-setting without a priority queue (O(V² + V·E)):
//!
//! 1. Every node starts unreached except the source (cost 0); all nodes are
//!    in the frontier.
//! 2. Pick the frontier node with the smallest reached cost. Ties go to the
//!    node inserted first. Stop when no reached node is left in the frontier.
//! 3. Relax each passable incident edge with a finite cost: the neighbor takes
//!    `cost(current) + cost(edge)` if it is unreached or the candidate is
//!    strictly smaller.
//!
//! Edge costs must be non-negative. This is not validated; negative costs
//! give an unspecified (not necessarily minimal) result.
//!
//! # Node passability
//!
//! Impassable nodes can still be reached and receive a cost, so they are
//! valid destinations (an enemy settlement can be attacked), but the search
//! never expands through them. The source is always expanded.

mod policy;


pub use policy::{FnPolicy, SearchPolicy, TravelDistance, UniformCost};

use bevy::prelude::*;
use fixedbitset::FixedBitSet;

use crate::game::error::GameError;
use crate::game::graph::{Edge, Graph, NodeId};

/// Per-node search state, created fresh for each run. `cost` is `None`
/// until the node is reached, whatever sign real costs have.
#[derive(Clone, Copy, Debug)]
struct Label {
    cost: Option<f64>,
    previous: Option<NodeId>,
}

impl Label {
    const UNREACHED: Label = Label { cost: None, previous: None };
}

/// Result of one shortest-path run from a single source.
pub struct ShortestPaths<'g, T> {
    graph: &'g Graph<T>,
    source: NodeId,
    labels: Vec<Label>,
}

impl<'g, T> ShortestPaths<'g, T> {
    /// Run the search from `source` to completion.
    pub fn run<P>(graph: &'g Graph<T>, source: NodeId, policy: &P) -> Result<Self, GameError>
    where
        P: SearchPolicy<T> + ?Sized,
    {
        if !graph.contains(source) {
            return Err(GameError::NotFound(format!(
                "search source {:?} is not a node of the graph",
                source
            )));
        }

        let mut labels = vec![Label::UNREACHED; graph.node_count()];
        labels[source.index()].cost = Some(0.0);

        let mut frontier = FixedBitSet::with_capacity(graph.node_count());
        frontier.insert_range(..);

        let mut settled = 0usize;
        while let Some(current) = Self::select_smallest(&labels, &frontier) {
            frontier.set(current.index(), false);
            settled += 1;

            if current != source && !policy.node_passable(graph, current) {
                continue;
            }

            let Some(base) = labels[current.index()].cost else { continue };
            for edge in graph.incident(current) {
                if !policy.edge_passable(graph, edge) {
                    continue;
                }
                let step = policy.cost(graph, edge);
                if !step.is_finite() {
                    continue;
                }
                let Some(next) = edge.other(current) else { continue };

                let candidate = base + step;
                let label = &mut labels[next.index()];
                if label.cost.map_or(true, |cost| candidate < cost) {
                    label.cost = Some(candidate);
                    label.previous = Some(current);
                }
            }
        }

        debug!(
            "[SEARCH] from {:?}: settled {}/{} nodes",
            source,
            settled,
            graph.node_count()
        );

        Ok(Self { graph, source, labels })
    }

    /// Linear scan of the frontier for the reached node with minimal cost.
    /// Strict comparison keeps the earliest node on ties.
    fn select_smallest(labels: &[Label], frontier: &FixedBitSet) -> Option<NodeId> {
        let mut best: Option<(usize, f64)> = None;
        for index in frontier.ones() {
            let Some(cost) = labels[index].cost else { continue };
            match best {
                Some((_, best_cost)) if cost >= best_cost => {}
                _ => best = Some((index, cost)),
            }
        }
        best.map(|(index, _)| NodeId(index))
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn graph(&self) -> &'g Graph<T> {
        self.graph
    }

    /// Total cost from the source, `None` if `node` was never reached.
    pub fn cost_to(&self, node: NodeId) -> Option<f64> {
        self.labels.get(node.index()).and_then(|label| label.cost)
    }

    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.cost_to(node).is_some()
    }

    /// Edges from the source to `destination`, source side first.
    ///
    /// `None` when the destination is unreached; an empty path for the source
    /// itself.
    pub fn path_to(&self, destination: NodeId) -> Option<Vec<Edge>> {
        let nodes = self.path_nodes(destination)?;
        nodes
            .windows(2)
            .map(|pair| self.graph.get_edge(pair[0], pair[1]))
            .collect()
    }

    /// Nodes from the source to `destination`, both included.
    pub fn path_nodes(&self, destination: NodeId) -> Option<Vec<NodeId>> {
        self.cost_to(destination)?;

        // Predecessor chains are collected destination first and reversed
        // afterwards. A chain longer than the node count can only come from
        // negative costs creating a predecessor cycle.
        let mut nodes = vec![destination];
        let mut current = destination;
        while let Some(previous) = self.labels[current.index()].previous {
            if nodes.len() > self.labels.len() {
                warn!(
                    "[SEARCH] predecessor cycle while tracing {:?} from {:?} (negative edge costs?)",
                    destination, self.source
                );
                return None;
            }
            nodes.push(previous);
            current = previous;
        }

        if current != self.source {
            return None;
        }
        nodes.reverse();
        Some(nodes)
    }

    /// Every reached node with its cost, in node order.
    pub fn reached(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(index, label)| label.cost.map(|cost| (NodeId(index), cost)))
    }

    /// Nodes whose cost does not exceed `budget`, source included.
    pub fn within(&self, budget: f64) -> Vec<NodeId> {
        self.reached()
            .filter(|&(_, cost)| cost <= budget)
            .map(|(node, _)| node)
            .collect()
    }
}
