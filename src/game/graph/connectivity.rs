use fixedbitset::FixedBitSet;

use super::store::Graph;
use super::types::NodeId;
use crate::game::error::GameError;

impl<T> Graph<T> {
    /// Whether a depth-first walk from the first node reaches every node.
    ///
    /// An empty graph has no node to start from and is rejected.
    pub fn all_nodes_connected(&self) -> Result<bool, GameError> {
        let Some(first) = self.node_ids().next() else {
            return Err(GameError::InvalidArgument(
                "connectivity is undefined for an empty graph".to_string(),
            ));
        };

        let mut visited = FixedBitSet::with_capacity(self.node_count());
        let reached = self.flood(first, &mut visited, |_| true);
        Ok(reached.len() == self.node_count())
    }

    /// Connected components, each listed in discovery order.
    ///
    /// Components are ordered by their earliest node, so the component
    /// containing node 0 always comes first.
    pub fn components(&self) -> Vec<Vec<NodeId>> {
        self.territories(|_| true)
    }

    /// Connected components of the subgraph induced by the nodes whose
    /// payload satisfies `member`. Edges leaving the subgraph are ignored.
    pub fn territories<F>(&self, member: F) -> Vec<Vec<NodeId>>
    where
        F: Fn(&T) -> bool,
    {
        let mut visited = FixedBitSet::with_capacity(self.node_count());
        let mut territories = Vec::new();

        for node in self.nodes() {
            if visited.contains(node.id.index()) || !member(&node.value) {
                continue;
            }
            let territory = self.flood(node.id, &mut visited, |id| {
                self.value(id).map_or(false, |v| member(v))
            });
            territories.push(territory);
        }

        territories
    }

    /// The biggest territory of `member` nodes; the first one found wins ties.
    pub fn largest_territory<F>(&self, member: F) -> Option<Vec<NodeId>>
    where
        F: Fn(&T) -> bool,
    {
        let mut largest: Option<Vec<NodeId>> = None;
        for territory in self.territories(member) {
            if largest.as_ref().map_or(true, |best| territory.len() > best.len()) {
                largest = Some(territory);
            }
        }
        largest
    }

    /// Iterative depth-first flood fill from `start` over nodes accepted by
    /// `admit`. Marks everything it reaches in `visited`.
    fn flood<F>(&self, start: NodeId, visited: &mut FixedBitSet, admit: F) -> Vec<NodeId>
    where
        F: Fn(NodeId) -> bool,
    {
        let mut reached = Vec::new();
        let mut stack = vec![start];
        visited.insert(start.index());

        while let Some(current) = stack.pop() {
            reached.push(current);
            for edge in self.incident(current) {
                let Some(next) = edge.other(current) else { continue };
                if visited.contains(next.index()) || !admit(next) {
                    continue;
                }
                visited.insert(next.index());
                stack.push(next);
            }
        }

        reached
    }
}
