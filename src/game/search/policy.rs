use crate::game::graph::{Edge, Graph, NodeId};
use crate::game::math::Located;

/// Defines a concrete search: what an edge costs and what may be traversed.
pub trait SearchPolicy<T> {
    /// Cost of crossing `edge`. Non-finite costs make the edge unusable.
    fn cost(&self, graph: &Graph<T>, edge: &Edge) -> f64;

    fn edge_passable(&self, _graph: &Graph<T>, _edge: &Edge) -> bool {
        true
    }

    /// Whether the search may continue *through* `node`. Impassable nodes are
    /// still reachable as destinations.
    fn node_passable(&self, _graph: &Graph<T>, _node: NodeId) -> bool {
        true
    }
}

/// Every edge costs 1: distances are hop counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformCost;

impl<T> SearchPolicy<T> for UniformCost {
    fn cost(&self, _graph: &Graph<T>, _edge: &Edge) -> f64 {
        1.0
    }
}

/// Euclidean length between the located payloads of an edge's endpoints.
#[derive(Clone, Copy, Debug, Default)]
pub struct TravelDistance;

impl<T: Located> SearchPolicy<T> for TravelDistance {
    fn cost(&self, graph: &Graph<T>, edge: &Edge) -> f64 {
        let (a, b) = edge.nodes();
        match (graph.value(a), graph.value(b)) {
            (Some(a), Some(b)) => a.distance(b) as f64,
            _ => f64::INFINITY,
        }
    }
}

type EdgeFn<'a, T> = Box<dyn Fn(&Graph<T>, &Edge) -> bool + 'a>;
type NodeFn<'a, T> = Box<dyn Fn(&Graph<T>, NodeId) -> bool + 'a>;

/// Closure-backed policy for one-off searches.
///
/// ```
/// use fiefdom::game::graph::Graph;
/// use fiefdom::game::search::{FnPolicy, ShortestPaths};
///
/// let mut graph = Graph::new();
/// let a = graph.add_node(1u32);
/// let b = graph.add_node(2u32);
/// graph.add_edge(a, b);
///
/// let policy = FnPolicy::new(|g: &Graph<u32>, e| {
///     let (x, y) = e.nodes();
///     (g.value(x).unwrap() + g.value(y).unwrap()) as f64
/// });
/// let paths = ShortestPaths::run(&graph, a, &policy).unwrap();
/// assert_eq!(paths.cost_to(b), Some(3.0));
/// ```
pub struct FnPolicy<'a, T> {
    cost: Box<dyn Fn(&Graph<T>, &Edge) -> f64 + 'a>,
    edge_filter: Option<EdgeFn<'a, T>>,
    node_filter: Option<NodeFn<'a, T>>,
}

impl<'a, T> FnPolicy<'a, T> {
    pub fn new<C>(cost: C) -> Self
    where
        C: Fn(&Graph<T>, &Edge) -> f64 + 'a,
    {
        Self {
            cost: Box::new(cost),
            edge_filter: None,
            node_filter: None,
        }
    }

    pub fn with_edge_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Graph<T>, &Edge) -> bool + 'a,
    {
        self.edge_filter = Some(Box::new(filter));
        self
    }

    pub fn with_node_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Graph<T>, NodeId) -> bool + 'a,
    {
        self.node_filter = Some(Box::new(filter));
        self
    }
}

impl<'a, T> SearchPolicy<T> for FnPolicy<'a, T> {
    fn cost(&self, graph: &Graph<T>, edge: &Edge) -> f64 {
        (self.cost)(graph, edge)
    }

    fn edge_passable(&self, graph: &Graph<T>, edge: &Edge) -> bool {
        self.edge_filter.as_ref().map_or(true, |f| f(graph, edge))
    }

    fn node_passable(&self, graph: &Graph<T>, node: NodeId) -> bool {
        self.node_filter.as_ref().map_or(true, |f| f(graph, node))
    }
}
