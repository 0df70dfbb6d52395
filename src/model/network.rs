//! Road network graph with a spatial index for location snapping

use geo::{Distance, Haversine, Point};
use petgraph::Directed;
use petgraph::graph::{DiGraph, EdgeIndex, Edges, NodeIndex};
use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::components::{RoadEdge, RoadNode};

/// Node entry of the snapping index
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Profile restriction over edges; rejected edges are invisible to the search
pub trait EdgeFilter: Sync {
    fn accept(&self, edge: &RoadEdge) -> bool;
}

/// Filter that accepts every edge
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllEdges;

impl EdgeFilter for AcceptAllEdges {
    fn accept(&self, _edge: &RoadEdge) -> bool {
        true
    }
}

impl<F> EdgeFilter for F
where
    F: Fn(&RoadEdge) -> bool + Sync,
{
    fn accept(&self, edge: &RoadEdge) -> bool {
        self(edge)
    }
}

/// Directed road network with an R-tree over node coordinates.
///
/// Built once by the caller from their own data source, then only read by
/// the isochrone engine. Concurrent read-only traversal is safe.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    pub graph: DiGraph<RoadNode, RoadEdge>,
    index: RTree<IndexedPoint>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: RoadNode) -> NodeIndex {
        self.graph.add_node(node)
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: RoadEdge) -> EdgeIndex {
        self.graph.add_edge(from, to, edge)
    }

    /// Rebuild the snapping index; call after the node set changed
    pub fn build_index(&mut self) {
        let entries = self
            .graph
            .node_indices()
            .map(|idx| {
                let point = self.graph[idx].geometry;
                IndexedPoint::new([point.x(), point.y()], idx)
            })
            .collect();
        self.index = RTree::bulk_load(entries);
    }

    /// Nearest graph node to the point, with the great-circle distance in meters
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeIndex, f64)> {
        let found = self.index.nearest_neighbor(&[point.x(), point.y()])?;
        let node_point = self.graph[found.data].geometry;
        Some((found.data, Haversine.distance(*point, node_point)))
    }

    /// Snap a location to the nearest node within `radius` meters
    pub fn snap(&self, point: &Point<f64>, radius: f64) -> Option<NodeIndex> {
        self.nearest_node(point)
            .filter(|(_, distance)| *distance <= radius)
            .map(|(node, _)| node)
    }

    /// Outgoing edges of a node
    pub fn edges(&self, node: NodeIndex) -> Edges<'_, RoadEdge, Directed> {
        self.graph.edges(node)
    }

    pub fn node_point(&self, node: NodeIndex) -> Option<Point<f64>> {
        self.graph.node_weight(node).map(|n| n.geometry)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
