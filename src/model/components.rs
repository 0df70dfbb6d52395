//! Road network components - nodes and edges

use geo::{Coord, LineString, Point};

use crate::Cost;

/// Road graph node
#[derive(Debug, Clone)]
pub struct RoadNode {
    /// External (e.g. OSM) id of the node
    pub id: i64,
    /// Node coordinates
    pub geometry: Point<f64>,
}

/// Road graph edge (street segment)
#[derive(Debug, Clone)]
pub struct RoadEdge {
    /// Traversal cost in the unit of the active weighting
    pub weight: Cost,
    /// Full polyline geometry in traversal direction, not just the endpoints
    pub geometry: LineString<f64>,
}

impl RoadEdge {
    /// Edge whose geometry is the straight chord between its endpoints
    pub fn straight(weight: Cost, from: Point<f64>, to: Point<f64>) -> Self {
        Self {
            weight,
            geometry: LineString::from(vec![Coord::from(from), Coord::from(to)]),
        }
    }
}
