// Re-export key components
pub use crate::algo::isochrone::{
    IsochroneConfig, IsochroneRequest, IsolineMethod, build_isochrone_map, bulk_isochrone_maps,
};
pub use crate::error::Error;
pub use crate::model::{
    AcceptAllEdges, EdgeFilter, Isochrone, IsochroneMap, RoadEdge, RoadGraph, RoadNode,
};
pub use crate::routing::{ShortestPathTree, bounded_dijkstra};

// Core scalar type
pub use crate::Cost;
