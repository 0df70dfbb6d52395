//! Data model for isochrone computation
//!
//! Contains the road network collaborator and the isochrone result entities.

pub mod components;
pub mod isochrone;
pub mod network;

pub use components::{RoadEdge, RoadNode};
pub use isochrone::{Isochrone, IsochroneMap};
pub use network::{AcceptAllEdges, EdgeFilter, IndexedPoint, RoadGraph};
