//! Isochrone computation over weighted road networks.
//!
//! Given a road graph and a travel-cost budget, the crate computes the
//! polygons bounding the reachable area: a cost-bounded Dijkstra tree is
//! drained into a spatial index of traversed edge geometry, a cost field
//! samples travel cost at arbitrary coordinates, and one of two contouring
//! strategies (recursive grid or TIN) extracts the isoline polygons.

pub mod algo;
pub mod error;
pub mod model;
pub mod prelude;
pub mod routing;

pub use error::Error;

/// Travel cost along the network, in the unit of the edge weighting
/// (seconds for time-based profiles, meters for distance-based ones).
pub type Cost = f64;

/// Meters per degree of latitude; longitude scales with cos(latitude).
pub(crate) const METERS_PER_DEGREE: f64 = 111_320.0;
