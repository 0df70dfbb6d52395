//! Core computation algorithms

pub mod isochrone;

pub use isochrone::{IsochroneConfig, IsochroneRequest, build_isochrone_map, bulk_isochrone_maps};
