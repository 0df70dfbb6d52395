//! Isochrone map construction
//!
//! Orchestrates the pipeline for one request: snap the location to the
//! network, grow the cost-bounded shortest-path tree, drain it into the
//! edge-buffer index, bind a cost field and contour one isoline per
//! threshold.

pub mod cost_field;
pub mod edge_buffer;
pub mod isoline;
mod to_geojson;

pub use cost_field::CostField;
pub use edge_buffer::{EdgeBuffer, EdgeBufferIndex, SamplePoint};
pub use isoline::{
    GridIsolineBuilder, IsolineBuilder, IsolineMethod, TinIsolineBuilder,
};

use geo::Point;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::{EdgeFilter, Isochrone, IsochroneMap, RoadGraph};
use crate::routing::bounded_dijkstra;
use crate::{Cost, Error, METERS_PER_DEGREE};

// Cost-field search radius in finest grid cells; wide enough that cell
// corners adjacent to a traversed edge see it
const SEARCH_RADIUS_CELLS: f64 = 2.0;

/// One isochrone computation for one location
#[derive(Debug, Clone)]
pub struct IsochroneRequest {
    pub location: Point<f64>,
    /// Index of the location within a multi-location request
    pub traveller_id: u32,
    /// Travel-cost budget of the outermost isochrone
    pub max_cost: Cost,
    /// Spacing of nested rings; zero or negative disables intervals
    pub interval: Cost,
    pub method: IsolineMethod,
}

impl IsochroneRequest {
    pub fn new(location: Point<f64>, max_cost: Cost) -> Self {
        Self {
            location,
            traveller_id: 0,
            max_cost,
            interval: 0.0,
            method: IsolineMethod::default(),
        }
    }
}

/// Tuning knobs shared by all requests of a deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsochroneConfig {
    /// Ground size of the finest contouring grid cell, meters
    #[serde(default = "default_grid_resolution")]
    pub grid_resolution: f64,
    /// Maximum snapping distance from the request location to the graph, meters
    #[serde(default = "default_snap_radius")]
    pub snap_radius: f64,
    /// How far past the budget the tree search keeps expanding, in cost
    /// units. Absorbs edges whose tail lies within the budget but whose
    /// geometry reaches beyond it, so polygon boundaries are not truncated
    /// at tail nodes. Empirical; re-tune when graph density changes.
    #[serde(default = "default_cost_margin")]
    pub cost_margin: Cost,
}

fn default_grid_resolution() -> f64 {
    100.0
}

fn default_snap_radius() -> f64 {
    350.0
}

fn default_cost_margin() -> Cost {
    30.0
}

impl Default for IsochroneConfig {
    fn default() -> Self {
        Self {
            grid_resolution: default_grid_resolution(),
            snap_radius: default_snap_radius(),
            cost_margin: default_cost_margin(),
        }
    }
}

/// Compute the isochrone map for one request.
///
/// A location that cannot be snapped fails with [`Error::NoStartNode`]. A
/// snapped location from which nothing is reachable yields an `Ok` map with
/// zero isochrones - the "no reachable area" outcome is a valid result, not
/// an error. Thresholds whose isoline comes back empty are skipped.
pub fn build_isochrone_map(
    graph: &RoadGraph,
    filter: &dyn EdgeFilter,
    request: &IsochroneRequest,
    config: &IsochroneConfig,
) -> Result<IsochroneMap, Error> {
    validate(request, config)?;

    let mut map = IsochroneMap::new(request.traveller_id, request.location);

    let source = graph
        .snap(&request.location, config.snap_radius)
        .ok_or(Error::NoStartNode)?;

    let budget = request.max_cost + config.cost_margin;
    let tree = bounded_dijkstra(graph, source, budget, filter);
    if tree.is_empty() {
        debug!(
            "no reachable area for traveller {} within {}",
            request.traveller_id, request.max_cost
        );
        return Ok(map);
    }
    debug!("settled {} nodes within budget {budget}", tree.len());

    let index = EdgeBufferIndex::build(&tree, graph);
    if index.is_empty() {
        return Ok(map);
    }

    let cell_size = config.grid_resolution / METERS_PER_DEGREE;
    let field = CostField::new(&index, cell_size * SEARCH_RADIUS_CELLS);

    let builder: Box<dyn IsolineBuilder + '_> = match request.method {
        IsolineMethod::RecursiveGrid => Box::new(GridIsolineBuilder::new(
            &field,
            index.seed_points(),
            request.location,
            config.grid_resolution,
        )),
        IsolineMethod::Tin => Box::new(TinIsolineBuilder::new(index.seed_points())),
    };

    for threshold in thresholds(request.max_cost, request.interval) {
        let isoline = builder.compute_isoline(threshold);
        if isoline.0.is_empty() {
            // legitimate for small thresholds in sparse areas
            debug!("empty isoline at threshold {threshold}");
            continue;
        }
        for polygon in isoline {
            map.add_isochrone(Isochrone::new(polygon, threshold));
        }
    }

    info!(
        "built {} isochrones for traveller {}",
        map.len(),
        request.traveller_id
    );
    Ok(map)
}

/// Isochrone maps for many independent requests, computed in parallel.
/// Each request owns its tree, index and field; only the graph is shared,
/// read-only.
pub fn bulk_isochrone_maps(
    graph: &RoadGraph,
    filter: &dyn EdgeFilter,
    requests: &[IsochroneRequest],
    config: &IsochroneConfig,
) -> Result<Vec<IsochroneMap>, Error> {
    requests
        .par_iter()
        .map(|request| build_isochrone_map(graph, filter, request, config))
        .collect()
}

fn validate(request: &IsochroneRequest, config: &IsochroneConfig) -> Result<(), Error> {
    if !request.max_cost.is_finite() || request.max_cost < 0.0 {
        return Err(Error::InvalidData(format!(
            "travel-cost budget must be non-negative, got {}",
            request.max_cost
        )));
    }
    if !config.grid_resolution.is_finite() || config.grid_resolution <= 0.0 {
        return Err(Error::InvalidData(format!(
            "grid resolution must be positive, got {}",
            config.grid_resolution
        )));
    }
    if config.cost_margin < 0.0 {
        return Err(Error::InvalidData(format!(
            "cost margin must be non-negative, got {}",
            config.cost_margin
        )));
    }
    Ok(())
}

/// Ascending cost thresholds: the inner rings at interval multiples
/// strictly below the budget, then the budget itself
fn thresholds(max_cost: Cost, interval: Cost) -> Vec<Cost> {
    let mut values = Vec::new();
    if interval > 0.0 {
        let mut value = interval;
        while value < max_cost - 1e-9 {
            values.push(value);
            value += interval;
        }
    }
    values.push(max_cost);
    values
}
