//! Isoline extraction strategies
//!
//! Two interchangeable contouring strategies turn the sampled cost field
//! into polygons: a recursive adaptive grid (marching squares) and a
//! triangulation of the settled-node points. The grid gives uniform
//! resolution and stays stable near the search-radius boundary; the TIN
//! follows the node density and wastes no resolution on empty areas.

mod grid;
mod tin;

pub use grid::GridIsolineBuilder;
pub use tin::TinIsolineBuilder;

use std::str::FromStr;

use geo::{Area, Coord, LineString, MultiPolygon, Polygon};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{Cost, Error};

/// Contouring strategy producing the polygons of one cost threshold
pub trait IsolineBuilder {
    /// Polygons bounding the region with cost <= `threshold`; empty when
    /// nothing is reachable at that threshold
    fn compute_isoline(&self, threshold: Cost) -> MultiPolygon<f64>;
}

/// Strategy selector; the recursive grid is the default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IsolineMethod {
    #[default]
    RecursiveGrid,
    Tin,
}

impl FromStr for IsolineMethod {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        match name.to_ascii_lowercase().as_str() {
            "recursivegrid" => Ok(Self::RecursiveGrid),
            "tin" => Ok(Self::Tin),
            _ => Err(Error::UnknownMethod(name.to_string())),
        }
    }
}

/// One interpolated boundary segment emitted by a marching-squares cell
pub(crate) type Segment = [Coord<f64>; 2];

// Endpoint snapping scale for ring assembly, about 1e-9 degrees
const SNAP_SCALE: f64 = 1e9;

fn snap_key(c: &Coord<f64>) -> (i64, i64) {
    (
        (c.x * SNAP_SCALE).round() as i64,
        (c.y * SNAP_SCALE).round() as i64,
    )
}

/// Connect loose boundary segments into closed rings and wrap each ring as
/// a polygon, largest first.
///
/// Chains that stop advancing are force-closed back to their start; ring
/// candidates that collapse below a triangle are dropped. Geometric
/// degeneracies are recovered locally, never escalated to the caller.
pub(crate) fn assemble_polygons(segments: &[Segment]) -> MultiPolygon<f64> {
    let mut by_endpoint: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, segment) in segments.iter().enumerate() {
        by_endpoint.entry(snap_key(&segment[0])).or_default().push(i);
        by_endpoint.entry(snap_key(&segment[1])).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut polygons: Vec<Polygon<f64>> = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let mut ring = vec![segments[start][0], segments[start][1]];
        let ring_start = snap_key(&segments[start][0]);
        let mut cursor = snap_key(&segments[start][1]);

        while cursor != ring_start {
            let Some(candidates) = by_endpoint.get(&cursor) else {
                break;
            };
            let mut advanced = false;
            for &next in candidates {
                if used[next] {
                    continue;
                }
                let segment = &segments[next];
                let head = if snap_key(&segment[0]) == cursor {
                    segment[1]
                } else if snap_key(&segment[1]) == cursor {
                    segment[0]
                } else {
                    continue;
                };
                used[next] = true;
                cursor = snap_key(&head);
                ring.push(head);
                advanced = true;
                break;
            }
            if !advanced {
                break;
            }
        }

        if let Some(polygon) = close_ring(ring) {
            polygons.push(polygon);
        }
    }

    polygons.sort_by(|a, b| b.unsigned_area().total_cmp(&a.unsigned_area()));
    MultiPolygon::new(polygons)
}

fn close_ring(mut ring: Vec<Coord<f64>>) -> Option<Polygon<f64>> {
    ring.dedup_by(|a, b| snap_key(a) == snap_key(b));

    let mut distinct = ring.len();
    if distinct > 1 && snap_key(&ring[0]) == snap_key(&ring[distinct - 1]) {
        distinct -= 1;
    }
    if distinct < 3 {
        return None;
    }

    if ring.first() != ring.last() {
        ring.push(ring[0]);
    }
    let polygon = Polygon::new(LineString::from(ring), vec![]);
    (polygon.unsigned_area() > 0.0).then_some(polygon)
}
