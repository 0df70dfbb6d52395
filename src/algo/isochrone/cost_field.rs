//! Scalar cost sampling over the edge-buffer index

use geo::{Distance, Euclidean, LineLocatePoint, Point};
use rstar::AABB;

use super::edge_buffer::{EdgeBuffer, EdgeBufferIndex};
use crate::Cost;

/// Estimates travel cost at arbitrary map coordinates.
///
/// A sample queries the buffers around the point, picks the nearest
/// polyline and interpolates between its tail and head cost by the
/// projected fraction of arc length. Sampling is pure: identical inputs
/// yield identical results, which the grid refinement relies on when it
/// revisits shared cell corners.
pub struct CostField<'a> {
    index: &'a EdgeBufferIndex,
    /// Search radius in degrees around the query point
    search_radius: f64,
}

impl<'a> CostField<'a> {
    pub fn new(index: &'a EdgeBufferIndex, search_radius: f64) -> Self {
        Self {
            index,
            search_radius,
        }
    }

    pub fn search_radius(&self) -> f64 {
        self.search_radius
    }

    /// Estimated cost at the coordinate, or `None` when no edge buffer
    /// lies within the search radius
    pub fn sample(&self, x: f64, y: f64) -> Option<Cost> {
        let point = Point::new(x, y);
        let envelope = AABB::from_corners(
            [x - self.search_radius, y - self.search_radius],
            [x + self.search_radius, y + self.search_radius],
        );

        // nearest buffer; the stored index breaks exact distance ties so
        // repeated samples always select the same buffer
        let mut nearest: Option<(f64, usize, &EdgeBuffer)> = None;
        for (idx, buffer) in self.index.query(&envelope) {
            let distance = Euclidean.distance(&point, &buffer.geometry);
            let closer = match nearest {
                Some((best, best_idx, _)) => {
                    distance < best || (distance == best && idx < best_idx)
                }
                None => true,
            };
            if closer {
                nearest = Some((distance, idx, buffer));
            }
        }

        let (distance, _, buffer) = nearest?;
        if distance > self.search_radius {
            return None;
        }

        let fraction = buffer
            .geometry
            .line_locate_point(&point)
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        Some(buffer.tail_cost + fraction * (buffer.head_cost - buffer.tail_cost))
    }
}
