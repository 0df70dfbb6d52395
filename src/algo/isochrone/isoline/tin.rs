//! Triangulation-based contouring
//!
//! Triangulates the settled-node sample points and extracts, per triangle,
//! the region below the cost threshold: whole triangles when all three
//! vertices are inside, clipped pieces (linear interpolation along the
//! crossing edges) when the classification is mixed. The pieces are
//! unioned into the isoline polygons.

use delaunator::{Point as TinPoint, triangulate};
use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use hashbrown::HashSet;

use super::IsolineBuilder;
use crate::Cost;
use crate::algo::isochrone::edge_buffer::SamplePoint;

// Coincident vertices break the triangulation; merge anything closer than
// about 1e-9 degrees (first cost wins)
const DEDUP_SCALE: f64 = 1e9;

pub struct TinIsolineBuilder {
    points: Vec<SamplePoint>,
}

impl TinIsolineBuilder {
    pub fn new(seeds: &[SamplePoint]) -> Self {
        let mut seen: HashSet<(i64, i64)> = HashSet::with_capacity(seeds.len());
        let points = seeds
            .iter()
            .filter(|seed| {
                seen.insert((
                    (seed.position.x * DEDUP_SCALE).round() as i64,
                    (seed.position.y * DEDUP_SCALE).round() as i64,
                ))
            })
            .copied()
            .collect();
        Self { points }
    }
}

impl IsolineBuilder for TinIsolineBuilder {
    fn compute_isoline(&self, threshold: Cost) -> MultiPolygon<f64> {
        if self.points.len() < 3 {
            return MultiPolygon::new(Vec::new());
        }

        let vertices: Vec<TinPoint> = self
            .points
            .iter()
            .map(|p| TinPoint {
                x: p.position.x,
                y: p.position.y,
            })
            .collect();
        let triangulation = triangulate(&vertices);

        let mut pieces: Vec<Polygon<f64>> = Vec::new();
        for triangle in triangulation.triangles.chunks(3) {
            let piece = clip_triangle(
                &self.points[triangle[0]],
                &self.points[triangle[1]],
                &self.points[triangle[2]],
                threshold,
            );
            if let Some(polygon) = piece {
                pieces.push(polygon);
            }
        }

        union_pieces(pieces)
    }
}

/// Region of the triangle with cost <= `threshold`: the whole triangle, a
/// corner triangle, a quad, or nothing. Zero-area leftovers are dropped.
fn clip_triangle(
    a: &SamplePoint,
    b: &SamplePoint,
    c: &SamplePoint,
    threshold: Cost,
) -> Option<Polygon<f64>> {
    let vertices = [a, b, c];
    let inside = vertices.map(|v| v.cost <= threshold);

    if !inside.iter().any(|&i| i) {
        return None;
    }

    let mut ring: Vec<Coord<f64>> = Vec::with_capacity(5);
    for i in 0..3 {
        let j = (i + 1) % 3;
        if inside[i] {
            ring.push(vertices[i].position);
        }
        if inside[i] != inside[j] {
            ring.push(crossing(vertices[i], vertices[j], threshold));
        }
    }

    if ring.len() < 3 {
        return None;
    }
    ring.push(ring[0]);
    let polygon = Polygon::new(LineString::from(ring), vec![]);
    (polygon.unsigned_area() > 0.0).then_some(polygon)
}

fn crossing(from: &SamplePoint, to: &SamplePoint, threshold: Cost) -> Coord<f64> {
    let span = to.cost - from.cost;
    let t = if span.abs() < f64::EPSILON {
        0.5
    } else {
        ((threshold - from.cost) / span).clamp(0.0, 1.0)
    };
    Coord {
        x: from.position.x + t * (to.position.x - from.position.x),
        y: from.position.y + t * (to.position.y - from.position.y),
    }
}

/// Balanced pairwise union; triangle counts per request stay modest
fn union_pieces(pieces: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    let mut layers: Vec<MultiPolygon<f64>> = pieces
        .into_iter()
        .map(|polygon| MultiPolygon::new(vec![polygon]))
        .collect();

    while layers.len() > 1 {
        layers = layers
            .chunks(2)
            .map(|pair| match pair {
                [a, b] => a.union(b),
                [single] => single.clone(),
                _ => unreachable!(),
            })
            .collect();
    }

    match layers.pop() {
        Some(result) => result,
        None => MultiPolygon::new(Vec::new()),
    }
}
