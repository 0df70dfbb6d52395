//! Recursive adaptive grid contouring (marching squares)

use geo::{Coord, MultiPolygon, Point};
use hashbrown::HashMap;
use itertools::iproduct;

use super::{IsolineBuilder, Segment, assemble_polygons};
use crate::algo::isochrone::cost_field::CostField;
use crate::algo::isochrone::edge_buffer::SamplePoint;
use crate::{Cost, METERS_PER_DEGREE};

/// Levels of subdivision between the coarse probe cells and the resolution
/// floor; a coarse cell spans 2^GRID_LEVELS finest cells.
const GRID_LEVELS: u32 = 3;

#[derive(Debug, Clone, Copy)]
struct Cell {
    i: i64,
    j: i64,
    span: i64,
}

/// Contours the cost field on a local grid anchored at the isochrone
/// center.
///
/// Coarse cells whose four corners agree (all inside, all outside or all
/// unreachable) are resolved directly; mixed cells subdivide down to the
/// resolution floor and then emit marching-squares segments, interpolated
/// linearly between the corner samples. Subdivision runs on an explicit
/// work stack. All corners lie on the finest lattice, so shared corners
/// are sampled once and reused across levels.
pub struct GridIsolineBuilder<'a> {
    field: &'a CostField<'a>,
    seeds: &'a [SamplePoint],
    origin: Coord<f64>,
    /// Finest cell extent in degrees
    cell_dx: f64,
    cell_dy: f64,
}

impl<'a> GridIsolineBuilder<'a> {
    /// `resolution` is the ground size of the finest grid cell in meters,
    /// converted to degrees at the center latitude; the longitude scale is
    /// corrected by cos(latitude) against projection distortion.
    pub fn new(
        field: &'a CostField<'a>,
        seeds: &'a [SamplePoint],
        center: Point<f64>,
        resolution: f64,
    ) -> Self {
        let cell_dy = resolution / METERS_PER_DEGREE;
        // degenerate only at the poles
        let cos_lat = center.y().to_radians().cos().max(1e-6);
        Self {
            field,
            seeds,
            origin: center.into(),
            cell_dx: cell_dy / cos_lat,
            cell_dy,
        }
    }

    fn march(
        &self,
        sampler: &mut CornerSampler<'_>,
        i: i64,
        j: i64,
        threshold: Cost,
        segments: &mut Vec<Segment>,
    ) {
        // corners counterclockwise from the bottom-left
        let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
        let positions = corners.map(|(ci, cj)| sampler.position(ci, cj));
        let values = corners.map(|(ci, cj)| sampler.sample(ci, cj));

        let mut mask = 0usize;
        for (bit, value) in values.iter().enumerate() {
            if is_inside(*value, threshold) {
                mask |= 1 << bit;
            }
        }

        // crossing point on the cell edge between corners a and b
        let cross = |a: usize, b: usize| -> Coord<f64> {
            crossing(positions[a], values[a], positions[b], values[b], threshold)
        };

        // edges: bottom (0-1), right (1-2), top (2-3), left (3-0)
        match mask {
            0 | 15 => {}
            1 => segments.push([cross(0, 3), cross(0, 1)]),
            2 => segments.push([cross(0, 1), cross(1, 2)]),
            3 => segments.push([cross(0, 3), cross(1, 2)]),
            4 => segments.push([cross(1, 2), cross(2, 3)]),
            6 => segments.push([cross(0, 1), cross(2, 3)]),
            7 => segments.push([cross(0, 3), cross(2, 3)]),
            8 => segments.push([cross(2, 3), cross(0, 3)]),
            9 => segments.push([cross(0, 1), cross(2, 3)]),
            11 => segments.push([cross(1, 2), cross(2, 3)]),
            12 => segments.push([cross(0, 3), cross(1, 2)]),
            13 => segments.push([cross(0, 1), cross(1, 2)]),
            14 => segments.push([cross(0, 3), cross(0, 1)]),
            // saddles: the center sample decides how the diagonal pairs connect
            5 | 10 => {
                let center = Coord {
                    x: self.origin.x + (i as f64 + 0.5) * self.cell_dx,
                    y: self.origin.y + (j as f64 + 0.5) * self.cell_dy,
                };
                let center_inside = is_inside(self.field.sample(center.x, center.y), threshold);
                let band = (mask == 5) == center_inside;
                if band {
                    segments.push([cross(0, 1), cross(1, 2)]);
                    segments.push([cross(2, 3), cross(0, 3)]);
                } else {
                    segments.push([cross(0, 3), cross(0, 1)]);
                    segments.push([cross(1, 2), cross(2, 3)]);
                }
            }
            _ => unreachable!("4-bit corner mask"),
        }
    }
}

impl IsolineBuilder for GridIsolineBuilder<'_> {
    fn compute_isoline(&self, threshold: Cost) -> MultiPolygon<f64> {
        if self.seeds.is_empty() {
            return MultiPolygon::new(Vec::new());
        }

        let span = 1i64 << GRID_LEVELS;
        let coarse_dx = self.cell_dx * span as f64;
        let coarse_dy = self.cell_dy * span as f64;

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for seed in self.seeds {
            min_x = min_x.min(seed.position.x);
            min_y = min_y.min(seed.position.y);
            max_x = max_x.max(seed.position.x);
            max_y = max_y.max(seed.position.y);
        }

        // pad one coarse cell outward so boundary rings close around the
        // outermost edge buffers
        let min_i = ((min_x - self.origin.x) / coarse_dx).floor() as i64 - 1;
        let max_i = ((max_x - self.origin.x) / coarse_dx).ceil() as i64 + 1;
        let min_j = ((min_y - self.origin.y) / coarse_dy).floor() as i64 - 1;
        let max_j = ((max_y - self.origin.y) / coarse_dy).ceil() as i64 + 1;

        let mut sampler = CornerSampler::new(self.field, self.origin, self.cell_dx, self.cell_dy);
        let mut segments: Vec<Segment> = Vec::new();
        let mut stack: Vec<Cell> = Vec::new();
        for (ci, cj) in iproduct!(min_i..max_i, min_j..max_j) {
            stack.push(Cell {
                i: ci * span,
                j: cj * span,
                span,
            });
        }

        while let Some(cell) = stack.pop() {
            let inside = [
                (cell.i, cell.j),
                (cell.i + cell.span, cell.j),
                (cell.i + cell.span, cell.j + cell.span),
                (cell.i, cell.j + cell.span),
            ]
            .into_iter()
            .filter(|&(ci, cj)| sampler.classify(ci, cj, threshold))
            .count();

            // uniform corners resolve the cell at any level
            if inside == 0 || inside == 4 {
                continue;
            }

            if cell.span > 1 {
                let half = cell.span / 2;
                for (di, dj) in [(0, 0), (half, 0), (0, half), (half, half)] {
                    stack.push(Cell {
                        i: cell.i + di,
                        j: cell.j + dj,
                        span: half,
                    });
                }
                continue;
            }

            self.march(&mut sampler, cell.i, cell.j, threshold, &mut segments);
        }

        assemble_polygons(&segments)
    }
}

fn is_inside(value: Option<Cost>, threshold: Cost) -> bool {
    // ties count as inside so boundaries stay closed and non-degenerate
    matches!(value, Some(cost) if cost <= threshold)
}

fn crossing(
    pa: Coord<f64>,
    va: Option<Cost>,
    pb: Coord<f64>,
    vb: Option<Cost>,
    threshold: Cost,
) -> Coord<f64> {
    let t = match (va, vb) {
        // an unreachable corner offers no value to interpolate against;
        // the midpoint keeps the crossing local and deterministic
        (Some(a), Some(b)) if (b - a).abs() > f64::EPSILON => {
            ((threshold - a) / (b - a)).clamp(0.0, 1.0)
        }
        _ => 0.5,
    };
    Coord {
        x: pa.x + t * (pb.x - pa.x),
        y: pa.y + t * (pb.y - pa.y),
    }
}

/// Memoizing corner sampler on the finest grid lattice
struct CornerSampler<'a> {
    field: &'a CostField<'a>,
    origin: Coord<f64>,
    dx: f64,
    dy: f64,
    cache: HashMap<(i64, i64), Option<Cost>>,
}

impl<'a> CornerSampler<'a> {
    fn new(field: &'a CostField<'a>, origin: Coord<f64>, dx: f64, dy: f64) -> Self {
        Self {
            field,
            origin,
            dx,
            dy,
            cache: HashMap::new(),
        }
    }

    fn position(&self, i: i64, j: i64) -> Coord<f64> {
        Coord {
            x: self.origin.x + i as f64 * self.dx,
            y: self.origin.y + j as f64 * self.dy,
        }
    }

    fn sample(&mut self, i: i64, j: i64) -> Option<Cost> {
        if let Some(cached) = self.cache.get(&(i, j)) {
            return *cached;
        }
        let position = self.position(i, j);
        let value = self.field.sample(position.x, position.y);
        self.cache.insert((i, j), value);
        value
    }

    fn classify(&mut self, i: i64, j: i64, threshold: Cost) -> bool {
        is_inside(self.sample(i, j), threshold)
    }
}
