//! Isochrone result entities

use std::f64::consts::PI;

use geo::{Area, BoundingRect, Coord, Point, Polygon, Rect};
use hashbrown::HashMap;

use crate::{Cost, METERS_PER_DEGREE};

/// Single reachable-area polygon at one cost threshold.
///
/// Immutable after construction apart from the optional derived attributes
/// (reach factor, named attribute values) the caller may attach.
#[derive(Debug, Clone)]
pub struct Isochrone {
    geometry: Polygon<f64>,
    value: Cost,
    area: f64,
    reach_factor: Option<f64>,
    attributes: HashMap<String, f64>,
}

impl Isochrone {
    pub fn new(geometry: Polygon<f64>, value: Cost) -> Self {
        let area = approximate_area_m2(&geometry);
        Self {
            geometry,
            value,
            area,
            reach_factor: None,
            attributes: HashMap::new(),
        }
    }

    pub fn geometry(&self) -> &Polygon<f64> {
        &self.geometry
    }

    /// Cost threshold this polygon represents
    pub fn value(&self) -> Cost {
        self.value
    }

    /// Approximate polygon area in square meters
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Derive the reach factor: the share of the full circle of `radius`
    /// meters covered by this isochrone. The radius is profile knowledge
    /// (budget times speed for time-based costs), so the caller supplies it.
    pub fn compute_reach_factor(&mut self, radius: f64) {
        if radius > 0.0 {
            self.reach_factor = Some(self.area / (PI * radius * radius));
        }
    }

    pub fn reach_factor(&self) -> Option<f64> {
        self.reach_factor
    }

    /// Attach a named attribute value (e.g. population within the polygon)
    pub fn set_attribute(&mut self, name: &str, value: f64) {
        self.attributes.insert(name.to_string(), value);
    }

    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).copied()
    }

    pub fn attributes(&self) -> &HashMap<String, f64> {
        &self.attributes
    }

    pub fn envelope(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }
}

/// Ordered collection of isochrones for one location.
///
/// Isochrones are appended in ascending threshold order; the bounding
/// envelope grows to the union of all contained isochrone envelopes.
#[derive(Debug, Clone)]
pub struct IsochroneMap {
    traveller_id: u32,
    center: Point<f64>,
    envelope: Option<Rect<f64>>,
    isochrones: Vec<Isochrone>,
}

impl IsochroneMap {
    pub fn new(traveller_id: u32, center: Point<f64>) -> Self {
        Self {
            traveller_id,
            center,
            envelope: None,
            isochrones: Vec::new(),
        }
    }

    pub fn add_isochrone(&mut self, isochrone: Isochrone) {
        if let Some(envelope) = isochrone.envelope() {
            self.envelope = Some(match self.envelope {
                Some(current) => union_rect(current, envelope),
                None => envelope,
            });
        }
        self.isochrones.push(isochrone);
    }

    pub fn isochrones(&self) -> &[Isochrone] {
        &self.isochrones
    }

    pub fn isochrones_mut(&mut self) -> &mut [Isochrone] {
        &mut self.isochrones
    }

    pub fn is_empty(&self) -> bool {
        self.isochrones.is_empty()
    }

    pub fn len(&self) -> usize {
        self.isochrones.len()
    }

    pub fn traveller_id(&self) -> u32 {
        self.traveller_id
    }

    pub fn center(&self) -> Point<f64> {
        self.center
    }

    pub fn envelope(&self) -> Option<Rect<f64>> {
        self.envelope
    }
}

/// Planar area scaled by the local meters-per-degree factors. Good enough
/// for attribute reporting at city scale; keeps the geometry stack planar.
fn approximate_area_m2(polygon: &Polygon<f64>) -> f64 {
    let Some(rect) = polygon.bounding_rect() else {
        return 0.0;
    };
    let lat = rect.center().y.to_radians();
    polygon.unsigned_area() * METERS_PER_DEGREE * METERS_PER_DEGREE * lat.cos()
}

fn union_rect(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}
