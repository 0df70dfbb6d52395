//! Spatial index over traversed edge geometry
//!
//! Draining the shortest-path tree yields one buffer per tree edge: the
//! full polyline of the original road segment tagged with the cumulative
//! cost at its tail and head. The isoline builders query these buffers
//! through an R-tree and seed themselves from the settled-node points.

use geo::{BoundingRect, Coord, LineString};
use rstar::{AABB, RTree, RTreeObject};

use crate::Cost;
use crate::model::RoadGraph;
use crate::routing::ShortestPathTree;

/// Geometry of one traversed edge with the cost interval spanned across it
#[derive(Debug, Clone)]
pub struct EdgeBuffer {
    /// Polyline in traversal direction
    pub geometry: LineString<f64>,
    /// Cumulative cost at the tail node; never exceeds `head_cost`
    pub tail_cost: Cost,
    /// Cumulative cost at the head node
    pub head_cost: Cost,
}

/// Settled-node coordinate with its cumulative cost; seeds the isoline
/// builders (triangulation vertices, grid extent)
#[derive(Debug, Clone, Copy)]
pub struct SamplePoint {
    pub position: Coord<f64>,
    pub cost: Cost,
}

#[derive(Debug, Clone)]
struct BufferEntry {
    envelope: AABB<[f64; 2]>,
    buffer: usize,
}

impl RTreeObject for BufferEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over the edge buffers of one request; built once, queried
/// read-only afterward
#[derive(Debug)]
pub struct EdgeBufferIndex {
    buffers: Vec<EdgeBuffer>,
    tree: RTree<BufferEntry>,
    seeds: Vec<SamplePoint>,
}

impl EdgeBufferIndex {
    /// Drain `tree` into an index over the original edge geometries.
    ///
    /// The source and any node without a resolvable predecessor edge are
    /// skipped; a record the graph no longer knows (filtered or decoupled
    /// nodes) is skipped too rather than failing the request.
    pub fn build(tree: &ShortestPathTree, graph: &RoadGraph) -> Self {
        let mut buffers = Vec::with_capacity(tree.len());
        let mut entries = Vec::with_capacity(tree.len());
        let mut seeds = Vec::with_capacity(tree.len());

        for (node, record) in tree.iter() {
            if let Some(position) = graph.node_point(node) {
                seeds.push(SamplePoint {
                    position: position.into(),
                    cost: record.cost,
                });
            }

            let Some((parent, edge)) = record.parent else {
                continue;
            };
            let (Some(road_edge), Some(parent_record)) =
                (graph.graph.edge_weight(edge), tree.record(parent))
            else {
                continue;
            };

            let mut geometry = road_edge.geometry.clone();
            if geometry.0.len() < 2 {
                continue;
            }
            // Orient tail -> head in traversal direction; callers may store
            // shared polylines against the digitized direction
            if let Some(parent_point) = graph.node_point(parent) {
                let start: Coord<f64> = geometry.0[0];
                let end: Coord<f64> = geometry.0[geometry.0.len() - 1];
                let from: Coord<f64> = parent_point.into();
                if squared(end, from) < squared(start, from) {
                    geometry.0.reverse();
                }
            }

            let Some(rect) = geometry.bounding_rect() else {
                continue;
            };
            let envelope = AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            );

            debug_assert!(parent_record.cost <= record.cost);
            entries.push(BufferEntry {
                envelope,
                buffer: buffers.len(),
            });
            buffers.push(EdgeBuffer {
                geometry,
                tail_cost: parent_record.cost,
                head_cost: record.cost,
            });
        }

        Self {
            buffers,
            tree: RTree::bulk_load(entries),
            seeds,
        }
    }

    /// All buffers whose envelope intersects the query envelope, unordered.
    /// The stored index accompanies each buffer so callers can break
    /// distance ties deterministically.
    pub fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = (usize, &EdgeBuffer)> {
        self.tree
            .locate_in_envelope_intersecting(envelope)
            .map(|entry| (entry.buffer, &self.buffers[entry.buffer]))
    }

    /// Settled-node sample points anchoring the isoline builders
    pub fn seed_points(&self) -> &[SamplePoint] {
        &self.seeds
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

fn squared(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}
