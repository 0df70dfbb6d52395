//! Cost-bounded shortest-path tree construction

use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::state::State;
use crate::Cost;
use crate::model::{EdgeFilter, RoadGraph};

/// Record of one settled node in the shortest-path tree
#[derive(Debug, Clone, Copy)]
pub struct TreeRecord {
    /// Cumulative cost from the source
    pub cost: Cost,
    /// Predecessor node and the edge it was reached over; `None` at the source
    pub parent: Option<(NodeIndex, EdgeIndex)>,
}

/// Sparse cost-bounded shortest-path tree: one record per settled node.
///
/// The source maps to cost 0 and no predecessor; every other record's cost
/// equals its predecessor's cost plus the connecting edge weight.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source: NodeIndex,
    records: HashMap<NodeIndex, TreeRecord>,
}

impl ShortestPathTree {
    pub fn source(&self) -> NodeIndex {
        self.source
    }

    pub fn record(&self, node: NodeIndex) -> Option<&TreeRecord> {
        self.records.get(&node)
    }

    pub fn cost(&self, node: NodeIndex) -> Option<Cost> {
        self.records.get(&node).map(|record| record.cost)
    }

    /// Settled nodes with their records, unordered
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &TreeRecord)> {
        self.records.iter().map(|(node, record)| (*node, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing beyond the source was reached
    pub fn is_empty(&self) -> bool {
        self.records.len() <= 1
    }
}

/// Dijkstra's algorithm from `source`, expanding while the minimum frontier
/// cost stays within `budget`.
///
/// Node-based: each node is settled at most once, so the tree carries one
/// final cost per node (the isoline builders rely on that). Edges rejected
/// by `filter` are never relaxed. The graph is only read.
pub fn bounded_dijkstra(
    graph: &RoadGraph,
    source: NodeIndex,
    budget: Cost,
    filter: &dyn EdgeFilter,
) -> ShortestPathTree {
    let estimated = graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, Cost> = HashMap::with_capacity(estimated);
    let mut parents: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> =
        HashMap::with_capacity(estimated);
    let mut settled = FixedBitSet::with_capacity(graph.node_count());
    let mut heap = BinaryHeap::with_capacity(estimated / 4);

    heap.push(State {
        cost: 0.0,
        node: source,
    });
    distances.insert(source, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        // The frontier minimum left the budget; costs only grow from here
        if cost > budget {
            break;
        }

        // Skip stale heap entries for already-settled nodes
        if settled.put(node.index()) {
            continue;
        }

        for edge in graph.edges(node) {
            if !filter.accept(edge.weight()) {
                continue;
            }

            let next = edge.target();
            let next_cost = cost + edge.weight().weight;

            // Add or update distance if better using Entry API
            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    parents.insert(next, (node, edge.id()));
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        parents.insert(next, (node, edge.id()));
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    // Only settled nodes enter the tree; frontier residue beyond the budget
    // carries no final cost
    let mut records = HashMap::with_capacity(distances.len());
    for (node, cost) in distances {
        if !settled.contains(node.index()) {
            continue;
        }
        records.insert(
            node,
            TreeRecord {
                cost,
                parent: parents.get(&node).copied(),
            },
        );
    }

    ShortestPathTree { source, records }
}
