//! Graph search over the road network

pub mod dijkstra;

pub use dijkstra::{ShortestPathTree, TreeRecord, bounded_dijkstra};
