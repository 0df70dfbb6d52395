pub mod bounded;
mod state;

pub use bounded::{ShortestPathTree, TreeRecord, bounded_dijkstra};
