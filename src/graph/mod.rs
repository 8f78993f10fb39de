//! Area adjacency. Recomputed from outlines after every split or merge.
mod adjacency;
mod graph;

pub use graph::AdjacencyGraph;
