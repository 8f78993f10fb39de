//! Geometry services: facility dedup, area of interest, tessellation, dissolve, clip.
mod algorithm;
mod geom;

pub use algorithm::*;
pub use geom::AreaShapes;
