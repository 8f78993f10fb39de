mod aoi;
mod dissolve;
mod nearest;
mod sites;
mod thiessen;

pub use aoi::features_to_aoi;
pub use dissolve::{build_area_polygons, clip, dissolve, dissolve_outlines};
pub use nearest::{average_nearest_neighbor, neighbor_distances};
pub use sites::dedup_sites;
pub use thiessen::thiessen;
