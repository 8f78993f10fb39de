//! Dataset I/O: points CSV in and out, area outlines as GeoJSON.
//!
//! Configuration files are read by [`crate::PlanConfig::read_from_file`].
mod csv;
mod fs;
mod geojson;

pub use csv::{read_points, read_points_str, write_points, write_points_string};
pub use fs::ensure_dir_exists;
pub use geojson::{areas_to_geojson, write_areas};
