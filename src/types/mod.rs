mod area;
mod area_id;
mod point;

pub use area::{Area, AreaStats};
pub use area_id::AreaId;
pub use point::{DemandPoint, PointId};
