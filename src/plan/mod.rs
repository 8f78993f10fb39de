//! The end-to-end area-planning pipeline.
mod pipeline;
mod plan;

pub use pipeline::create_areas;
pub use plan::{AreaPlan, PlanReport};
