#![doc = "Rodeplan public API"]
mod config;
mod error;
mod estimate;
mod geom;
mod graph;
mod partition;
mod plan;
mod solver;
mod stats;
mod types;

pub mod io;

#[doc(inline)]
pub use config::{
    AllocationConfig, EstimateConfig, FacilityConfig, GeometryConfig, MergeConfig, PlanConfig, SplitConfig,
    WeightConfig,
};

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use estimate::estimate_area_count;

#[doc(inline)]
pub use geom::{
    average_nearest_neighbor, build_area_polygons, clip, dedup_sites, dissolve, dissolve_outlines, features_to_aoi,
    neighbor_distances, thiessen, AreaShapes,
};

#[doc(inline)]
pub use graph::AdjacencyGraph;

#[doc(inline)]
pub use partition::{AreaMerger, AreaSplitter, MergeDecision, MergePlan, MergeRule, Partition, SplitOutcome, SplitReport};

#[doc(inline)]
pub use plan::{create_areas, AreaPlan, PlanReport};

#[doc(inline)]
pub use solver::{
    Allocation, AllocationProblem, LocationAllocator, PartitionSolver, ProblemMode, RouteCost, RouteSolver,
    SolveResult, SolverOptions, StraightLineAllocator, StraightLineRouter,
};

#[doc(inline)]
pub use stats::{collect as collect_stats, travel_weights};

#[doc(inline)]
pub use types::{Area, AreaId, AreaStats, DemandPoint, PointId};
