//! External collaborators: location-allocation and routing.
//!
//! The pipeline only sees the [`LocationAllocator`] and [`RouteSolver`] traits.
//! The straight-line implementations make the crate usable without a road network.
mod allocation;
mod options;
mod partition_solver;
mod route;
mod straight_line;

pub use allocation::{Allocation, AllocationProblem, LocationAllocator};
pub use options::{ProblemMode, SolverOptions};
pub use partition_solver::{PartitionSolver, SolveResult};
pub use route::{RouteCost, RouteSolver, StraightLineRouter};
pub use straight_line::StraightLineAllocator;
