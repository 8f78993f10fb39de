use geo::Coord;

use crate::{error::Result, solver::SolverOptions, types::DemandPoint};

/// Inputs to a location-allocation solve.
#[derive(Debug, Clone, Copy)]
pub struct AllocationProblem<'a> {
    /// Candidate facility sites.
    pub facilities: &'a [Coord<f64>],
    pub demand: &'a [DemandPoint],
}

/// Native output of a location-allocation solve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocation {
    /// Facility index (into `AllocationProblem::facilities`) per demand point, `None` if unallocated.
    pub assignment: Vec<Option<usize>>,
    pub messages: Vec<String>,
}

/// A location-allocation service: chooses `facility_count` of the candidate sites and
/// assigns every demand point to one of them.
///
/// Implementations must be reentrant; the splitter solves several areas at once.
pub trait LocationAllocator: Send + Sync {
    /// Fails with [`crate::Error::SolverFailure`] carrying the solver's own messages.
    fn solve(&self, problem: &AllocationProblem<'_>, options: &SolverOptions) -> Result<Allocation>;
}

impl<T: LocationAllocator + ?Sized> LocationAllocator for &T {
    fn solve(&self, problem: &AllocationProblem<'_>, options: &SolverOptions) -> Result<Allocation> {
        (**self).solve(problem, options)
    }
}
