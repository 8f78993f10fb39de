use std::collections::BTreeMap;

use geo::Coord;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    solver::{AllocationProblem, LocationAllocator, ProblemMode, SolverOptions},
    types::{AreaId, DemandPoint, PointId},
};

/// Outcome of one partition solve. Never persisted past its consumer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveResult {
    pub success: bool,
    /// Area per allocated demand point; areas are named after their facility index.
    pub assignment: BTreeMap<PointId, AreaId>,
    /// Demand the solver could not place (capacity or cutoff).
    pub unallocated: Vec<PointId>,
    /// Chosen facility location per area.
    pub facilities: BTreeMap<AreaId, Coord<f64>>,
    pub messages: Vec<String>,
}

impl SolveResult {
    fn failure(messages: Vec<String>) -> Self {
        Self { success: false, messages, ..Default::default() }
    }

    /// Give every unallocated point to the nearest chosen facility so the result
    /// covers all of `demand`. Fails if no facility was chosen at all.
    pub fn attach_unallocated(&mut self, demand: &[DemandPoint]) -> Result<usize> {
        if self.unallocated.is_empty() { return Ok(0) }
        if self.facilities.is_empty() {
            return Err(Error::solver(["no facility was allocated any demand"]))
        }

        let pending = std::mem::take(&mut self.unallocated).into_iter().collect::<ahash::AHashSet<_>>();
        let mut attached = 0;
        for point in demand.iter().filter(|p| pending.contains(&p.id)) {
            let nearest = self.facilities.iter()
                .min_by(|(_, a), (_, b)| {
                    let da = (a.x - point.location.x).hypot(a.y - point.location.y);
                    let db = (b.x - point.location.x).hypot(b.y - point.location.y);
                    da.total_cmp(&db)
                })
                .map(|(area, _)| area.clone());
            if let Some(area) = nearest {
                self.assignment.insert(point.id.clone(), area);
                attached += 1;
            }
        }
        Ok(attached)
    }

    /// Convert a failed solve into [`Error::SolverFailure`].
    pub fn into_result(self) -> Result<Self> {
        if self.success { Ok(self) } else { Err(Error::SolverFailure { messages: self.messages }) }
    }
}

/// Thin adapter over a [`LocationAllocator`]: marshals demand and sites in,
/// names areas after the facilities they were allocated to, and surfaces failure.
#[derive(Debug, Clone)]
pub struct PartitionSolver<A> {
    allocator: A,
    base: SolverOptions,
}

impl<A: LocationAllocator> PartitionSolver<A> {
    /// `base` supplies the travel speed and impedance cutoff used by every solve.
    pub fn new(allocator: A, base: SolverOptions) -> Self {
        Self { allocator, base }
    }

    #[inline] pub fn allocator(&self) -> &A { &self.allocator }

    /// Assign each demand point to one of `target_areas` facilities chosen from `sites`.
    /// `capacity` is required for [`ProblemMode::MaximizeCapacitatedCoverage`].
    pub fn solve(
        &self,
        demand: &[DemandPoint],
        sites: &[Coord<f64>],
        target_areas: usize,
        mode: ProblemMode,
        capacity: Option<usize>,
    ) -> SolveResult {
        let options = match (mode, capacity) {
            (ProblemMode::MinimizeTotalImpedance, _) => SolverOptions {
                mode,
                capacity: None,
                ..self.base.clone().with_facility_count(target_areas)
            },
            (ProblemMode::MaximizeCapacitatedCoverage, Some(capacity)) if capacity > 0 => {
                self.base.clone().with_facility_count(target_areas).with_capacity(capacity)
            }
            (ProblemMode::MaximizeCapacitatedCoverage, _) => {
                return SolveResult::failure(vec!["capacitated coverage requires a positive capacity".into()])
            }
        };

        debug!(
            "[solve] {} demand points, {} candidate sites, {} facilities, {:?}",
            demand.len(), sites.len(), target_areas, mode
        );

        let problem = AllocationProblem { facilities: sites, demand };
        let allocation = match self.allocator.solve(&problem, &options) {
            Ok(allocation) => allocation,
            Err(Error::SolverFailure { messages }) => return SolveResult::failure(messages),
            Err(other) => return SolveResult::failure(vec![other.to_string()]),
        };

        if allocation.assignment.len() != demand.len() {
            return SolveResult::failure(vec![format!(
                "solver returned {} assignments for {} demand points",
                allocation.assignment.len(), demand.len()
            )])
        }

        let mut result = SolveResult { success: true, messages: allocation.messages, ..Default::default() };
        for (point, facility) in demand.iter().zip(allocation.assignment) {
            match facility {
                Some(index) if index < sites.len() => {
                    let area = AreaId::from_facility(index);
                    result.facilities.entry(area.clone()).or_insert(sites[index]);
                    result.assignment.insert(point.id.clone(), area);
                }
                Some(index) => {
                    return SolveResult::failure(vec![format!("solver returned unknown facility {index}")])
                }
                None => result.unallocated.push(point.id.clone()),
            }
        }

        if !result.unallocated.is_empty() {
            warn!("[solve] {} demand points left unallocated", result.unallocated.len());
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{Allocation, StraightLineAllocator};

    struct Failing;

    impl LocationAllocator for Failing {
        fn solve(&self, _: &AllocationProblem<'_>, _: &SolverOptions) -> Result<Allocation> {
            Err(Error::solver(["no network dataset"]))
        }
    }

    fn line(n: usize) -> Vec<DemandPoint> {
        (0..n).map(|i| DemandPoint::new(format!("p{i}").as_str(), i as f64 * 10.0, 0.0)).collect()
    }

    #[test]
    fn names_areas_after_facilities() {
        let demand = line(4);
        let sites = vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 30.0, y: 0.0 }];
        let solver = PartitionSolver::new(StraightLineAllocator::default(), SolverOptions::new(1, 1.0));
        let result = solver.solve(&demand, &sites, 2, ProblemMode::MinimizeTotalImpedance, None);

        assert!(result.success);
        assert_eq!(result.assignment[&PointId::new("p0")], AreaId::new("0"));
        assert_eq!(result.assignment[&PointId::new("p3")], AreaId::new("1"));
        assert_eq!(result.facilities[&AreaId::new("1")], Coord { x: 30.0, y: 0.0 });
    }

    #[test]
    fn surfaces_native_messages_on_failure() {
        let solver = PartitionSolver::new(Failing, SolverOptions::new(1, 1.0));
        let result = solver.solve(&line(2), &[Coord { x: 0.0, y: 0.0 }], 1, ProblemMode::MinimizeTotalImpedance, None);

        assert!(!result.success);
        assert!(result.assignment.is_empty());
        assert_eq!(result.messages, vec!["no network dataset".to_string()]);
        assert!(matches!(result.into_result(), Err(Error::SolverFailure { .. })));
    }

    #[test]
    fn unallocated_demand_attaches_to_nearest_facility() {
        let demand = line(4);
        let sites = vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 30.0, y: 0.0 }];
        let solver = PartitionSolver::new(StraightLineAllocator::default(), SolverOptions::new(1, 1.0));
        let mut result = solver.solve(&demand, &sites, 2, ProblemMode::MaximizeCapacitatedCoverage, Some(1));

        assert!(result.success);
        assert_eq!(result.unallocated.len(), 2);
        assert_eq!(result.attach_unallocated(&demand), Ok(2));
        assert!(result.unallocated.is_empty());
        assert_eq!(result.assignment.len(), 4);
        assert_eq!(result.assignment[&PointId::new("p1")], AreaId::new("0"));
        assert_eq!(result.assignment[&PointId::new("p2")], AreaId::new("1"));
    }

    #[test]
    fn capacitated_mode_requires_capacity() {
        let solver = PartitionSolver::new(StraightLineAllocator::default(), SolverOptions::new(1, 1.0));
        let result = solver.solve(&line(2), &[Coord { x: 0.0, y: 0.0 }], 1, ProblemMode::MaximizeCapacitatedCoverage, None);
        assert!(!result.success);
    }
}
