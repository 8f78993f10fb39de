use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    config::SplitConfig,
    error::{Error, Result},
    geom::dedup_sites,
    partition::Partition,
    solver::{LocationAllocator, PartitionSolver, ProblemMode},
    types::{AreaId, DemandPoint, PointId},
};

/// New labels for the points of one oversized area.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutcome {
    pub area: AreaId,
    pub assignment: BTreeMap<PointId, AreaId>,
}

impl SplitOutcome {
    /// Distinct sub-area ids, ascending.
    pub fn sub_areas(&self) -> Vec<AreaId> {
        let mut ids = self.assignment.values().cloned().collect::<Vec<_>>();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// What a split pass did: sub-areas per original area, and the areas left intact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitReport {
    pub split: BTreeMap<AreaId, Vec<AreaId>>,
    pub failed: BTreeMap<AreaId, Error>,
}

impl SplitReport {
    #[inline] pub fn is_noop(&self) -> bool { self.split.is_empty() && self.failed.is_empty() }
}

/// Subdivides areas whose point count exceeds the configured upper bound.
#[derive(Debug)]
pub struct AreaSplitter<'a, A> {
    solver: &'a PartitionSolver<A>,
    config: SplitConfig,
}

impl<'a, A: LocationAllocator> AreaSplitter<'a, A> {
    pub fn new(solver: &'a PartitionSolver<A>, config: SplitConfig) -> Self {
        Self { solver, config }
    }

    /// Areas with more than `upper_bound` points, ascending by id.
    pub fn oversized(&self, partition: &Partition) -> Vec<(AreaId, usize)> {
        partition.counts().into_iter()
            .filter(|&(_, count)| count > self.config.upper_bound)
            .collect()
    }

    /// Number of sub-areas for an area of `count` points.
    pub fn sub_area_count(&self, count: usize) -> usize {
        ((count as f64 / self.config.target_size as f64).round() as usize).max(1)
    }

    /// Re-partition the points of one area into sub-areas with fresh ids.
    /// Sites are the area's own distinct locations.
    pub fn split_area(&self, area: &AreaId, points: &[DemandPoint]) -> Result<SplitOutcome> {
        let sites = dedup_sites(points, 0.0);
        let target = self.sub_area_count(points.len());

        let mut result = self.solver
            .solve(points, &sites, target, ProblemMode::MinimizeTotalImpedance, None)
            .into_result()?;
        result.attach_unallocated(points)?;

        if result.assignment.len() != points.len() {
            return Err(Error::solver([format!(
                "split of area {area} assigned {} of {} points",
                result.assignment.len(), points.len()
            )]))
        }

        let mut children: BTreeMap<AreaId, AreaId> = BTreeMap::new();
        let assignment = result.assignment.into_iter()
            .map(|(point, facility)| {
                let child = children.entry(facility).or_insert_with(|| area.child()).clone();
                (point, child)
            })
            .collect();

        debug!("[split] area {} ({} points) -> {} sub-areas", area, points.len(), children.len());
        Ok(SplitOutcome { area: area.clone(), assignment })
    }

    /// Lazily split each oversized area in turn, in ascending id order.
    pub fn splits<'p>(&'p self, partition: &'p Partition) -> impl Iterator<Item = (AreaId, Result<SplitOutcome>)> + 'p {
        self.oversized(partition).into_iter().map(move |(area, _)| {
            let points = partition.points_in(&area);
            let outcome = self.split_area(&area, &points);
            (area, outcome)
        })
    }

    /// Split every oversized area on the rayon pool. Each solve sees a disjoint point set.
    pub fn split_parallel(&self, partition: &Partition) -> Vec<(AreaId, Result<SplitOutcome>)> {
        let jobs = self.oversized(partition).into_iter()
            .map(|(area, _)| {
                let points = partition.points_in(&area);
                (area, points)
            })
            .collect::<Vec<_>>();

        jobs.into_par_iter()
            .map(|(area, points)| {
                let outcome = self.split_area(&area, &points);
                (area, outcome)
            })
            .collect()
    }

    /// Apply split outcomes as one batch. Failed areas are reported and left intact.
    pub fn apply(
        partition: &mut Partition,
        outcomes: impl IntoIterator<Item = (AreaId, Result<SplitOutcome>)>,
    ) -> Result<SplitReport> {
        let mut report = SplitReport::default();
        for (area, outcome) in outcomes {
            match outcome {
                Ok(outcome) => {
                    partition.reassign(&outcome.assignment)?;
                    report.split.insert(area, outcome.sub_areas());
                }
                Err(err) => {
                    warn!("[split] area {} left unsplit: {}", area, err);
                    report.failed.insert(area, err);
                }
            }
        }
        Ok(report)
    }

    /// Split all oversized areas (in parallel) and apply the result.
    /// A no-op when no area exceeds the upper bound.
    pub fn split(&self, partition: &mut Partition) -> Result<SplitReport> {
        let outcomes = self.split_parallel(partition);
        let report = Self::apply(partition, outcomes)?;

        if !report.is_noop() {
            info!(
                "[split] {} areas split into {} sub-areas, {} failed",
                report.split.len(),
                report.split.values().map(Vec::len).sum::<usize>(),
                report.failed.len()
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{Allocation, AllocationProblem, SolverOptions, StraightLineAllocator};

    struct Failing;

    impl LocationAllocator for Failing {
        fn solve(&self, _: &AllocationProblem<'_>, _: &SolverOptions) -> Result<Allocation> {
            Err(Error::solver(["network unavailable"]))
        }
    }

    /// `n` points in a tight grid around (x, y).
    fn block(prefix: &str, n: usize, x: f64, y: f64) -> Vec<DemandPoint> {
        (0..n).map(|i| DemandPoint::new(
            format!("{prefix}{i}").as_str(),
            x + (i % 6) as f64 * 5.0,
            y + (i / 6) as f64 * 5.0,
        )).collect()
    }

    fn single_area(points: Vec<DemandPoint>, area: &str) -> Partition {
        let assignments = vec![AreaId::new(area); points.len()];
        Partition::new(points, assignments).unwrap()
    }

    fn config() -> SplitConfig { SplitConfig { upper_bound: 70, target_size: 40 } }

    #[test]
    fn oversized_area_splits_into_rounded_target() {
        let mut points = Vec::new();
        for (k, (x, y)) in [(0.0, 0.0), (2000.0, 0.0), (0.0, 2000.0), (2000.0, 2000.0)].into_iter().enumerate() {
            points.extend(block(&format!("q{k}_"), 35, x, y));
        }
        let mut partition = single_area(points, "7");

        let solver = PartitionSolver::new(StraightLineAllocator::default(), SolverOptions::new(1, 80.0));
        let splitter = AreaSplitter::new(&solver, config());
        let report = splitter.split(&mut partition).unwrap();

        let children = &report.split[&AreaId::new("7")];
        assert_eq!(children.len(), 4);
        assert!(children.iter().all(|c| c.descends_from(&AreaId::new("7"))));
        assert_eq!(partition.num_areas(), 4);
        assert_eq!(partition.counts().values().sum::<usize>(), 140);
    }

    #[test]
    fn split_ids_are_unique_across_areas() {
        let mut points = block("a", 80, 0.0, 0.0);
        points.extend(block("b", 80, 5000.0, 0.0));
        let mut assignments = vec![AreaId::new("1"); 80];
        assignments.extend(vec![AreaId::new("2"); 80]);
        let mut partition = Partition::new(points, assignments).unwrap();

        let solver = PartitionSolver::new(StraightLineAllocator::default(), SolverOptions::new(1, 80.0));
        let report = AreaSplitter::new(&solver, config()).split(&mut partition).unwrap();

        let all = report.split.values().flatten().collect::<Vec<_>>();
        let mut unique = all.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(all.len(), unique.len());
        assert_eq!(report.split.len(), 2);
    }

    #[test]
    fn compliant_partition_is_untouched() {
        let points = block("p", 60, 0.0, 0.0);
        let mut partition = single_area(points, "3");
        let before = partition.assignments().to_vec();

        let solver = PartitionSolver::new(StraightLineAllocator::default(), SolverOptions::new(1, 80.0));
        let splitter = AreaSplitter::new(&solver, config());

        for _ in 0..2 {
            let report = splitter.split(&mut partition).unwrap();
            assert!(report.is_noop());
            assert_eq!(partition.assignments(), before.as_slice());
        }
    }

    #[test]
    fn solver_failure_leaves_area_intact() {
        let mut partition = single_area(block("p", 90, 0.0, 0.0), "5");
        let before = partition.assignments().to_vec();

        let solver = PartitionSolver::new(Failing, SolverOptions::new(1, 80.0));
        let report = AreaSplitter::new(&solver, config()).split(&mut partition).unwrap();

        assert!(report.split.is_empty());
        assert_eq!(
            report.failed[&AreaId::new("5")].solver_messages(),
            ["network unavailable".to_string()]
        );
        assert_eq!(partition.assignments(), before.as_slice());
    }

    #[test]
    fn lazy_splits_yield_one_entry_per_oversized_area() {
        let mut points = block("a", 75, 0.0, 0.0);
        points.extend(block("b", 10, 5000.0, 0.0));
        let mut assignments = vec![AreaId::new("1"); 75];
        assignments.extend(vec![AreaId::new("2"); 10]);
        let partition = Partition::new(points, assignments).unwrap();

        let solver = PartitionSolver::new(StraightLineAllocator::default(), SolverOptions::new(1, 80.0));
        let splitter = AreaSplitter::new(&solver, config());
        let outcomes = splitter.splits(&partition).collect::<Vec<_>>();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].0, AreaId::new("1"));
        // round(75 / 40) = 2
        assert_eq!(outcomes[0].1.as_ref().unwrap().sub_areas().len(), 2);
    }
}
