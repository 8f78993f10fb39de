use std::collections::BTreeMap;

use geo::MultiPolygon;

use crate::{
    partition::{MergePlan, Partition, SplitReport},
    types::{Area, AreaId, AreaStats, DemandPoint, PointId},
};

/// What each pipeline stage decided, for logging and reporting.
#[derive(Clone, Debug, Default)]
pub struct PlanReport {
    pub clustering_index: Option<f64>,
    pub estimated_areas: usize,
    /// Points the initial solve could not place and that were attached to the nearest area.
    pub attached: usize,
    pub split: SplitReport,
    /// One entry per merge pass that ran.
    pub merges: Vec<MergePlan>,
}

/// A finished set of areas: every point's area, each area's outline and workload.
#[derive(Clone, Debug)]
pub struct AreaPlan {
    partition: Partition,
    outlines: BTreeMap<AreaId, MultiPolygon<f64>>,
    stats: BTreeMap<AreaId, AreaStats>,
    report: PlanReport,
}

impl AreaPlan {
    pub(super) fn new(
        partition: Partition,
        outlines: BTreeMap<AreaId, MultiPolygon<f64>>,
        stats: BTreeMap<AreaId, AreaStats>,
        report: PlanReport,
    ) -> Self {
        Self { partition, outlines, stats, report }
    }

    #[inline] pub fn partition(&self) -> &Partition { &self.partition }

    #[inline] pub fn points(&self) -> &[DemandPoint] { self.partition.points() }

    /// Get the final area of a point.
    #[inline] pub fn area_of(&self, id: &PointId) -> Option<&AreaId> { self.partition.area_of(id) }

    /// Dissolved outline per area. An area whose points all share a location with
    /// a smaller-id area has no outline of its own.
    #[inline] pub fn outlines(&self) -> &BTreeMap<AreaId, MultiPolygon<f64>> { &self.outlines }

    #[inline] pub fn stats(&self) -> &BTreeMap<AreaId, AreaStats> { &self.stats }

    #[inline] pub fn report(&self) -> &PlanReport { &self.report }

    /// Get the number of live areas.
    #[inline] pub fn num_areas(&self) -> usize { self.stats.len() }

    /// Every live area with its stats and outline, ascending by id.
    pub fn areas(&self) -> Vec<Area> {
        self.stats.iter()
            .map(|(id, stats)| Area {
                id: id.clone(),
                stats: *stats,
                polygon: self.outlines.get(id).cloned().unwrap_or_else(|| MultiPolygon::new(vec![])),
            })
            .collect()
    }
}
