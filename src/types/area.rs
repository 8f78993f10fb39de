use geo::MultiPolygon;

use super::AreaId;

/// Aggregate workload of one area.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AreaStats {
    pub count: usize,
    pub total_time: f64,   // minutes
    pub total_length: f64, // kilometres
}

impl AreaStats {
    pub fn new(count: usize, total_time: f64, total_length: f64) -> Self {
        Self { count, total_time, total_length }
    }
}

/// A finished area: identity, workload and dissolved outline.
#[derive(Debug, Clone)]
pub struct Area {
    pub id: AreaId,
    pub stats: AreaStats,
    pub polygon: MultiPolygon<f64>,
}
