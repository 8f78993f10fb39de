//! Run configuration.
//!
//! Every threshold the pipeline uses lives here and is passed down explicitly,
//! so a run can be tuned (or tested) without touching module-level constants.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub estimate: EstimateConfig,
    pub allocation: AllocationConfig,
    pub facilities: FacilityConfig,
    pub split: SplitConfig,
    pub merge: MergeConfig,
    pub geometry: GeometryConfig,
    pub weights: WeightConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    /// Points per area used for the baseline estimate.
    pub area_size_factor: f64,
    /// Weight the estimate by the average nearest neighbour index.
    pub use_clustering_index: bool,
    /// Explicit number of areas (0 = estimate).
    pub requested_areas: usize,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self { area_size_factor: 40.0, use_clustering_index: true, requested_areas: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Maximum points per area in the initial partition (0 = unconstrained).
    pub max_units: usize,
    /// Demand farther than this (minutes) from every facility is left unallocated.
    pub impedance_cutoff: Option<f64>,
    /// Distance units per minute of travel.
    pub travel_speed: f64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self { max_units: 0, impedance_cutoff: None, travel_speed: 5000.0 / 60.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    /// Candidate sites closer than this are collapsed into one.
    pub dedup_tolerance: f64,
}

impl Default for FacilityConfig {
    fn default() -> Self { Self { dedup_tolerance: 100.0 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Areas with more points than this are subdivided.
    pub upper_bound: usize,
    /// Desired points per sub-area.
    pub target_size: usize,
}

impl Default for SplitConfig {
    fn default() -> Self { Self { upper_bound: 70, target_size: 40 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Areas with at most this many points are merge candidates.
    pub min_count: usize,
    /// A merged area must stay strictly below this many points.
    pub max_count: usize,
    /// A merged area must stay strictly below this travel time (minutes).
    pub max_time: f64,
    /// Areas below this are merged even when no neighbor satisfies the bounds.
    pub abs_min_count: usize,
    /// Number of merge sweeps; stops early once a sweep merges nothing.
    pub max_passes: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { min_count: 20, max_count: 50, max_time: 60.0, abs_min_count: 5, max_passes: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Outward buffer used to build the area of interest; shrunk back by 90%.
    pub aoi_buffer: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self { Self { aoi_buffer: 1000.0 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub use_travel_weight: bool,
    pub neighbors: usize,
    /// Stand-in distance for stacked points (e.g. flats in one building).
    pub min_travel_length: f64,
}

impl Default for WeightConfig {
    fn default() -> Self { Self { use_travel_weight: false, neighbors: 10, min_travel_length: 10.0 } }
}

impl PlanConfig {
    /// Parse a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| Error::InvalidConfig { message: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML configuration file.
    pub fn read_from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("[config] Invalid configuration in {}", path.display()))
    }

    /// Check the cross-field constraints the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: &str| Err(Error::InvalidConfig { message: message.to_string() });

        if !(self.estimate.area_size_factor > 0.0) { return fail("estimate.area_size_factor must be > 0") }
        if !(self.allocation.travel_speed > 0.0) { return fail("allocation.travel_speed must be > 0") }
        if self.facilities.dedup_tolerance < 0.0 { return fail("facilities.dedup_tolerance must be >= 0") }
        if self.split.target_size == 0 { return fail("split.target_size must be > 0") }
        if self.split.upper_bound < self.split.target_size {
            return fail("split.upper_bound must be >= split.target_size")
        }
        if self.merge.abs_min_count > self.merge.min_count {
            return fail("merge.abs_min_count must be <= merge.min_count")
        }
        if self.merge.max_count <= self.merge.min_count {
            return fail("merge.max_count must be > merge.min_count")
        }
        if !(self.merge.max_time > 0.0) { return fail("merge.max_time must be > 0") }
        if self.geometry.aoi_buffer < 0.0 { return fail("geometry.aoi_buffer must be >= 0") }
        if self.weights.use_travel_weight && self.weights.neighbors == 0 {
            return fail("weights.neighbors must be > 0 when travel weights are enabled")
        }

        Ok(())
    }
}
