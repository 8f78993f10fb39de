use std::{collections::BTreeMap, sync::Arc};

use ahash::AHashMap;
use geo::Coord;

use crate::{
    error::{Error, Result},
    solver::SolveResult,
    types::{AreaId, DemandPoint, PointId},
};

/// Assignment of every demand point to exactly one live area.
///
/// The points themselves never change; only their area labels do, and every
/// relabelling goes through a batch method so the cover is never half-updated.
#[derive(Clone, Debug)]
pub struct Partition {
    points: Arc<[DemandPoint]>,     // Immutable input, shared with parallel workers
    assignments: Vec<AreaId>,       // Area per point, parallel to `points`
    index: AHashMap<PointId, usize>, // Point id -> position
}

impl Partition {
    /// Construct a partition from points and one area per point.
    /// Fails if the lengths differ or a point id is repeated.
    pub fn new(points: impl Into<Arc<[DemandPoint]>>, assignments: Vec<AreaId>) -> Result<Self> {
        let points: Arc<[DemandPoint]> = points.into();
        if points.len() != assignments.len() {
            return Err(Error::InvalidInput {
                message: format!("{} points but {} assignments", points.len(), assignments.len()),
            })
        }

        let mut index = AHashMap::with_capacity(points.len());
        for (i, point) in points.iter().enumerate() {
            if index.insert(point.id.clone(), i).is_some() {
                return Err(Error::InvalidInput { message: format!("duplicate point id {}", point.id) })
            }
        }

        Ok(Self { points, assignments, index })
    }

    /// Construct a partition from a solve that covers every point.
    pub fn from_solve(points: impl Into<Arc<[DemandPoint]>>, result: &SolveResult) -> Result<Self> {
        let points: Arc<[DemandPoint]> = points.into();
        let assignments = points.iter()
            .map(|point| result.assignment.get(&point.id).cloned().ok_or_else(|| Error::InvalidInput {
                message: format!("point {} was not assigned to any area", point.id),
            }))
            .collect::<Result<Vec<_>>>()?;

        Self::new(points, assignments)
    }

    /// Get the number of points.
    #[inline] pub fn len(&self) -> usize { self.points.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.points.is_empty() }

    #[inline] pub fn points(&self) -> &[DemandPoint] { &self.points }

    /// Get the area of the point at position `i`.
    #[inline] pub fn assignment(&self, i: usize) -> &AreaId { &self.assignments[i] }

    #[inline] pub fn assignments(&self) -> &[AreaId] { &self.assignments }

    /// Get the area of a point by id.
    pub fn area_of(&self, id: &PointId) -> Option<&AreaId> {
        self.index.get(id).map(|&i| &self.assignments[i])
    }

    /// Point positions grouped by area, in ascending area order.
    pub fn members(&self) -> BTreeMap<AreaId, Vec<usize>> {
        let mut members: BTreeMap<AreaId, Vec<usize>> = BTreeMap::new();
        for (i, area) in self.assignments.iter().enumerate() {
            members.entry(area.clone()).or_default().push(i);
        }
        members
    }

    /// Point count per area.
    pub fn counts(&self) -> BTreeMap<AreaId, usize> {
        let mut counts: BTreeMap<AreaId, usize> = BTreeMap::new();
        for area in &self.assignments {
            *counts.entry(area.clone()).or_default() += 1;
        }
        counts
    }

    /// Get the number of live areas.
    pub fn num_areas(&self) -> usize { self.counts().len() }

    /// Copy of the points currently assigned to `area`.
    pub fn points_in(&self, area: &AreaId) -> Vec<DemandPoint> {
        self.points.iter().zip(&self.assignments)
            .filter(|(_, a)| *a == area)
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Relabel the given points. Every id is checked before anything changes,
    /// so an unknown id leaves the partition untouched.
    pub fn reassign(&mut self, updates: &BTreeMap<PointId, AreaId>) -> Result<usize> {
        let positions = updates.iter()
            .map(|(id, area)| match self.index.get(id) {
                Some(&i) => Ok((i, area)),
                None => Err(Error::InvalidInput { message: format!("unknown point id {id}") }),
            })
            .collect::<Result<Vec<_>>>()?;

        for &(i, area) in &positions {
            self.assignments[i] = area.clone();
        }
        Ok(positions.len())
    }

    /// Relabel every point whose area maps to `Some(target)`. Returns the number of points moved.
    pub fn relabel(&mut self, target: impl Fn(&AreaId) -> Option<AreaId>) -> usize {
        let mut moved = 0;
        for area in self.assignments.iter_mut() {
            if let Some(next) = target(area) {
                if next != *area {
                    *area = next;
                    moved += 1;
                }
            }
        }
        moved
    }

    /// (location, area) per point, for tessellation.
    pub fn labelled_locations(&self) -> Vec<(Coord<f64>, &AreaId)> {
        self.points.iter().zip(&self.assignments).map(|(p, a)| (p.location, a)).collect()
    }
}
