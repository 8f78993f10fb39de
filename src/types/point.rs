use std::{fmt, sync::Arc};

use geo::{Coord, Point};

/// Stable identity of a demand point (e.g. a residential unit number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(Arc<str>);

impl PointId {
    pub fn new(id: impl AsRef<str>) -> Self { Self(Arc::from(id.as_ref())) }

    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for PointId {
    fn from(id: &str) -> Self { Self::new(id) }
}

/// A location requiring a visit. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandPoint {
    pub id: PointId,
    pub location: Coord<f64>,
    pub weight: Option<f64>, // travel-cost contribution, 1.0 if unset
}

impl DemandPoint {
    pub fn new(id: impl Into<PointId>, x: f64, y: f64) -> Self {
        Self { id: id.into(), location: Coord { x, y }, weight: None }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    #[inline] pub fn weight(&self) -> f64 { self.weight.unwrap_or(1.0) }

    #[inline] pub fn point(&self) -> Point<f64> { Point::from(self.location) }
}

impl From<String> for PointId {
    fn from(id: String) -> Self { Self(Arc::from(id)) }
}
