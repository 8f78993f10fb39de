use std::{fmt, sync::Arc};

use uuid::Uuid;

/// Identity of a live area ("rode").
/// Either the index of the facility that seeded it, or `parent_uuid` after a split.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaId(Arc<str>);

impl AreaId {
    pub fn new(id: impl AsRef<str>) -> Self { Self(Arc::from(id.as_ref())) }

    /// Area id for the facility at `index` in a solve.
    pub fn from_facility(index: usize) -> Self { Self::new(index.to_string()) }

    /// Fresh id for a sub-area carved out of `self`.
    /// Uses a random UUID so concurrent splits never collide.
    pub fn child(&self) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self::new(format!("{}_{}", self.0, suffix))
    }

    /// True if `self` was produced by [`AreaId::child`] on `parent` (at any depth).
    pub fn descends_from(&self, parent: &AreaId) -> bool {
        self.0.len() > parent.0.len()
            && self.0.starts_with(parent.as_str())
            && self.0.as_bytes()[parent.0.len()] == b'_'
    }

    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for AreaId {
    fn from(id: &str) -> Self { Self::new(id) }
}
