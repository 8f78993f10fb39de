use std::collections::BTreeMap;

use geo::{BoundingRect, MultiPolygon};
use rstar::{primitives::{GeomWithData, Rectangle}, RTree, AABB};

use crate::types::AreaId;

/// Bounding rectangle of an outline, tagged with the outline's index.
pub(crate) type BoundingBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Area outlines keyed by AreaId, with an R-tree over their bounding boxes.
#[derive(Debug, Clone, Default)]
pub struct AreaShapes {
    ids: Vec<AreaId>,
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
}

impl AreaShapes {
    /// Construct from (id, outline) pairs. Ids are kept in ascending order.
    pub fn new(polygons: BTreeMap<AreaId, MultiPolygon<f64>>) -> Self {
        let (ids, shapes): (Vec<_>, Vec<_>) = polygons.into_iter().unzip();

        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| {
                        BoundingBox::new(Rectangle::from_corners(rect.min().into(), rect.max().into()), i)
                    }))
                    .collect()
            ),
            ids,
            shapes,
        }
    }

    /// Get the number of areas.
    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no areas.
    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Area ids, ascending.
    #[inline] pub fn ids(&self) -> &[AreaId] { &self.ids }

    /// Outlines, parallel to `ids()`.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Outline of a single area.
    pub fn get(&self, id: &AreaId) -> Option<&MultiPolygon<f64>> {
        self.ids.binary_search(id).ok().map(|i| &self.shapes[i])
    }

    /// Iterate over (id, outline) pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&AreaId, &MultiPolygon<f64>)> {
        self.ids.iter().zip(self.shapes.iter())
    }

    /// Query the R-tree for bounding boxes intersecting the given envelope.
    #[inline]
    pub(crate) fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = &BoundingBox> {
        self.rtree.locate_in_envelope_intersecting(envelope)
    }
}
