use geo::{BoundingRect, Relate};
use rstar::AABB;

use crate::{error::{Error, Result}, geom::AreaShapes, graph::AdjacencyGraph};

impl AdjacencyGraph {
    /// Rook contiguity between area outlines: two areas are adjacent iff their
    /// boundaries share a segment of positive length. Meeting at a single vertex
    /// does not count. Interiors are not required to be disjoint, so outlines that
    /// overlap by rounding noise along a shared edge still count as neighbours.
    pub fn build(areas: &AreaShapes) -> Result<Self> {
        let mut adjacencies = vec![Vec::new(); areas.len()];
        let shapes = areas.shapes();

        for i in 0..shapes.len() {
            let Some(rect) = shapes[i].bounding_rect() else { continue };
            let search = AABB::from_corners(rect.min().into(), rect.max().into());

            for cand in areas.query(&search) {
                let j = cand.data;
                if j <= i { continue } // check each unordered pair once

                let im = shapes[i].relate(&shapes[j]);

                // Boundary/Boundary is index 4 of the DE-9IM string; '1' means a line.
                let shares_segment = im.matches("****1****")
                    .map_err(|e| Error::InvalidInput { message: e.to_string() })?;
                if shares_segment {
                    adjacencies[i].push(j as u32);
                    adjacencies[j].push(i as u32);
                }
            }
        }

        Ok(Self::new(areas.ids().to_vec(), &adjacencies))
    }
}
