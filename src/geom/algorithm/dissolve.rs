use std::collections::BTreeMap;

use ahash::AHashMap;
use geo::{BooleanOps, BoundingRect, Coord, MultiPoint, MultiPolygon, Point, Polygon, Rect};

use super::thiessen::{snap, snap_grid, thiessen};
use crate::types::AreaId;

/// Union all polygons sharing an id into one outline per id.
pub fn dissolve<'a>(polygons: impl IntoIterator<Item = (&'a AreaId, Polygon<f64>)>) -> BTreeMap<AreaId, MultiPolygon<f64>> {
    let mut groups: BTreeMap<AreaId, Vec<Polygon<f64>>> = BTreeMap::new();
    for (id, polygon) in polygons {
        if polygon.exterior().0.is_empty() { continue }
        groups.entry(id.clone()).or_default().push(polygon);
    }

    groups.into_iter()
        .map(|(id, parts)| {
            let merged = parts.into_iter()
                .map(|p| MultiPolygon::new(vec![p]))
                .reduce(|a, b| a.union(&b))
                .unwrap_or_else(|| MultiPolygon::new(vec![]));
            (id, merged)
        })
        .collect()
}

/// Union outlines after relabelling: every outline whose id maps through `relabel`
/// is merged into the outline of its new id.
pub fn dissolve_outlines(
    outlines: &BTreeMap<AreaId, MultiPolygon<f64>>,
    relabel: impl Fn(&AreaId) -> AreaId,
) -> BTreeMap<AreaId, MultiPolygon<f64>> {
    let mut merged: BTreeMap<AreaId, MultiPolygon<f64>> = BTreeMap::new();
    for (id, shape) in outlines {
        let target = relabel(id);
        let combined = match merged.remove(&target) {
            Some(existing) => existing.union(shape),
            None => shape.clone(),
        };
        merged.insert(target, combined);
    }
    merged
}

/// Clip every outline to `boundary`, dropping outlines left empty.
pub fn clip(outlines: BTreeMap<AreaId, MultiPolygon<f64>>, boundary: &MultiPolygon<f64>) -> BTreeMap<AreaId, MultiPolygon<f64>> {
    outlines.into_iter()
        .map(|(id, shape)| (id, shape.intersection(boundary)))
        .filter(|(_, shape)| !shape.0.is_empty())
        .collect()
}

/// Build area outlines from labelled point locations: Thiessen cells around every
/// distinct location, each labelled with its point's area (smallest id when several
/// areas share a location), dissolved by id and clipped to `boundary` if given.
/// Without a boundary the cells are framed by the points' extent grown by `margin`.
/// Vertices are snapped to a grid fine relative to the frame so neighbours share edges exactly.
pub fn build_area_polygons(
    labelled: &[(Coord<f64>, &AreaId)],
    boundary: Option<&MultiPolygon<f64>>,
    margin: f64,
) -> BTreeMap<AreaId, MultiPolygon<f64>> {
    let mut owners: AHashMap<(u64, u64), usize> = AHashMap::with_capacity(labelled.len());
    let mut sites: Vec<Coord<f64>> = Vec::new();
    let mut labels: Vec<&AreaId> = Vec::new();

    for &(coord, id) in labelled {
        match owners.get(&(coord.x.to_bits(), coord.y.to_bits())) {
            Some(&i) => if id < labels[i] { labels[i] = id },
            None => {
                owners.insert((coord.x.to_bits(), coord.y.to_bits()), sites.len());
                sites.push(coord);
                labels.push(id);
            }
        }
    }

    let Some(extent) = frame(&sites, boundary, margin) else { return BTreeMap::new() };
    let cells = thiessen(&sites, extent);
    let outlines = dissolve(labels.into_iter().zip(cells));

    match boundary {
        // Clipping cuts shared edges separately per area; re-snap so neighbours agree.
        Some(boundary) => {
            let grid = snap_grid(extent);
            clip(outlines, boundary).into_iter()
                .map(|(id, shape)| (id, snap(&shape, grid)))
                .filter(|(_, shape)| !shape.0.is_empty())
                .collect()
        }
        None => outlines,
    }
}

/// Rectangle framing the tessellation: the sites' extent (and the boundary's, if any)
/// grown by `margin` on each side, with a minimum margin of one unit.
fn frame(sites: &[Coord<f64>], boundary: Option<&MultiPolygon<f64>>, margin: f64) -> Option<Rect<f64>> {
    let points = MultiPoint::from(sites.iter().map(|&c| Point::from(c)).collect::<Vec<_>>());
    let mut rect = points.bounding_rect()?;
    if let Some(outer) = boundary.and_then(|b| b.bounding_rect()) {
        rect = Rect::new(
            Coord { x: rect.min().x.min(outer.min().x), y: rect.min().y.min(outer.min().y) },
            Coord { x: rect.max().x.max(outer.max().x), y: rect.max().y.max(outer.max().y) },
        );
    }
    let pad = margin.max(1.0);
    Some(Rect::new(
        Coord { x: rect.min().x - pad, y: rect.min().y - pad },
        Coord { x: rect.max().x + pad, y: rect.max().y + pad },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Contains};

    #[test]
    fn cells_with_the_same_label_dissolve() {
        let a = AreaId::new("a");
        let b = AreaId::new("b");
        let labelled = vec![
            (Coord { x: 1.0, y: 1.0 }, &a),
            (Coord { x: 3.0, y: 1.0 }, &a),
            (Coord { x: 7.0, y: 1.0 }, &b),
            (Coord { x: 9.0, y: 1.0 }, &b),
        ];
        let outlines = build_area_polygons(&labelled, None, 1.0);

        assert_eq!(outlines.len(), 2);
        assert_eq!(outlines[&a].0.len(), 1);
        assert!(outlines[&a].contains(&Point::new(4.9, 1.0)));
        assert!(outlines[&b].contains(&Point::new(5.1, 1.0)));
    }

    #[test]
    fn clipping_trims_to_boundary() {
        let a = AreaId::new("a");
        let labelled = vec![(Coord { x: 5.0, y: 5.0 }, &a)];
        let boundary = MultiPolygon::new(vec![
            Rect::new(Coord { x: 4.0, y: 4.0 }, Coord { x: 6.0, y: 6.0 }).to_polygon()
        ]);
        let outlines = build_area_polygons(&labelled, Some(&boundary), 10.0);
        assert!((outlines[&a].unsigned_area() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_points_go_to_smallest_label() {
        let a = AreaId::new("a");
        let b = AreaId::new("b");
        let labelled = vec![(Coord { x: 0.0, y: 0.0 }, &b), (Coord { x: 0.0, y: 0.0 }, &a)];
        let outlines = build_area_polygons(&labelled, None, 1.0);
        assert_eq!(outlines.keys().collect::<Vec<_>>(), vec![&a]);
    }

    #[test]
    fn relabelled_outlines_union() {
        let left = MultiPolygon::new(vec![Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }).to_polygon()]);
        let right = MultiPolygon::new(vec![Rect::new(Coord { x: 1.0, y: 0.0 }, Coord { x: 2.0, y: 1.0 }).to_polygon()]);
        let outlines = BTreeMap::from([(AreaId::new("l"), left), (AreaId::new("r"), right)]);

        let merged = dissolve_outlines(&outlines, |_| AreaId::new("r"));
        assert_eq!(merged.len(), 1);
        assert!((merged[&AreaId::new("r")].unsigned_area() - 2.0).abs() < 1e-9);
    }
}
