use geo::{Coord, LineString, MapCoords, MultiPolygon, Polygon, Rect, RemoveRepeatedPoints};
use rstar::{primitives::GeomWithData, RTree};

/// Power-of-two grid about a millionth of the extent of `bounds`.
/// Vertices computed separately for neighbouring cells agree once snapped to it.
pub(crate) fn snap_grid(bounds: Rect<f64>) -> f64 {
    let extent = bounds.width().max(bounds.height());
    if !(extent > 0.0) { return f64::MIN_POSITIVE }
    (extent.log2().floor() - 20.0).exp2()
}

#[inline]
fn snap_coord(c: Coord<f64>, grid: f64) -> Coord<f64> {
    Coord { x: (c.x / grid).round() * grid, y: (c.y / grid).round() * grid }
}

/// Snap every vertex of `shape` to `grid`, dropping vertices that collapse together.
pub(crate) fn snap(shape: &MultiPolygon<f64>, grid: f64) -> MultiPolygon<f64> {
    shape.map_coords(|c| snap_coord(c, grid)).remove_repeated_points()
}

/// Snap an open ring, dropping vertices that collapse together.
fn snap_ring(ring: Vec<Coord<f64>>, grid: f64) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(ring.len());
    for c in ring {
        let c = snap_coord(c, grid);
        if out.last() != Some(&c) { out.push(c) }
    }
    if out.len() > 1 && out.first() == out.last() { out.pop(); }
    out
}

/// Keep the part of a convex ring on `site`'s side of the bisector between `site` and `other`.
/// Sutherland-Hodgman against a single half-plane; `ring` is open (no closing coord).
fn clip_to_bisector(ring: &[Coord<f64>], site: Coord<f64>, other: Coord<f64>) -> Vec<Coord<f64>> {
    let normal = other - site;
    let mid = (site + other) / 2.0;
    let side = |p: Coord<f64>| (p.x - mid.x) * normal.x + (p.y - mid.y) * normal.y;

    let mut out = Vec::with_capacity(ring.len() + 1);
    for (i, &a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        let (da, db) = (side(a), side(b));

        if da <= 0.0 { out.push(a) }
        if (da < 0.0 && db > 0.0) || (da > 0.0 && db < 0.0) {
            let t = da / (da - db);
            out.push(Coord { x: a.x + t * (b.x - a.x), y: a.y + t * (b.y - a.y) });
        }
    }
    out
}

/// Squared distance from `site` to the farthest vertex of `ring`.
fn radius_2(ring: &[Coord<f64>], site: Coord<f64>) -> f64 {
    ring.iter()
        .map(|c| (c.x - site.x).powi(2) + (c.y - site.y).powi(2))
        .fold(0.0, f64::max)
}

/// Thiessen (Voronoi) cells for distinct `sites`, clipped to `bounds`.
/// Cell `i` belongs to `sites[i]`; sites outside `bounds` get an empty polygon.
///
/// Each cell starts as the bounding rectangle and is cut by the bisectors of the
/// nearest sites in order of distance. Once the next site is farther than twice the
/// cell's radius it cannot cut the cell, so the scan stops there.
/// Vertices are snapped to [`snap_grid`] so shared edges are bit-identical.
pub fn thiessen(sites: &[Coord<f64>], bounds: Rect<f64>) -> Vec<Polygon<f64>> {
    let tree: RTree<GeomWithData<[f64; 2], usize>> = RTree::bulk_load(
        sites.iter().enumerate().map(|(i, c)| GeomWithData::new([c.x, c.y], i)).collect()
    );
    let frame = bounds.to_polygon();
    let grid = snap_grid(bounds);
    let mut initial = frame.exterior().0.clone();
    initial.pop(); // open ring

    sites.iter().enumerate()
        .map(|(i, &site)| {
            let mut ring = initial.clone();
            let mut reach_2 = 4.0 * radius_2(&ring, site);

            for (neighbor, d2) in tree.nearest_neighbor_iter_with_distance_2(&[site.x, site.y]) {
                if neighbor.data == i { continue }
                if d2 > reach_2 || ring.is_empty() { break }

                let [x, y] = *neighbor.geom();
                ring = clip_to_bisector(&ring, site, Coord { x, y });
                reach_2 = 4.0 * radius_2(&ring, site);
            }

            let ring = snap_ring(ring, grid);
            if ring.len() < 3 { Polygon::new(LineString::new(vec![]), vec![]) }
            else { Polygon::new(LineString::new(ring), vec![]) }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Contains, Point};

    fn square(size: f64) -> Rect<f64> {
        Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: size, y: size })
    }

    #[test]
    fn two_sites_split_the_frame_along_the_bisector() {
        let sites = [Coord { x: 2.5, y: 5.0 }, Coord { x: 7.5, y: 5.0 }];
        let cells = thiessen(&sites, square(10.0));

        assert_eq!(cells.len(), 2);
        assert!((cells[0].unsigned_area() - 50.0).abs() < 1e-9);
        assert!((cells[1].unsigned_area() - 50.0).abs() < 1e-9);
        assert!(cells[0].contains(&Point::new(4.9, 1.0)));
        assert!(cells[1].contains(&Point::new(5.1, 9.0)));
    }

    #[test]
    fn cells_tile_the_frame() {
        let sites = (0..5)
            .flat_map(|i| (0..5).map(move |j| Coord { x: 1.0 + 2.0 * i as f64 + 0.3 * j as f64, y: 1.0 + 2.0 * j as f64 }))
            .collect::<Vec<_>>();
        let cells = thiessen(&sites, square(12.0));

        let total = cells.iter().map(|c| c.unsigned_area()).sum::<f64>();
        assert!((total - 144.0).abs() < 1e-6, "cells cover {total}");
        for (cell, site) in cells.iter().zip(&sites) {
            assert!(cell.contains(&Point::from(*site)));
        }
    }

    #[test]
    fn single_site_owns_the_frame() {
        let cells = thiessen(&[Coord { x: 3.0, y: 3.0 }], square(10.0));
        assert!((cells[0].unsigned_area() - 100.0).abs() < 1e-9);
    }
}
