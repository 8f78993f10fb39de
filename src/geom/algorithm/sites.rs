use ahash::AHashSet;
use geo::Coord;
use rstar::{primitives::GeomWithData, RTree};

use crate::types::DemandPoint;

/// Candidate facility locations: one representative per cluster of points lying
/// within `tolerance` of an already kept site. First-seen point wins.
/// A tolerance of 0 keeps exactly one site per distinct coordinate.
pub fn dedup_sites(points: &[DemandPoint], tolerance: f64) -> Vec<Coord<f64>> {
    if tolerance <= 0.0 {
        let mut seen = AHashSet::with_capacity(points.len());
        return points.iter()
            .map(|p| p.location)
            .filter(|c| seen.insert((c.x.to_bits(), c.y.to_bits())))
            .collect()
    }

    let radius_2 = tolerance * tolerance;
    let mut kept: RTree<GeomWithData<[f64; 2], usize>> = RTree::new();
    let mut sites = Vec::new();

    for point in points {
        let query = [point.location.x, point.location.y];
        if kept.locate_within_distance(query, radius_2).next().is_some() { continue }
        kept.insert(GeomWithData::new(query, sites.len()));
        sites.push(point.location);
    }

    sites
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(coords: &[(f64, f64)]) -> Vec<DemandPoint> {
        coords.iter().enumerate()
            .map(|(i, &(x, y))| DemandPoint::new(i.to_string().as_str(), x, y))
            .collect()
    }

    #[test]
    fn zero_tolerance_removes_only_exact_duplicates() {
        let pts = points(&[(0.0, 0.0), (0.0, 0.0), (0.5, 0.0), (0.0, 0.0)]);
        let sites = dedup_sites(&pts, 0.0);
        assert_eq!(sites, vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 0.5, y: 0.0 }]);
    }

    #[test]
    fn tolerance_collapses_nearby_points() {
        let pts = points(&[(0.0, 0.0), (60.0, 0.0), (150.0, 0.0), (400.0, 0.0)]);
        let sites = dedup_sites(&pts, 100.0);
        assert_eq!(sites, vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 150.0, y: 0.0 },
            Coord { x: 400.0, y: 0.0 },
        ]);
    }
}
