//! Per-area workload statistics and travel-cost weights for demand points.

use std::collections::BTreeMap;

use ahash::AHashSet;
use geo::Coord;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    geom::neighbor_distances,
    partition::Partition,
    solver::{RouteCost, RouteSolver},
    types::{AreaId, AreaStats, DemandPoint},
};

/// Distinct locations in first-seen order.
fn unique_stops(coords: impl IntoIterator<Item = Coord<f64>>) -> Vec<Coord<f64>> {
    let mut seen = AHashSet::new();
    coords.into_iter()
        .filter(|c| seen.insert((c.x.to_bits(), c.y.to_bits())))
        .collect()
}

/// Count the points of every area and route once through its distinct locations.
/// Areas are routed in parallel. A failed route is logged and leaves time and length at 0.
pub fn collect<R: RouteSolver>(partition: &Partition, router: &R) -> BTreeMap<AreaId, AreaStats> {
    let points = partition.points();
    let members = partition.members().into_iter().collect::<Vec<_>>();

    let stats = members.into_par_iter()
        .map(|(area, indices)| {
            let stops = unique_stops(indices.iter().map(|&i| points[i].location));
            let cost = match router.solve_route(&stops) {
                Ok(cost) => cost,
                Err(err) => {
                    warn!("[stats] route for area {} failed: {}", area, err);
                    RouteCost::default()
                }
            };
            let stats = AreaStats::new(indices.len(), cost.total_time, cost.total_length);
            (area, stats)
        })
        .collect::<BTreeMap<_, _>>();

    debug!("[stats] collected statistics for {} areas", stats.len());
    stats
}

/// Weight every point by the mean distance to its `k` nearest neighbours, so isolated
/// points cost more to visit. Stacked points (zero distance, e.g. flats in one building)
/// count `min_length` instead; a point with no neighbours at all gets `min_length`.
pub fn travel_weights(points: &[DemandPoint], k: usize, min_length: f64) -> Vec<DemandPoint> {
    let coords = points.iter().map(|p| p.location).collect::<Vec<_>>();
    let distances = neighbor_distances(&coords, k);

    points.iter().zip(distances)
        .map(|(point, nearest)| {
            let weight = if nearest.is_empty() {
                min_length
            } else {
                nearest.iter().map(|&d| if d > 0.0 { d } else { min_length }).sum::<f64>() / nearest.len() as f64
            };
            point.clone().with_weight(weight)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::{Error, Result}, solver::StraightLineRouter};

    struct Broken;

    impl RouteSolver for Broken {
        fn solve_route(&self, _: &[Coord<f64>]) -> Result<RouteCost> {
            Err(Error::solver(["no route found"]))
        }
    }

    fn partition() -> Partition {
        let points = vec![
            DemandPoint::new("a", 0.0, 0.0),
            DemandPoint::new("b", 1000.0, 0.0),
            DemandPoint::new("c", 1000.0, 0.0),
            DemandPoint::new("d", 5000.0, 0.0),
        ];
        Partition::new(points, vec![AreaId::new("0"), AreaId::new("0"), AreaId::new("0"), AreaId::new("1")]).unwrap()
    }

    #[test]
    fn counts_every_point_but_routes_unique_stops() {
        let stats = collect(&partition(), &StraightLineRouter::new(100.0));

        let first = stats[&AreaId::new("0")];
        assert_eq!(first.count, 3);
        assert!((first.total_length - 1.0).abs() < 1e-9);
        assert!((first.total_time - 10.0).abs() < 1e-9);

        let second = stats[&AreaId::new("1")];
        assert_eq!(second, AreaStats::new(1, 0.0, 0.0));
    }

    #[test]
    fn route_failure_keeps_counts() {
        let stats = collect(&partition(), &Broken);
        assert_eq!(stats[&AreaId::new("0")], AreaStats::new(3, 0.0, 0.0));
    }

    #[test]
    fn stacked_points_use_minimum_length() {
        let points = vec![
            DemandPoint::new("a", 0.0, 0.0),
            DemandPoint::new("b", 0.0, 0.0),
            DemandPoint::new("c", 30.0, 0.0),
        ];
        let weighted = travel_weights(&points, 1, 10.0);

        assert_eq!(weighted[0].weight, Some(10.0));
        assert_eq!(weighted[1].weight, Some(10.0));
        assert_eq!(weighted[2].weight, Some(30.0));
    }

    #[test]
    fn lone_point_gets_minimum_length() {
        let weighted = travel_weights(&[DemandPoint::new("a", 1.0, 1.0)], 10, 10.0);
        assert_eq!(weighted[0].weight(), 10.0);
    }
}
