use geo::{BoundingRect, Coord, MultiPoint, Point};
use rstar::{primitives::GeomWithData, RTree};

/// R-tree over point coordinates, tagged with their input index.
fn index_points(coords: &[Coord<f64>]) -> RTree<GeomWithData<[f64; 2], usize>> {
    RTree::bulk_load(
        coords.iter().enumerate()
            .map(|(i, c)| GeomWithData::new([c.x, c.y], i))
            .collect()
    )
}

/// Average nearest neighbour index: observed mean nearest-neighbour distance over the
/// mean expected for a random distribution on the same extent, `0.5 / sqrt(n / A)`.
/// Values below 1 mean clustered, above 1 dispersed.
/// Returns `None` for fewer than two points or a zero-area extent.
pub fn average_nearest_neighbor(coords: &[Coord<f64>]) -> Option<f64> {
    let n = coords.len();
    if n < 2 { return None }

    let extent = MultiPoint::from(coords.iter().map(|&c| Point::from(c)).collect::<Vec<_>>())
        .bounding_rect()?;
    let area = extent.width() * extent.height();
    if !(area > 0.0) { return None }

    let tree = index_points(coords);
    let observed = coords.iter().enumerate()
        .filter_map(|(i, c)| {
            tree.nearest_neighbor_iter_with_distance_2(&[c.x, c.y])
                .find(|(neighbor, _)| neighbor.data != i)
                .map(|(_, d2)| d2.sqrt())
        })
        .sum::<f64>() / n as f64;

    let expected = 0.5 / (n as f64 / area).sqrt();
    Some(observed / expected)
}

/// Distances from each point to its `k` nearest other points, nearest first.
pub fn neighbor_distances(coords: &[Coord<f64>], k: usize) -> Vec<Vec<f64>> {
    let tree = index_points(coords);
    coords.iter().enumerate()
        .map(|(i, c)| {
            tree.nearest_neighbor_iter_with_distance_2(&[c.x, c.y])
                .filter(|(neighbor, _)| neighbor.data != i)
                .take(k)
                .map(|(_, d2)| d2.sqrt())
                .collect()
        })
        .collect()
}
