use geo::{Buffer, Coord, MultiPoint, MultiPolygon, Point};

/// Outline the area of interest around a point set: buffer every point by `distance`
/// so neighbouring clusters fuse, then shrink the result by 90% of that distance.
pub fn features_to_aoi(coords: &[Coord<f64>], distance: f64) -> MultiPolygon<f64> {
    let points = MultiPoint::from(coords.iter().map(|&c| Point::from(c)).collect::<Vec<_>>());
    let negative = -(distance * 0.9).abs();

    points.buffer(distance.abs()).buffer(negative)
}
