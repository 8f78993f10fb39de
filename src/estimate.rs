use crate::error::{Error, Result};

/// Scales the clustering index into points-per-area units.
const CLUSTERING_SCALE: f64 = 50.0;

/// Number of areas to create for `total_points` demand points.
///
/// A positive `requested` count wins outright. Otherwise the baseline is
/// `total_points / area_size_factor`; when a clustering index is supplied the
/// denominator shrinks for clustered points (< 1) and grows for dispersed ones (> 1):
///
/// ```text
/// areas = total_points / (area_size_factor - clustering_index * 50)
/// ```
///
/// The result is rounded to the nearest integer and never below 1.
pub fn estimate_area_count(
    total_points: usize,
    requested: usize,
    clustering_index: Option<f64>,
    area_size_factor: f64,
) -> Result<usize> {
    if requested > 0 { return Ok(requested) }

    let denominator = match clustering_index {
        Some(index) => area_size_factor - index * CLUSTERING_SCALE,
        None => area_size_factor,
    };

    if !denominator.is_finite() || denominator <= 0.0 {
        return Err(Error::InvalidEstimate {
            message: format!(
                "points per area is {denominator} (factor {area_size_factor}, clustering index {clustering_index:?})"
            ),
        })
    }

    Ok(((total_points as f64 / denominator).round() as usize).max(1))
}
