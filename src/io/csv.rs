//! Demand points in and labelled points out, as CSV.

use std::{fs::File, io::Cursor, path::Path, sync::Arc};

use anyhow::{Context, Result, ensure};
use polars::{
    frame::DataFrame,
    io::{SerReader, SerWriter},
    prelude::{CsvReadOptions, CsvWriter, DataType, Field, NamedFrom, Schema},
    series::Series,
};

use crate::{plan::AreaPlan, types::DemandPoint};

/// Read options for a points file: header row, `id` kept as text so leading zeros survive.
fn points_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_schema_overwrite(Some(Arc::new(Schema::from_iter([
            Field::new("id".into(), DataType::String),
        ]))))
}

/// Read demand points from a CSV file with columns `id,x,y` and an optional `weight`.
pub fn read_points(path: &Path) -> Result<Vec<DemandPoint>> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv] Failed to open points file: {}", path.display()))?;
    let df = points_options()
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv] Failed to read CSV from {:?}", path))?;

    points_from_frame(&df).with_context(|| format!("[io::csv] Invalid points file {}", path.display()))
}

/// Read demand points from CSV text.
pub fn read_points_str(csv: &str) -> Result<Vec<DemandPoint>> {
    let df = points_options()
        .into_reader_with_file_handle(Cursor::new(csv.as_bytes()))
        .finish()
        .context("[io::csv] Failed to read CSV from string")?;

    points_from_frame(&df)
}

fn points_from_frame(df: &DataFrame) -> Result<Vec<DemandPoint>> {
    for name in ["id", "x", "y"] {
        ensure!(df.column(name).is_ok(), "[io::csv] Missing required column '{name}'");
    }

    let ids = df.column("id")?.cast(&DataType::String)?;
    let xs = df.column("x")?.cast(&DataType::Float64)?;
    let ys = df.column("y")?.cast(&DataType::Float64)?;
    let weights = df.column("weight").ok()
        .map(|c| c.cast(&DataType::Float64))
        .transpose()?;

    let (ids, xs, ys) = (ids.str()?, xs.f64()?, ys.f64()?);
    let weights = weights.as_ref().map(|c| c.f64()).transpose()?;

    (0..df.height())
        .map(|row| {
            let id = ids.get(row).with_context(|| format!("[io::csv] Row {row} has no id"))?;
            let (Some(x), Some(y)) = (xs.get(row), ys.get(row)) else {
                anyhow::bail!("[io::csv] Point {id} has no coordinates")
            };
            ensure!(x.is_finite() && y.is_finite(), "[io::csv] Point {id} has non-finite coordinates");

            let point = DemandPoint::new(id, x, y);
            Ok(match weights.and_then(|w| w.get(row)) {
                Some(weight) => point.with_weight(weight),
                None => point,
            })
        })
        .collect()
}

/// Frame of every point with its final area: `id,x,y,weight,area_id`.
fn plan_frame(plan: &AreaPlan) -> Result<DataFrame> {
    let points = plan.points();
    let assignments = plan.partition().assignments();

    let df = DataFrame::new(vec![
        Series::new("id".into(), points.iter().map(|p| p.id.to_string()).collect::<Vec<_>>()).into(),
        Series::new("x".into(), points.iter().map(|p| p.location.x).collect::<Vec<_>>()).into(),
        Series::new("y".into(), points.iter().map(|p| p.location.y).collect::<Vec<_>>()).into(),
        Series::new("weight".into(), points.iter().map(|p| p.weight()).collect::<Vec<_>>()).into(),
        Series::new("area_id".into(), assignments.iter().map(|a| a.to_string()).collect::<Vec<_>>()).into(),
    ])?;
    Ok(df)
}

/// Write every point with its final area to a CSV file.
pub fn write_points(plan: &AreaPlan, path: &Path) -> Result<()> {
    let mut df = plan_frame(plan)?;
    let file = File::create(path)
        .with_context(|| format!("[io::csv] Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(&mut df)
        .with_context(|| format!("[io::csv] Failed to write CSV to {:?}", path))
}

/// Write every point with its final area to a CSV string.
pub fn write_points_string(plan: &AreaPlan) -> Result<String> {
    let mut df = plan_frame(plan)?;
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .finish(&mut df)
        .context("[io::csv] Failed to write CSV to string")?;
    String::from_utf8(buffer).context("[io::csv] CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_ids_as_text_and_optional_weight() {
        let points = read_points_str("id,x,y,weight\n0012,1.5,2.0,3.0\n0013,4.0,5.0,\n").unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id.as_str(), "0012");
        assert_eq!(points[0].location.x, 1.5);
        assert_eq!(points[0].weight, Some(3.0));
        assert_eq!(points[1].weight, None);
    }

    #[test]
    fn weight_column_is_optional() {
        let points = read_points_str("id,x,y\na,0,0\nb,10,0\n").unwrap();
        assert_eq!(points[1].location.x, 10.0);
        assert!(points.iter().all(|p| p.weight.is_none()));
    }

    #[test]
    fn missing_coordinate_column_is_an_error() {
        let err = read_points_str("id,x\na,0\n").unwrap_err();
        assert!(err.to_string().contains("'y'"));
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        std::fs::write(&path, "id,x,y\np1,100,200\n").unwrap();

        let points = read_points(&path).unwrap();
        assert_eq!(points, vec![DemandPoint::new("p1", 100.0, 200.0)]);
    }
}
