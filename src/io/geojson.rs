//! Area outlines out, as a GeoJSON FeatureCollection.

use std::{fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use geo::{LineString, MultiPolygon};
use serde_json::{json, Value};

use crate::{plan::AreaPlan, types::Area};

fn ring_to_json(ring: &LineString<f64>) -> Value {
    Value::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}

/// GeoJSON coordinates of a MultiPolygon: polygons of rings, exterior first.
fn multipolygon_to_json(shape: &MultiPolygon<f64>) -> Value {
    Value::Array(
        shape.0.iter()
            .map(|polygon| {
                let rings = std::iter::once(polygon.exterior())
                    .chain(polygon.interiors())
                    .map(ring_to_json)
                    .collect();
                Value::Array(rings)
            })
            .collect()
    )
}

/// One MultiPolygon feature per area, with its id and workload as properties.
pub fn areas_to_geojson(areas: &[Area]) -> Value {
    let features = areas.iter()
        .map(|area| json!({
            "type": "Feature",
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": multipolygon_to_json(&area.polygon),
            },
            "properties": {
                "area_id": area.id.as_str(),
                "count": area.stats.count,
                "total_time": area.stats.total_time,
                "total_length": area.stats.total_length,
            },
        }))
        .collect::<Vec<_>>();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Write the plan's areas to a GeoJSON file.
pub fn write_areas(plan: &AreaPlan, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::geojson] Failed to create GeoJSON file: {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &areas_to_geojson(&plan.areas()))
        .with_context(|| format!("[io::geojson] Failed to write GeoJSON to {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, Polygon, Rect};

    use crate::types::{AreaId, AreaStats};

    #[test]
    fn features_carry_id_and_stats() {
        let square = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 2.0, y: 2.0 }).to_polygon();
        let hole = LineString::from(vec![(0.5, 0.5), (1.0, 0.5), (1.0, 1.0), (0.5, 0.5)]);
        let area = Area {
            id: AreaId::new("3_abc"),
            stats: AreaStats::new(12, 30.5, 2.25),
            polygon: MultiPolygon::new(vec![Polygon::new(square.exterior().clone(), vec![hole])]),
        };

        let value = areas_to_geojson(&[area]);
        let feature = &value["features"][0];

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(feature["geometry"]["type"], "MultiPolygon");
        assert_eq!(feature["properties"]["area_id"], "3_abc");
        assert_eq!(feature["properties"]["count"], 12);
        assert_eq!(feature["properties"]["total_time"], 30.5);

        let rings = feature["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].as_array().unwrap().len(), 5);
        assert_eq!(rings[1][0], json!([0.5, 0.5]));
    }
}
