use crate::model::{LatLng, Polygon, Ring};
use anyhow::{Context, Result};
use geojson::{Feature, GeoJson, Geometry, Value};
use std::collections::HashMap;
use tracing::warn;

/// Parse a GeoJSON document into the overlay's polygon model
pub fn parse_polygons(raw: &str) -> Result<Vec<Polygon>> {
    let geojson: GeoJson = raw.parse().context("parsing GeoJSON polygon feed")?;
    Ok(polygons_from_geojson(&geojson))
}

/// Convert an already-parsed GeoJSON value into polygons.
///
/// `Polygon` features map one-to-one; `MultiPolygon` features split into
/// independent polygons with `<id>/<n>` ids. Features whose geometry
/// cannot be containment-tested are skipped with a warning rather than
/// failing the whole collection.
pub fn polygons_from_geojson(geojson: &GeoJson) -> Vec<Polygon> {
    let mut polygons = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for (index, feature) in fc.features.iter().enumerate() {
                collect_feature(feature, index, &mut polygons);
            }
        }
        GeoJson::Feature(feature) => collect_feature(feature, 0, &mut polygons),
        GeoJson::Geometry(geometry) => {
            collect_geometry(geometry, "feature-0", &HashMap::new(), &mut polygons)
        }
    }
    polygons
}

fn collect_feature(feature: &Feature, index: usize, out: &mut Vec<Polygon>) {
    let id = feature_id(feature, index);
    let properties = flatten_properties(feature);

    let Some(geometry) = &feature.geometry else {
        warn!(%id, "feature has no geometry, skipping");
        return;
    };
    collect_geometry(geometry, &id, &properties, out);
}

fn collect_geometry(
    geometry: &Geometry,
    id: &str,
    properties: &HashMap<String, String>,
    out: &mut Vec<Polygon>,
) {
    match &geometry.value {
        Value::Polygon(rings) => {
            push_polygon(id.to_string(), rings, properties, out);
        }
        Value::MultiPolygon(parts) => {
            for (n, rings) in parts.iter().enumerate() {
                push_polygon(format!("{}/{}", id, n), rings, properties, out);
            }
        }
        Value::GeometryCollection(geometries) => {
            for (n, inner) in geometries.iter().enumerate() {
                collect_geometry(inner, &format!("{}/{}", id, n), properties, out);
            }
        }
        // Point/line features carry no area to classify against.
        _ => {}
    }
}

fn push_polygon(
    id: String,
    raw_rings: &[Vec<Vec<f64>>],
    properties: &HashMap<String, String>,
    out: &mut Vec<Polygon>,
) {
    let rings: Vec<Ring> = raw_rings.iter().map(|r| ring_from_positions(r)).collect();
    match rings.first() {
        Some(outer) if outer.len() >= 3 => {
            let mut polygon = Polygon::new(id, rings);
            polygon.properties = properties.clone();
            out.push(polygon);
        }
        _ => warn!(%id, "degenerate outer ring, skipping"),
    }
}

/// GeoJSON rings repeat the first position at the end; the overlay's
/// rings are implicitly closed, so the duplicate is dropped.
fn ring_from_positions(positions: &[Vec<f64>]) -> Ring {
    let mut ring: Ring = positions
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| LatLng::new(c[1], c[0]))
        .collect();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

fn feature_id(feature: &Feature, index: usize) -> String {
    if let Some(id) = &feature.id {
        return match id {
            geojson::feature::Id::String(s) => s.clone(),
            geojson::feature::Id::Number(n) => n.to_string(),
        };
    }
    // Fall back to well-known identifying properties before a synthetic id.
    for key in ["id", "GEOID", "name", "NAME"] {
        if let Some(value) = feature.properties.as_ref().and_then(|p| p.get(key)) {
            if let Some(s) = value.as_str() {
                return s.to_string();
            }
        }
    }
    format!("feature-{}", index)
}

fn flatten_properties(feature: &Feature) -> HashMap<String, String> {
    let Some(properties) = &feature.properties else {
        return HashMap::new();
    };
    properties
        .iter()
        .map(|(k, v)| {
            let value = match v.as_str() {
                Some(s) => s.to_string(),
                None => v.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}
