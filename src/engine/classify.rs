use crate::engine::{place_label, OverlaySettings};
use crate::error::OverlayError;
use crate::geom::{point_in_polygon, MarkerGrid, Projection};
use crate::model::{ClassificationResult, LatLng, Marker, Polygon};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::warn;

/// Check that a polygon can be containment-tested at all
pub fn validate_polygon(polygon: &Polygon) -> Result<(), OverlayError> {
    let Some(outer) = polygon.outer_ring() else {
        return Err(OverlayError::InvalidGeometry {
            id: polygon.id.clone(),
            reason: "no outer ring".into(),
        });
    };
    if outer.len() < 3 {
        return Err(OverlayError::InvalidGeometry {
            id: polygon.id.clone(),
            reason: format!("outer ring has {} vertices, need at least 3", outer.len()),
        });
    }
    Ok(())
}

/// Indices of the markers contained in the polygon: grid pre-filter,
/// then bounds check, then the exact ray-cast test.
fn contained_markers(polygon: &Polygon, markers: &[Marker], grid: &MarkerGrid) -> Vec<usize> {
    let Some(bounds) = polygon.bounds() else {
        return Vec::new();
    };
    let mut candidates = grid.query_bounds(&bounds);
    candidates.retain(|&i| {
        bounds.contains(markers[i].position) && point_in_polygon(markers[i].position, polygon)
    });
    candidates
}

/// Visibility decision per polygon: visible iff at least one marker is
/// contained. An empty marker set hides every polygon.
///
/// Pure and idempotent; polygons with unusable geometry are skipped with
/// a warning and absent from the result (absent = hidden).
pub fn classify(
    polygons: &[Polygon],
    markers: &[Marker],
    settings: &OverlaySettings,
) -> HashMap<String, bool> {
    let grid = MarkerGrid::build(markers.iter().map(|m| m.position), settings.cell_size_deg);

    polygons
        .par_iter()
        .filter_map(|polygon| {
            if let Err(err) = validate_polygon(polygon) {
                warn!(%err, "skipping polygon");
                return None;
            }
            let visible = !contained_markers(polygon, markers, &grid).is_empty();
            Some((polygon.id.clone(), visible))
        })
        .collect()
}

/// One full classification pass: visibility plus label anchor per
/// polygon, against a single consistent (polygons, markers) snapshot.
pub fn classify_and_place<P>(
    polygons: &[Polygon],
    markers: &[Marker],
    projection: &P,
    settings: &OverlaySettings,
) -> HashMap<String, ClassificationResult>
where
    P: Projection + Sync + ?Sized,
{
    let grid = MarkerGrid::build(markers.iter().map(|m| m.position), settings.cell_size_deg);

    polygons
        .par_iter()
        .filter_map(|polygon| {
            if let Err(err) = validate_polygon(polygon) {
                warn!(%err, "skipping polygon");
                return None;
            }
            let contained: Vec<LatLng> = contained_markers(polygon, markers, &grid)
                .into_iter()
                .map(|i| markers[i].position)
                .collect();
            let anchor = place_label(polygon, &contained, projection, settings.label_offset_px)?;
            Some((
                polygon.id.clone(),
                ClassificationResult {
                    visible: !contained.is_empty(),
                    anchor,
                },
            ))
        })
        .collect()
}
