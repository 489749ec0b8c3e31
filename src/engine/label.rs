use crate::geom::{centroid, offset_away_from, point_in_polygon, Projection};
use crate::model::{LatLng, Polygon};

/// Compute the label anchor for a polygon given the markers it contains.
///
/// The preferred anchor is the outer-ring centroid pushed `offset_px`
/// screen pixels away from the contained markers' average position (or
/// straight screen-up when no markers are contained, which the kernel's
/// zero-vector fallback produces from a coincident cluster). The
/// candidate is only accepted while it stays inside the polygon;
/// otherwise the centroid itself is the anchor.
///
/// Returns `None` only for polygons without a usable outer ring.
pub fn place_label<P>(
    polygon: &Polygon,
    contained: &[LatLng],
    projection: &P,
    offset_px: f64,
) -> Option<LatLng>
where
    P: Projection + ?Sized,
{
    let center = centroid(polygon.outer_ring()?)?;

    let cluster_avg = if contained.is_empty() {
        center
    } else {
        let n = contained.len() as f64;
        let (lat_sum, lng_sum) = contained
            .iter()
            .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
        LatLng::new(lat_sum / n, lng_sum / n)
    };

    let candidate = offset_away_from(center, cluster_avg, offset_px, projection);
    if point_in_polygon(candidate, polygon) {
        Some(candidate)
    } else {
        Some(center)
    }
}
