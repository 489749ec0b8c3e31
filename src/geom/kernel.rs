use crate::geom::projection::Projection;
use crate::model::{Bounds, LatLng, Polygon, Ring};
use glam::DVec2;

/// Even-odd ray-cast containment test against a single ring.
///
/// An edge counts as a crossing when it straddles the point's latitude
/// (`(lat_i > lat) != (lat_j > lat)`, strict, so horizontal edges and
/// shared vertices never double-count) and its intersection longitude at
/// that latitude exceeds the point's longitude. Rings with fewer than 3
/// vertices contain nothing.
pub fn point_in_ring(point: LatLng, ring: &[LatLng]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        if (a.lat > point.lat) != (b.lat > point.lat) {
            let t = (point.lat - a.lat) / (b.lat - a.lat);
            let crossing_lng = a.lng + t * (b.lng - a.lng);
            if crossing_lng > point.lng {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Full polygon containment: inside the outer ring and not inside any
/// hole ring.
pub fn point_in_polygon(point: LatLng, polygon: &Polygon) -> bool {
    let Some(outer) = polygon.outer_ring() else {
        return false;
    };
    if !point_in_ring(point, outer) {
        return false;
    }
    !polygon.holes().iter().any(|hole| point_in_ring(point, hole))
}

/// Axis-aligned bounds of a ring; `None` for an empty ring
pub fn bounds_of_ring(ring: &Ring) -> Option<Bounds> {
    Bounds::of_points(ring.iter().copied())
}

/// Bounds covering a set of loose points (e.g. the current marker
/// snapshot, for hosts that fit their viewport to it)
pub fn bounds_of_points(points: impl IntoIterator<Item = LatLng>) -> Option<Bounds> {
    Bounds::of_points(points)
}

/// Arithmetic mean of the ring's vertices.
///
/// Not an area-weighted centroid; for label anchoring the vertex mean is
/// close enough and much cheaper.
pub fn centroid(ring: &[LatLng]) -> Option<LatLng> {
    if ring.is_empty() {
        return None;
    }
    let n = ring.len() as f64;
    let (lat_sum, lng_sum) = ring
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Some(LatLng::new(lat_sum / n, lng_sum / n))
}

/// Displace `center` away from `cluster_avg` by `px_distance` screen
/// pixels, projecting through the host's map projection.
///
/// When the two points coincide on screen there is no direction to flee;
/// the fixed screen-up vector `(0, -px_distance)` is substituted.
pub fn offset_away_from<P: Projection + ?Sized>(
    center: LatLng,
    cluster_avg: LatLng,
    px_distance: f64,
    projection: &P,
) -> LatLng {
    let (cx, cy) = projection.project(center);
    let (mx, my) = projection.project(cluster_avg);

    let away = DVec2::new(cx - mx, cy - my);
    let dir = if away.length_squared() > 0.0 {
        away.normalize()
    } else {
        DVec2::new(0.0, -1.0)
    };

    let target = DVec2::new(cx, cy) + dir * px_distance;
    projection.unproject(target.x, target.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::projection::PlateCarree;

    fn square() -> Ring {
        vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 10.0),
            LatLng::new(10.0, 10.0),
            LatLng::new(10.0, 0.0),
        ]
    }

    #[test]
    fn square_containment() {
        let ring = square();
        assert!(point_in_ring(LatLng::new(5.0, 5.0), &ring));
        assert!(!point_in_ring(LatLng::new(15.0, 15.0), &ring));
        assert!(!point_in_ring(LatLng::new(-1.0, 5.0), &ring));
    }

    #[test]
    fn edge_points_have_stable_answers() {
        // Strict comparisons make boundary answers asymmetric but stable:
        // west and south edges count as inside (the far edge still
        // crosses the ray), east and north edges as outside.
        let ring = square();
        assert!(point_in_ring(LatLng::new(5.0, 0.0), &ring));
        assert!(!point_in_ring(LatLng::new(5.0, 10.0), &ring));
        assert!(point_in_ring(LatLng::new(0.0, 5.0), &ring));
        assert!(!point_in_ring(LatLng::new(10.0, 5.0), &ring));
    }

    #[test]
    fn degenerate_ring_contains_nothing() {
        let line = vec![LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0)];
        assert!(!point_in_ring(LatLng::new(5.0, 5.0), &line));
        assert!(!point_in_ring(LatLng::new(0.0, 0.0), &[]));
    }

    #[test]
    fn hole_subtracts_from_outer_ring() {
        let hole = vec![
            LatLng::new(4.0, 4.0),
            LatLng::new(4.0, 6.0),
            LatLng::new(6.0, 6.0),
            LatLng::new(6.0, 4.0),
        ];
        let polygon = Polygon::new("donut", vec![square(), hole]);
        // Inside the hole: inside the outer ring but not contained.
        assert!(!point_in_polygon(LatLng::new(5.0, 5.0), &polygon));
        // Between outer ring and hole: contained.
        assert!(point_in_polygon(LatLng::new(2.0, 2.0), &polygon));
        assert!(!point_in_polygon(LatLng::new(15.0, 5.0), &polygon));
    }

    #[test]
    fn polygon_without_rings_contains_nothing() {
        let empty = Polygon::new("empty", vec![]);
        assert!(!point_in_polygon(LatLng::new(0.0, 0.0), &empty));
    }

    #[test]
    fn centroid_is_vertex_mean() {
        let c = centroid(&square()).unwrap();
        assert_eq!(c, LatLng::new(5.0, 5.0));
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn offset_moves_away_from_cluster() {
        let projection = PlateCarree::new(1.0);
        let center = LatLng::new(0.0, 0.0);
        let cluster = LatLng::new(0.0, -5.0); // west of center
        let moved = offset_away_from(center, cluster, 20.0, &projection);
        // Fleeing a cluster to the west means moving east.
        assert!((moved.lng - 20.0).abs() < 1e-9);
        assert!(moved.lat.abs() < 1e-9);
    }

    #[test]
    fn coincident_cluster_falls_back_to_screen_up() {
        let projection = PlateCarree::new(1.0);
        let center = LatLng::new(3.0, 3.0);
        let moved = offset_away_from(center, center, 20.0, &projection);
        // Screen-up is north under PlateCarree.
        assert!((moved.lat - 23.0).abs() < 1e-9);
        assert!((moved.lng - 3.0).abs() < 1e-9);
    }
}
