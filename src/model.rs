use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A geographic coordinate in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A point marker fed from the host's record source.
///
/// Identity is `id`; a marker is immutable once constructed and the whole
/// set is replaced wholesale on every feed update.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    pub position: LatLng,
    /// Popup text shown when the marker is selected
    pub popup: Option<String>,
    /// Reference to a custom icon resource
    pub icon: Option<String>,
    /// Grouping key for hosts that cluster markers
    pub group: Option<String>,
}

impl Marker {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            position: LatLng::new(lat, lng),
            popup: None,
            icon: None,
            group: None,
        }
    }
}

/// One closed boundary of a polygon (implicitly closed, last vertex
/// connects back to the first)
pub type Ring = Vec<LatLng>;

/// An administrative region polygon.
///
/// `rings[0]` is the outer boundary; any further rings are holes.
/// MultiPolygon geometry is modeled as multiple independent `Polygon`
/// values, never as one polygon with several outer rings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Polygon {
    pub id: String,
    pub rings: Vec<Ring>,
    pub properties: HashMap<String, String>,
}

impl Polygon {
    pub fn new(id: impl Into<String>, rings: Vec<Ring>) -> Self {
        Self {
            id: id.into(),
            rings,
            properties: HashMap::new(),
        }
    }

    /// Outer boundary, if the polygon has one
    pub fn outer_ring(&self) -> Option<&Ring> {
        self.rings.first()
    }

    /// Hole rings (everything after the outer boundary)
    pub fn holes(&self) -> &[Ring] {
        if self.rings.is_empty() {
            &[]
        } else {
            &self.rings[1..]
        }
    }

    /// Axis-aligned bounds of the outer ring
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of_points(self.outer_ring()?.iter().copied())
    }

    /// Popup body listing the polygon's properties, one `key: value` per
    /// line, sorted for stable output
    pub fn popup_text(&self) -> String {
        let mut entries: Vec<_> = self.properties.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Axis-aligned geographic bounding box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Min/max reduction over a point sequence; `None` when empty
    pub fn of_points(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min_lat: first.lat,
            min_lng: first.lng,
            max_lat: first.lat,
            max_lng: first.lng,
        };
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    /// Grow to include a point
    pub fn extend(&mut self, p: LatLng) {
        self.min_lat = self.min_lat.min(p.lat);
        self.min_lng = self.min_lng.min(p.lng);
        self.max_lat = self.max_lat.max(p.lat);
        self.max_lng = self.max_lng.max(p.lng);
    }

    /// Inclusive containment test (cheap pre-filter before the exact
    /// ray-cast test)
    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.min_lat && p.lat <= self.max_lat && p.lng >= self.min_lng && p.lng <= self.max_lng
    }
}

/// Visibility decision and label anchor for one polygon.
///
/// Rebuilt wholesale on every classification pass so a stale
/// visibility/anchor pairing can never survive an input change.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub visible: bool,
    pub anchor: LatLng,
}

/// Readiness of the two independently-arriving inputs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadState {
    pub markers_ready: bool,
    pub polygons_ready: bool,
}

impl LoadState {
    /// Both feeds have delivered at least once
    pub fn both_ready(&self) -> bool {
        self.markers_ready && self.polygons_ready
    }
}
