use crate::model::LatLng;
use std::f64::consts::PI;

/// Forward/inverse map projection seam.
///
/// The hosting map widget owns the real projection; the engine only needs
/// these two callbacks to reason about screen-space distances when
/// placing labels. Implementations must be pure so classification passes
/// stay idempotent.
pub trait Projection {
    /// Geographic coordinate to screen pixels (x right, y down)
    fn project(&self, pos: LatLng) -> (f64, f64);

    /// Screen pixels back to a geographic coordinate
    fn unproject(&self, x: f64, y: f64) -> LatLng;
}

/// Trivial equirectangular projection: degrees scaled straight to
/// pixels. Handy for tests and for hosts that render unprojected data.
#[derive(Clone, Copy, Debug)]
pub struct PlateCarree {
    px_per_degree: f64,
}

impl PlateCarree {
    pub fn new(px_per_degree: f64) -> Self {
        Self { px_per_degree }
    }
}

impl Projection for PlateCarree {
    fn project(&self, pos: LatLng) -> (f64, f64) {
        (pos.lng * self.px_per_degree, -pos.lat * self.px_per_degree)
    }

    fn unproject(&self, x: f64, y: f64) -> LatLng {
        LatLng::new(-y / self.px_per_degree, x / self.px_per_degree)
    }
}

/// Web Mercator viewport: a center, a zoom factor, and a pixel size.
///
/// Matches the projection used by slippy-tile map widgets, so label
/// offsets computed through it line up with what the user sees.
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center latitude (-90 to 90)
    pub center_lat: f64,
    /// Center longitude (-180 to 180)
    pub center_lng: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: f64,
    /// Canvas pixel height
    pub height: f64,
}

impl Viewport {
    pub fn new(center_lat: f64, center_lng: f64, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center_lat,
            center_lng,
            zoom,
            width,
            height,
        }
    }

    /// A viewport showing the whole world
    pub fn world(width: f64, height: f64) -> Self {
        Self::new(20.0, 0.0, 1.0, width, height)
    }

    /// Normalized Web Mercator y for a latitude in radians
    fn mercator_y(lat_rad: f64) -> f64 {
        (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
    }

    fn scale(&self) -> f64 {
        self.zoom * self.width
    }
}

impl Projection for Viewport {
    fn project(&self, pos: LatLng) -> (f64, f64) {
        let x = (pos.lng + 180.0) / 360.0;
        let y = Self::mercator_y(pos.lat.to_radians());

        let center_x = (self.center_lng + 180.0) / 360.0;
        let center_y = Self::mercator_y(self.center_lat.to_radians());

        let scale = self.scale();
        let px = (x - center_x) * scale + self.width / 2.0;
        let py = (y - center_y) * scale + self.height / 2.0;
        (px, py)
    }

    fn unproject(&self, px: f64, py: f64) -> LatLng {
        let scale = self.scale();
        let center_x = (self.center_lng + 180.0) / 360.0;
        let center_y = Self::mercator_y(self.center_lat.to_radians());

        let x = (px - self.width / 2.0) / scale + center_x;
        let y = (py - self.height / 2.0) / scale + center_y;

        let lng = x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
        LatLng::new(lat, lng)
    }
}
