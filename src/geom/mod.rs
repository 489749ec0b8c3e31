mod kernel;
mod projection;
mod spatial;

pub use kernel::{
    bounds_of_points, bounds_of_ring, centroid, offset_away_from, point_in_polygon, point_in_ring,
};
pub use projection::{PlateCarree, Projection, Viewport};
pub use spatial::MarkerGrid;
