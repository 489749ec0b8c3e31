mod classify;
mod coordinator;
mod label;

pub use classify::{classify, classify_and_place, validate_polygon};
pub use coordinator::{Coordinator, OverlayEvent, ResultSnapshot};
pub use label::place_label;

use serde::{Deserialize, Serialize};

/// Tunables for a classification pass
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Screen-pixel distance labels are pushed away from the marker
    /// cluster they describe
    pub label_offset_px: f64,
    /// Cell size in degrees for the marker pre-filter grid
    pub cell_size_deg: f64,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            label_offset_px: 20.0,
            cell_size_deg: 1.0,
        }
    }
}
