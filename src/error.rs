use thiserror::Error;

/// Which of the two asynchronous input feeds an error refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feed {
    Markers,
    Polygons,
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feed::Markers => write!(f, "markers"),
            Feed::Polygons => write!(f, "polygons"),
        }
    }
}

/// Errors surfaced by the overlay engine.
///
/// Geometry errors are recovered per polygon (the polygon is skipped and
/// stays hidden); they never abort a classification pass.
#[derive(Error, Debug, Clone)]
pub enum OverlayError {
    /// Polygon geometry unusable for containment testing
    #[error("invalid geometry for polygon '{id}': {reason}")]
    InvalidGeometry { id: String, reason: String },

    /// An input feed failed to deliver
    #[error("{feed} feed failed: {message}")]
    LoadFailure { feed: Feed, message: String },

    /// The polygon feed delivers once per map instance; a second delivery
    /// means the host should construct a new instance instead
    #[error("polygon set already loaded for this instance")]
    PolygonsAlreadyLoaded,
}
