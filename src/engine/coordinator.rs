use crate::engine::{classify_and_place, OverlaySettings};
use crate::error::{Feed, OverlayError};
use crate::geom::Projection;
use crate::model::{ClassificationResult, LoadState, Marker, Polygon};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Immutable classification output, swapped in wholesale per pass so a
/// reader never observes a half-updated map
pub type ResultSnapshot = Arc<HashMap<String, ClassificationResult>>;

/// Notifications pushed to the rendering collaborator
pub enum OverlayEvent {
    /// A classification pass finished; carries the fresh snapshot
    Classified(ResultSnapshot),
    /// An input feed reported failure; load state is unchanged
    LoadFailed(OverlayError),
}

type Subscriber = Box<dyn Fn(&OverlayEvent) + Send + Sync>;

/// Joins the two independently-arriving inputs and re-runs
/// classification once per consistent pair.
///
/// The polygon feed delivers once per map instance; the marker feed
/// replaces its snapshot repeatedly (last write wins). The first moment
/// both are present triggers a pass, and every later marker replacement
/// triggers exactly one more. One coordinator belongs to one map
/// instance and expects a single logical owner; it is not a
/// multi-threaded mutation point.
pub struct Coordinator<P: Projection + Sync> {
    projection: P,
    settings: OverlaySettings,
    state: LoadState,
    markers: Vec<Marker>,
    polygons: Vec<Polygon>,
    results: Arc<RwLock<ResultSnapshot>>,
    subscribers: Vec<Subscriber>,
    pass_running: bool,
    pass_pending: bool,
}

impl<P: Projection + Sync> Coordinator<P> {
    pub fn new(projection: P, settings: OverlaySettings) -> Self {
        Self {
            projection,
            settings,
            state: LoadState::default(),
            markers: Vec::new(),
            polygons: Vec::new(),
            results: Arc::new(RwLock::new(Arc::new(HashMap::new()))),
            subscribers: Vec::new(),
            pass_running: false,
            pass_pending: false,
        }
    }

    /// Register for classification and feed-failure notifications
    pub fn subscribe(&mut self, subscriber: impl Fn(&OverlayEvent) + Send + Sync + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    /// Latest classification snapshot (empty until both feeds have
    /// delivered — a polygon with no entry is not-yet-classified, which
    /// renderers must treat as hidden)
    pub fn results(&self) -> ResultSnapshot {
        self.results.read().clone()
    }

    /// Shared handle a renderer can keep and read between notifications
    pub fn shared_results(&self) -> Arc<RwLock<ResultSnapshot>> {
        self.results.clone()
    }

    /// Accept the one-time polygon delivery.
    ///
    /// Polygons load once per map instance; reloading them means
    /// constructing a new instance, so a second delivery is rejected.
    pub fn polygons_loaded(&mut self, polygons: Vec<Polygon>) -> Result<(), OverlayError> {
        if self.state.polygons_ready {
            return Err(OverlayError::PolygonsAlreadyLoaded);
        }
        debug!(count = polygons.len(), "polygon feed delivered");
        self.polygons = polygons;
        self.state.polygons_ready = true;
        if self.state.both_ready() {
            self.schedule_pass();
        }
        Ok(())
    }

    /// Replace the marker snapshot wholesale.
    ///
    /// Updates arriving before the polygon feed only overwrite the
    /// retained snapshot (last write wins); once both feeds are present,
    /// every call triggers exactly one classification pass.
    pub fn markers_updated(&mut self, markers: Vec<Marker>) {
        debug!(count = markers.len(), "marker snapshot replaced");
        self.markers = markers;
        self.state.markers_ready = true;
        if self.state.both_ready() {
            self.schedule_pass();
        }
    }

    /// Record a feed failure reported by a loader.
    ///
    /// The flag state is left untouched (classification simply never
    /// triggers for the missing input) and the failure is surfaced to
    /// subscribers; the coordinator never retries on its own.
    pub fn feed_failed(&mut self, feed: Feed, message: impl Into<String>) {
        let error = OverlayError::LoadFailure {
            feed,
            message: message.into(),
        };
        warn!(%error, "input feed failed");
        self.emit(&OverlayEvent::LoadFailed(error));
    }

    /// Run a classification pass, coalescing requests that arrive while
    /// one is already in flight so two passes can never interleave
    /// writes to the shared snapshot.
    fn schedule_pass(&mut self) {
        self.pass_pending = true;
        if self.pass_running {
            return;
        }

        self.pass_running = true;
        while self.pass_pending {
            self.pass_pending = false;
            let snapshot: ResultSnapshot = Arc::new(classify_and_place(
                &self.polygons,
                &self.markers,
                &self.projection,
                &self.settings,
            ));
            debug!(
                polygons = self.polygons.len(),
                markers = self.markers.len(),
                visible = snapshot.values().filter(|r| r.visible).count(),
                "classification pass complete"
            );
            *self.results.write() = snapshot.clone();
            self.emit(&OverlayEvent::Classified(snapshot));
        }
        self.pass_running = false;
    }

    fn emit(&self, event: &OverlayEvent) {
        for subscriber in &self.subscribers {
            subscriber(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{point_in_polygon, PlateCarree};
    use crate::model::{LatLng, Ring};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn square(id: &str, lat0: f64, lng0: f64, size: f64) -> Polygon {
        let ring: Ring = vec![
            LatLng::new(lat0, lng0),
            LatLng::new(lat0, lng0 + size),
            LatLng::new(lat0 + size, lng0 + size),
            LatLng::new(lat0 + size, lng0),
        ];
        Polygon::new(id, vec![ring])
    }

    fn coordinator_with_counter() -> (Coordinator<PlateCarree>, Arc<AtomicUsize>) {
        let mut coordinator =
            Coordinator::new(PlateCarree::new(1.0), OverlaySettings::default());
        let passes = Arc::new(AtomicUsize::new(0));
        let seen = passes.clone();
        coordinator.subscribe(move |event| {
            if matches!(event, OverlayEvent::Classified(_)) {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });
        (coordinator, passes)
    }

    #[test]
    fn polygons_then_markers_classifies_once() {
        let (mut coordinator, passes) = coordinator_with_counter();

        coordinator
            .polygons_loaded(vec![square("p", 0.0, 0.0, 10.0), square("q", 20.0, 20.0, 10.0)])
            .unwrap();
        assert_eq!(passes.load(Ordering::SeqCst), 0);
        assert!(coordinator.results().is_empty());

        coordinator.markers_updated(vec![Marker::new("m", 5.0, 5.0)]);
        assert_eq!(passes.load(Ordering::SeqCst), 1);

        let results = coordinator.results();
        assert!(results["p"].visible);
        assert!(!results["q"].visible);
    }

    #[test]
    fn markers_then_polygons_classifies_once() {
        let (mut coordinator, passes) = coordinator_with_counter();

        coordinator.markers_updated(vec![Marker::new("m", 5.0, 5.0)]);
        // Only one feed is in; no visibility decision may exist yet.
        assert_eq!(passes.load(Ordering::SeqCst), 0);
        assert!(coordinator.results().is_empty());

        coordinator
            .polygons_loaded(vec![square("p", 0.0, 0.0, 10.0)])
            .unwrap();
        assert_eq!(passes.load(Ordering::SeqCst), 1);
        assert!(coordinator.results()["p"].visible);
    }

    #[test]
    fn marker_updates_retrigger_with_fresh_results() {
        let (mut coordinator, passes) = coordinator_with_counter();

        coordinator
            .polygons_loaded(vec![square("p", 0.0, 0.0, 10.0), square("q", 20.0, 20.0, 10.0)])
            .unwrap();
        coordinator.markers_updated(vec![Marker::new("m", 5.0, 5.0)]);
        assert_eq!(passes.load(Ordering::SeqCst), 1);

        // The marker moved into q; exactly one more pass, rebuilt wholesale.
        coordinator.markers_updated(vec![Marker::new("m", 25.0, 25.0)]);
        assert_eq!(passes.load(Ordering::SeqCst), 2);

        let results = coordinator.results();
        assert!(!results["p"].visible);
        assert!(results["q"].visible);
    }

    #[test]
    fn pre_barrier_marker_updates_keep_last_write() {
        let (mut coordinator, passes) = coordinator_with_counter();

        coordinator.markers_updated(vec![Marker::new("m", 25.0, 25.0)]);
        coordinator.markers_updated(vec![Marker::new("m", 5.0, 5.0)]);
        assert_eq!(passes.load(Ordering::SeqCst), 0);

        coordinator
            .polygons_loaded(vec![square("p", 0.0, 0.0, 10.0), square("q", 20.0, 20.0, 10.0)])
            .unwrap();
        assert_eq!(passes.load(Ordering::SeqCst), 1);

        let results = coordinator.results();
        assert!(results["p"].visible);
        assert!(!results["q"].visible);
    }

    #[test]
    fn second_polygon_delivery_is_rejected() {
        let mut coordinator =
            Coordinator::new(PlateCarree::new(1.0), OverlaySettings::default());
        coordinator
            .polygons_loaded(vec![square("p", 0.0, 0.0, 10.0)])
            .unwrap();
        let err = coordinator
            .polygons_loaded(vec![square("q", 20.0, 20.0, 10.0)])
            .unwrap_err();
        assert!(matches!(err, OverlayError::PolygonsAlreadyLoaded));
    }

    #[test]
    fn feed_failure_surfaces_without_flipping_flags() {
        let mut coordinator =
            Coordinator::new(PlateCarree::new(1.0), OverlaySettings::default());
        let failures = Arc::new(AtomicUsize::new(0));
        let seen = failures.clone();
        coordinator.subscribe(move |event| {
            if matches!(event, OverlayEvent::LoadFailed(_)) {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        coordinator.feed_failed(Feed::Polygons, "fetch timed out");
        assert_eq!(failures.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.load_state(), LoadState::default());
        assert!(coordinator.results().is_empty());
    }

    #[test]
    fn anchors_from_the_coordinator_stay_inside_their_polygons() {
        let mut coordinator =
            Coordinator::new(PlateCarree::new(1.0), OverlaySettings::default());
        let polygons = vec![square("p", 0.0, 0.0, 10.0), square("q", 20.0, 20.0, 10.0)];
        coordinator.polygons_loaded(polygons.clone()).unwrap();
        coordinator.markers_updated(vec![Marker::new("m", 3.0, 4.0)]);

        for (id, entry) in coordinator.results().iter() {
            let polygon = polygons.iter().find(|p| &p.id == id).unwrap();
            assert!(point_in_polygon(entry.anchor, polygon));
        }
    }
}
