use std::sync::Arc;

use parking_lot::Mutex;

use crate::capability::{BoxFuture, MapWidget, Marker, WidgetError};
use crate::geo::{LngLat, MapView};
use crate::poi::Poi;

/// Default pick radius in degree space, roughly five meters indoors.
pub const DEFAULT_PICK_RADIUS: f64 = 5.0e-5;

#[derive(Debug, Default)]
struct State {
    z_level: f64,
    pois: Vec<Poi>,
    jumps: Vec<MapView>,
    markers_attached: u64,
    markers_removed: u64,
    resolve_fails: bool,
    attach_fails: bool,
}

/// Deterministic in-process widget for tests and offline replay.
///
/// The real widget lives outside the process; this one holds a fixed POI
/// table and answers spatial queries from it.
///
/// Picking contract:
/// - Only POIs on the queried vertical level are considered.
/// - The closest POI within the pick radius wins; ties break toward the
///   lower id.
pub struct ScriptedWidget {
    state: Arc<Mutex<State>>,
    pick_radius: f64,
}

impl ScriptedWidget {
    pub fn new(z_level: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                z_level,
                ..State::default()
            })),
            pick_radius: DEFAULT_PICK_RADIUS,
        }
    }

    pub fn with_pois(z_level: f64, pois: impl IntoIterator<Item = Poi>) -> Self {
        let widget = Self::new(z_level);
        widget.state.lock().pois = pois.into_iter().collect();
        widget
    }

    pub fn with_pick_radius(mut self, pick_radius: f64) -> Self {
        self.pick_radius = pick_radius;
        self
    }

    pub fn add_poi(&self, poi: Poi) {
        self.state.lock().pois.push(poi);
    }

    /// Switches the displayed vertical level; NaN selects a level-agnostic
    /// view.
    pub fn set_z_level(&self, z_level: f64) {
        self.state.lock().z_level = z_level;
    }

    /// Makes every following spatial query fail, for error-path tests.
    pub fn set_resolve_fails(&self, fails: bool) {
        self.state.lock().resolve_fails = fails;
    }

    /// Makes every following marker attach fail, for error-path tests.
    pub fn set_attach_fails(&self, fails: bool) {
        self.state.lock().attach_fails = fails;
    }

    pub fn markers_attached(&self) -> u64 {
        self.state.lock().markers_attached
    }

    pub fn markers_removed(&self) -> u64 {
        self.state.lock().markers_removed
    }

    pub fn jumps(&self) -> Vec<MapView> {
        self.state.lock().jumps.clone()
    }
}

struct ScriptedMarker {
    state: Arc<Mutex<State>>,
}

impl Marker for ScriptedMarker {
    fn remove(self: Box<Self>) {
        self.state.lock().markers_removed += 1;
    }
}

impl MapWidget for ScriptedWidget {
    fn z_level(&self) -> f64 {
        self.state.lock().z_level
    }

    fn jump_to(&self, view: MapView) {
        self.state.lock().jumps.push(view);
    }

    fn resolve_poi_at(
        &self,
        at: LngLat,
        z_level: f64,
    ) -> BoxFuture<'_, Result<Option<Poi>, WidgetError>> {
        let result = {
            let state = self.state.lock();
            if state.resolve_fails {
                Err(WidgetError::new("spatial query unavailable"))
            } else {
                Ok(state
                    .pois
                    .iter()
                    .filter(|poi| poi.z_level == z_level)
                    .map(|poi| (poi.position.distance(at), poi))
                    .filter(|(d, _)| *d <= self.pick_radius)
                    .min_by(|(da, a), (db, b)| {
                        da.total_cmp(db).then_with(|| a.id.cmp(&b.id))
                    })
                    .map(|(_, poi)| poi.clone()))
            }
        };
        Box::pin(async move { result })
    }

    fn attach_marker(&self, _at: LngLat, _z_level: f64) -> Result<Box<dyn Marker>, WidgetError> {
        let mut state = self.state.lock();
        if state.attach_fails {
            return Err(WidgetError::new("marker attach unavailable"));
        }
        state.markers_attached += 1;
        Ok(Box::new(ScriptedMarker {
            state: Arc::clone(&self.state),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::ScriptedWidget;
    use crate::capability::MapWidget;
    use crate::geo::LngLat;
    use crate::poi::{Poi, PoiId};

    fn poi(id: u64, lng: f64, lat: f64, z: f64) -> Poi {
        Poi::new(PoiId(id), LngLat::new(lng, lat), z)
    }

    #[tokio::test]
    async fn picks_closest_poi_within_radius() {
        let w = ScriptedWidget::with_pois(
            2.0,
            [poi(1, 10.0, 63.0, 2.0), poi(2, 10.00002, 63.0, 2.0)],
        );
        let hit = w
            .resolve_poi_at(LngLat::new(10.00003, 63.0), 2.0)
            .await
            .unwrap();
        assert_eq!(hit.unwrap().id, PoiId(2));
    }

    #[tokio::test]
    async fn tie_breaks_toward_lower_id() {
        let w = ScriptedWidget::with_pois(
            2.0,
            [poi(7, 10.0, 63.0, 2.0), poi(3, 10.0, 63.0, 2.0)],
        );
        let hit = w.resolve_poi_at(LngLat::new(10.0, 63.0), 2.0).await.unwrap();
        assert_eq!(hit.unwrap().id, PoiId(3));
    }

    #[tokio::test]
    async fn ignores_pois_on_other_levels() {
        let w = ScriptedWidget::with_pois(2.0, [poi(1, 10.0, 63.0, 3.0)]);
        let hit = w.resolve_poi_at(LngLat::new(10.0, 63.0), 2.0).await.unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn misses_outside_pick_radius() {
        let w = ScriptedWidget::with_pois(2.0, [poi(1, 10.0, 63.0, 2.0)]);
        let hit = w.resolve_poi_at(LngLat::new(10.1, 63.0), 2.0).await.unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn level_agnostic_view_resolves_nothing() {
        let w = ScriptedWidget::with_pois(f64::NAN, [poi(1, 10.0, 63.0, f64::NAN)]);
        let hit = w
            .resolve_poi_at(LngLat::new(10.0, 63.0), w.z_level())
            .await
            .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn marker_counters_track_attach_and_remove() {
        let w = ScriptedWidget::new(1.0);
        let marker = w.attach_marker(LngLat::new(10.0, 63.0), 1.0).unwrap();
        assert_eq!(w.markers_attached(), 1);
        assert_eq!(w.markers_removed(), 0);

        marker.remove();
        assert_eq!(w.markers_removed(), 1);
    }
}
