use std::sync::Arc;

use selection::{SelectionStore, Toggle};
use tracing::{debug, warn};
use widget::{LngLat, MapEvent, MapView, MapWidget, PoiId};

/// Lifecycle of the widget handshake.
///
/// `Loading` means the widget instance exists but its asynchronous load
/// completion is still pending; clicks delivered before `Ready` are
/// dropped, not queued.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Loading,
    Ready,
}

/// What a delivered event amounted to.
///
/// One variant per row of the transition table, so tests can assert the
/// exact path an event took.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// First load completion; click handling is live from here on.
    BecameReady,
    /// A repeated load completion, ignored.
    DuplicateLoad,
    /// The event arrived in a state that cannot handle it.
    Dropped,
    /// The widget is showing a level-agnostic view; no query was issued.
    LevelUnavailable,
    /// Nothing selectable under the click.
    Miss,
    /// The spatial query failed; the click was discarded.
    ResolutionFailed,
    /// Marker creation failed; the selection was left untouched.
    MarkerFailed,
    Selected(PoiId),
    Deselected(PoiId),
}

/// Owns the widget handshake and converts raw events into selection
/// operations.
///
/// The widget is handed in rather than constructed here, so the controller
/// can run against any capability implementation.
pub struct MapController {
    widget: Option<Arc<dyn MapWidget>>,
    state: ControllerState,
    selection: SelectionStore,
    initial_view: Option<MapView>,
}

impl MapController {
    pub fn new() -> Self {
        Self {
            widget: None,
            state: ControllerState::Uninitialized,
            selection: SelectionStore::new(),
            initial_view: None,
        }
    }

    /// View jumped to once the widget reports load completion.
    pub fn with_initial_view(mut self, view: MapView) -> Self {
        self.initial_view = Some(view);
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    /// Snapshot of selected ids in click order.
    pub fn selected_ids(&self) -> Vec<PoiId> {
        self.selection.member_ids()
    }

    /// Hands the widget instance to the controller and starts the load
    /// handshake. A repeated attach is ignored.
    pub fn attach_widget(&mut self, widget: Arc<dyn MapWidget>) {
        if self.state != ControllerState::Uninitialized {
            debug!("widget already attached; ignoring");
            return;
        }
        self.widget = Some(widget);
        self.state = ControllerState::Loading;
    }

    /// Removes `id` from the selection, detaching its marker.
    ///
    /// A stale id is reported and otherwise ignored.
    pub fn deselect(&mut self, id: PoiId) {
        if !self.selection.remove(id) {
            warn!(id = id.0, "tried to remove poi {} but it was not selected", id.0);
        }
    }

    /// Drops every selection entry and its marker.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Feeds one widget event through the transition table.
    pub async fn handle_event(&mut self, event: MapEvent) -> EventOutcome {
        match event {
            MapEvent::LoadComplete => self.on_load_complete(),
            MapEvent::Click { at } => self.on_click(at).await,
        }
    }

    fn on_load_complete(&mut self) -> EventOutcome {
        match self.state {
            ControllerState::Uninitialized => {
                debug!("load completion without a widget; dropped");
                EventOutcome::Dropped
            }
            ControllerState::Loading => {
                self.state = ControllerState::Ready;
                if let (Some(widget), Some(view)) = (self.widget.as_deref(), self.initial_view) {
                    widget.jump_to(view);
                }
                EventOutcome::BecameReady
            }
            ControllerState::Ready => EventOutcome::DuplicateLoad,
        }
    }

    async fn on_click(&mut self, at: LngLat) -> EventOutcome {
        if self.state != ControllerState::Ready {
            debug!(?at, "click before ready; dropped");
            return EventOutcome::Dropped;
        }
        let Some(widget) = self.widget.clone() else {
            return EventOutcome::Dropped;
        };

        let z_level = widget.z_level();
        if z_level.is_nan() {
            debug!(?at, "widget shows no vertical level; click ignored");
            return EventOutcome::LevelUnavailable;
        }

        let poi = match widget.resolve_poi_at(at, z_level).await {
            Ok(Some(poi)) => poi,
            Ok(None) => return EventOutcome::Miss,
            Err(e) => {
                warn!(error = %e, ?at, z_level, "spatial query failed; click discarded");
                return EventOutcome::ResolutionFailed;
            }
        };

        let id = poi.id;
        match self
            .selection
            .toggle(poi, |poi| widget.attach_marker(poi.position, z_level))
        {
            Ok(Toggle::Added) => EventOutcome::Selected(id),
            Ok(Toggle::Removed) => EventOutcome::Deselected(id),
            Err(e) => {
                warn!(error = %e, id = id.0, "marker creation failed; selection unchanged");
                EventOutcome::MarkerFailed
            }
        }
    }
}

impl Default for MapController {
    fn default() -> Self {
        Self::new()
    }
}
