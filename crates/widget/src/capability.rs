use std::future::Future;
use std::pin::Pin;

use crate::geo::{LngLat, MapView};
use crate::poi::Poi;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type for widget operations.
#[derive(Debug)]
pub struct WidgetError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for WidgetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WidgetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl WidgetError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// A visual pin attached to the widget for a selected POI.
///
/// Removal consumes the handle, so a marker leaves the map exactly once.
pub trait Marker: Send {
    fn remove(self: Box<Self>);
}

/// Trait for interactive map widgets.
///
/// Implementations must be `Send + Sync` for use across async tasks.
/// The spatial query returns a boxed future for dyn-compatibility.
pub trait MapWidget: Send + Sync {
    /// Vertical level the widget is currently displaying.
    ///
    /// NaN means the widget is showing a level-agnostic view; callers must
    /// not issue spatial queries against it.
    fn z_level(&self) -> f64;

    /// Moves the camera.
    fn jump_to(&self, view: MapView);

    /// Resolves the POI, if any, at a coordinate on a vertical level.
    ///
    /// Returns `Ok(None)` when nothing selectable is under the coordinate.
    fn resolve_poi_at(
        &self,
        at: LngLat,
        z_level: f64,
    ) -> BoxFuture<'_, Result<Option<Poi>, WidgetError>>;

    /// Creates a marker pinned at a position on a vertical level and
    /// attaches it to the widget.
    fn attach_marker(&self, at: LngLat, z_level: f64) -> Result<Box<dyn Marker>, WidgetError>;
}
