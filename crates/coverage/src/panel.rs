use tracing::{debug, warn};
use widget::PoiId;

use crate::image::{ImageSlot, Install, RenderedImage};
use crate::params::CoverageParameters;
use crate::query::{coverage_query, room_map_query, RenderQuery};
use crate::service::CoverageService;

/// Outcome of a panel refresh.
#[derive(Debug, PartialEq, Eq)]
pub enum Refresh {
    /// A new image is displayed.
    Updated,
    /// Preconditions ruled the request out; the slot was cleared.
    Cleared,
    /// The fetch failed; the slot kept its previous image.
    Failed,
    /// The response lost the race against a newer request.
    Superseded,
}

/// The two logical display slots and their refresh flows.
///
/// Each slot follows the token protocol of [`ImageSlot`]: a refresh begins
/// a request, fetches, and installs under its token, so a late response
/// can never overwrite a newer one.
#[derive(Debug, Default)]
pub struct RenderPanel {
    room_map: ImageSlot,
    coverage: ImageSlot,
}

impl RenderPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room_map(&self) -> Option<&RenderedImage> {
        self.room_map.image()
    }

    pub fn coverage(&self) -> Option<&RenderedImage> {
        self.coverage.image()
    }

    /// Re-renders the room map for the current selection.
    ///
    /// A degenerate request (empty selection, bad resolution) clears the
    /// slot instead of being sent.
    pub async fn refresh_room_map(
        &mut self,
        service: &CoverageService,
        ids: &[PoiId],
        params: &CoverageParameters,
    ) -> Refresh {
        let Some(query) = room_map_query(ids, params.grid_resolution()) else {
            debug!("room map request ruled out; clearing slot");
            self.room_map.clear();
            return Refresh::Cleared;
        };
        Self::run(service, &mut self.room_map, query).await
    }

    /// Re-runs the coverage solve for the current selection.
    pub async fn refresh_coverage(
        &mut self,
        service: &CoverageService,
        ids: &[PoiId],
        params: &CoverageParameters,
    ) -> Refresh {
        let Some(query) =
            coverage_query(ids, params.grid_resolution(), params.max_path_loss())
        else {
            debug!("coverage request ruled out; clearing slot");
            self.coverage.clear();
            return Refresh::Cleared;
        };
        Self::run(service, &mut self.coverage, query).await
    }

    async fn run(service: &CoverageService, slot: &mut ImageSlot, query: RenderQuery) -> Refresh {
        let token = slot.begin_request();
        match service.fetch_image(&query).await {
            Ok(image) => match slot.install(token, image) {
                // Dropping the displaced image is its release.
                Install::Displayed { replaced: _ } => Refresh::Updated,
                Install::Stale(_) => Refresh::Superseded,
            },
            Err(e) => {
                warn!(error = %e, query = query.as_str(), "image fetch failed; keeping previous image");
                Refresh::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::routing::get;
    use axum::Router;
    use widget::PoiId;

    use super::{Refresh, RenderPanel};
    use crate::params::CoverageParameters;
    use crate::service::{CoverageService, ServiceConfig};

    async fn spawn_stub() -> String {
        let app = Router::new()
            .route("/api/map", get(|| async { "room-map-bytes" }))
            .route("/api/solve", get(|| async { "coverage-bytes" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub");
        });
        format!("http://{addr}")
    }

    fn service(base_url: String) -> CoverageService {
        CoverageService::new(ServiceConfig {
            base_url,
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn refresh_fills_both_slots() {
        let live = service(spawn_stub().await);
        let mut panel = RenderPanel::new();
        let params = CoverageParameters::default();
        let ids = [PoiId(3), PoiId(7)];

        assert_eq!(
            panel.refresh_room_map(&live, &ids, &params).await,
            Refresh::Updated
        );
        assert_eq!(
            panel.refresh_coverage(&live, &ids, &params).await,
            Refresh::Updated
        );
        assert_eq!(panel.room_map().unwrap().as_bytes(), b"room-map-bytes");
        assert_eq!(panel.coverage().unwrap().as_bytes(), b"coverage-bytes");
    }

    #[tokio::test]
    async fn empty_selection_clears_instead_of_fetching() {
        let live = service(spawn_stub().await);
        let mut panel = RenderPanel::new();
        let params = CoverageParameters::default();

        panel
            .refresh_room_map(&live, &[PoiId(1)], &params)
            .await;
        assert!(panel.room_map().is_some());

        assert_eq!(
            panel.refresh_room_map(&live, &[], &params).await,
            Refresh::Cleared
        );
        assert!(panel.room_map().is_none());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_the_previous_image() {
        let live = service(spawn_stub().await);
        let mut panel = RenderPanel::new();
        let params = CoverageParameters::default();
        let ids = [PoiId(1)];

        panel.refresh_room_map(&live, &ids, &params).await;
        assert!(panel.room_map().is_some());

        // Nothing listens on this port; the slot must keep its image.
        let dead = service("http://127.0.0.1:9".to_string());
        assert_eq!(
            panel.refresh_room_map(&dead, &ids, &params).await,
            Refresh::Failed
        );
        assert_eq!(panel.room_map().unwrap().as_bytes(), b"room-map-bytes");
    }
}
