use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use coverage::{
    coverage_query, room_map_query, CoverageParameters, CoverageService, RenderPanel,
    ServiceConfig,
};
use interaction::MapController;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use widget::{LngLat, MapEvent, MapView, Poi, PoiId, ScriptedWidget};

/// Demo floor the replay runs on.
const FLOOR_LEVEL: f64 = 2.0;

/// Campus view the widget jumps to once loaded.
const CAMPUS_CENTER: LngLat = LngLat {
    lng: 10.404263674366945,
    lat: 63.41732271104283,
};
const CAMPUS_ZOOM: f64 = 15.5;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let params = params_from_env()?;
    let out_dir = PathBuf::from(env::var("PLANNER_OUT").unwrap_or_else(|_| "planner-out".into()));

    let widget = Arc::new(demo_floor());
    let mut controller =
        MapController::new().with_initial_view(MapView::new(CAMPUS_CENTER, CAMPUS_ZOOM));
    controller.attach_widget(widget.clone());

    // Replay a user session: load handshake, a few POI clicks (including a
    // toggle-off and a click on empty floor), then the render round-trip.
    let session = [
        MapEvent::LoadComplete,
        click(10.4040, 63.4170),
        click(10.4045, 63.4175),
        click(10.4050, 63.4180),
        click(10.4045, 63.4175),
        click(10.4100, 63.4200),
    ];
    let mut outcomes = Vec::with_capacity(session.len());
    for event in session {
        let outcome = controller.handle_event(event).await;
        info!(?event, ?outcome, "replayed event");
        outcomes.push(format!("{outcome:?}"));
    }

    let ids = controller.selected_ids();
    let room_map = room_map_query(&ids, params.grid_resolution());
    let solve = coverage_query(&ids, params.grid_resolution(), params.max_path_loss());
    info!(
        selected = ids.len(),
        room_map = room_map.as_ref().map(|q| q.as_str()).unwrap_or("-"),
        solve = solve.as_ref().map(|q| q.as_str()).unwrap_or("-"),
        "session replayed"
    );

    let service = CoverageService::new(ServiceConfig::from_env())
        .map_err(|e| format!("failed to set up the render service client: {e}"))?;
    let mut panel = RenderPanel::new();

    let room_refresh = panel.refresh_room_map(&service, &ids, &params).await;
    let solve_refresh = panel.refresh_coverage(&service, &ids, &params).await;

    if let Some(image) = panel.room_map() {
        write_image(&out_dir, "room_map.png", image.as_bytes())?;
    }
    if let Some(image) = panel.coverage() {
        write_image(&out_dir, "coverage.png", image.as_bytes())?;
    }
    if panel.room_map().is_none() && panel.coverage().is_none() {
        warn!("no images fetched; is the render service up? (set COVERAGE_URL)");
    }

    let summary = json!({
        "selected_poids": ids.iter().map(|id| id.0).collect::<Vec<_>>(),
        "grid_resolution": params.grid_resolution(),
        "max_path_loss": params.max_path_loss(),
        "room_map_query": room_map.as_ref().map(|q| q.as_str()),
        "coverage_query": solve.as_ref().map(|q| q.as_str()),
        "room_map_refresh": format!("{room_refresh:?}"),
        "coverage_refresh": format!("{solve_refresh:?}"),
        "outcomes": outcomes,
    });
    println!("{}", serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?);

    Ok(())
}

fn params_from_env() -> Result<CoverageParameters, String> {
    let defaults = CoverageParameters::default();
    let grid_resolution = match env::var("GRID_RESOLUTION") {
        Ok(raw) => raw
            .parse::<f64>()
            .map_err(|e| format!("bad GRID_RESOLUTION {raw:?}: {e}"))?,
        Err(_) => defaults.grid_resolution(),
    };
    let max_path_loss = match env::var("MAX_PATH_LOSS") {
        Ok(raw) => raw
            .parse::<u32>()
            .map_err(|e| format!("bad MAX_PATH_LOSS {raw:?}: {e}"))?,
        Err(_) => defaults.max_path_loss(),
    };
    CoverageParameters::new(grid_resolution, max_path_loss).map_err(|e| e.to_string())
}

fn demo_floor() -> ScriptedWidget {
    ScriptedWidget::with_pois(
        FLOOR_LEVEL,
        [
            Poi::new(PoiId(3), LngLat::new(10.4040, 63.4170), FLOOR_LEVEL),
            Poi::new(PoiId(7), LngLat::new(10.4045, 63.4175), FLOOR_LEVEL),
            Poi::new(PoiId(2), LngLat::new(10.4050, 63.4180), FLOOR_LEVEL),
            Poi::new(PoiId(5), LngLat::new(10.4060, 63.4190), FLOOR_LEVEL),
        ],
    )
}

fn click(lng: f64, lat: f64) -> MapEvent {
    MapEvent::Click {
        at: LngLat::new(lng, lat),
    }
}

fn write_image(out_dir: &Path, name: &str, bytes: &[u8]) -> Result<(), String> {
    fs::create_dir_all(out_dir).map_err(|e| format!("failed to create {}: {e}", out_dir.display()))?;
    let path = out_dir.join(name);
    fs::write(&path, bytes).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    info!(path = %path.display(), "wrote rendered image");
    Ok(())
}
