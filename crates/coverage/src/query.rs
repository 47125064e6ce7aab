use std::fmt::Write as _;

use widget::PoiId;

use crate::params::{MAX_PATH_LOSS_DB, MIN_PATH_LOSS_DB};

/// A fully formed render request, ready to resolve against a base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderQuery {
    path_and_query: String,
}

impl RenderQuery {
    pub fn as_str(&self) -> &str {
        &self.path_and_query
    }
}

impl std::fmt::Display for RenderQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path_and_query)
    }
}

/// Builds the room-map request for the selected POIs.
///
/// Ordering contract:
/// - `poid` parameters follow the order of `ids` exactly (selection
///   insertion order), never numeric order.
///
/// Returns `None` when the request would be degenerate: no POIs, or a
/// non-positive grid resolution. Degenerate requests are never sent.
pub fn room_map_query(ids: &[PoiId], grid_resolution: f64) -> Option<RenderQuery> {
    if ids.is_empty() || !grid_resolution.is_finite() || grid_resolution <= 0.0 {
        return None;
    }
    let mut q = format!("/api/map?gres={}", fmt_resolution(grid_resolution));
    push_poids(&mut q, ids);
    Some(RenderQuery { path_and_query: q })
}

/// Builds the coverage-solve request for the selected POIs.
///
/// Same preconditions as [`room_map_query`], plus the path-loss band.
pub fn coverage_query(
    ids: &[PoiId],
    grid_resolution: f64,
    max_path_loss: u32,
) -> Option<RenderQuery> {
    if ids.is_empty() || !grid_resolution.is_finite() || grid_resolution <= 0.0 {
        return None;
    }
    if !(MIN_PATH_LOSS_DB..=MAX_PATH_LOSS_DB).contains(&max_path_loss) {
        return None;
    }
    let mut q = format!(
        "/api/solve?gres={}&maxloss={max_path_loss}",
        fmt_resolution(grid_resolution)
    );
    push_poids(&mut q, ids);
    Some(RenderQuery { path_and_query: q })
}

// Debug formatting keeps the decimal point ("1.0", not "1"), so equal
// inputs always produce byte-identical query strings.
fn fmt_resolution(value: f64) -> String {
    format!("{value:?}")
}

fn push_poids(query: &mut String, ids: &[PoiId]) {
    for id in ids {
        let _ = write!(query, "&poid={}", id.0);
    }
}
