use serde::{Deserialize, Serialize};

use crate::geo::LngLat;

/// Identifies a point of interest in a deterministic, stable way.
///
/// This is intentionally a small, copyable handle so selection state and
/// query construction can pass it around without heap allocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoiId(pub u64);

/// A resolved point of interest.
///
/// Produced by the widget's spatial query and immutable from then on. The
/// position is the widget-derived geographic anchor of the POI, which is
/// where a selection marker gets pinned.
#[derive(Debug, Clone, PartialEq)]
pub struct Poi {
    pub id: PoiId,
    pub position: LngLat,
    pub z_level: f64,
}

impl Poi {
    pub fn new(id: PoiId, position: LngLat, z_level: f64) -> Self {
        Self {
            id,
            position,
            z_level,
        }
    }
}
