use crate::geo::LngLat;

/// Raw widget events, one tagged variant per event source.
///
/// Keeping the payloads concrete makes the controller's transition table
/// exhaustive: a `match` on this enum covers every event the widget can
/// deliver.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MapEvent {
    /// The widget finished its asynchronous load handshake.
    LoadComplete,
    /// The user clicked the map at a geographic coordinate.
    Click { at: LngLat },
}
