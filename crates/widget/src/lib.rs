pub mod capability;
pub mod events;
pub mod geo;
pub mod poi;
pub mod scripted;

// Widget crate: the boundary to the external interactive map, plus a
// deterministic in-process stand-in for tests and offline replay.
pub use capability::*;
pub use events::*;
pub use geo::*;
pub use poi::*;
pub use scripted::*;
