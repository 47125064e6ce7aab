pub mod image;
pub mod panel;
pub mod params;
pub mod query;
pub mod service;

pub use image::*;
pub use panel::*;
pub use params::*;
pub use query::*;
pub use service::*;
