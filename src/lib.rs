//! brushmap: cross-filtering engine for a linked bubble map and date histogram.
//!
//! A brush on the histogram narrows the time range of the records drawn on
//! the map. Scales, monthly bins and the filtered subset are derived values
//! recomputed from explicit input dependencies; painting is left to a
//! [`render::Renderer`] that receives a fully materialized frame.

pub mod api;
pub mod core;
pub mod error;
pub mod geo;
pub mod interaction;
pub mod render;
pub mod source;
pub mod telemetry;

pub use api::{AtlasConfig, SessionFrame, ViewSession, load_session};
pub use error::{AtlasError, AtlasResult};
