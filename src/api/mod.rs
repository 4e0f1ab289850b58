mod config;
mod histogram_view;
mod invalidation;
mod loader;
mod map_view;
mod pipeline;
mod session;

pub use config::{AtlasConfig, AtlasStyle, HistogramMargins};
pub use histogram_view::{HistogramInputs, X_AXIS_LABEL, build_histogram_layer};
pub use invalidation::{DerivedValue, InputTopic, InputTopics};
pub use loader::load_session;
pub use map_view::build_map_layer;
pub use pipeline::{
    AtlasLayout, Backdrop, Pipeline, PipelineInputs, filtered_dataset, histogram_bins,
    histogram_x_scale, size_scale,
};
pub use session::{
    LoadState, SessionFrame, SessionResolver, SessionSnapshot, ViewSession,
};
