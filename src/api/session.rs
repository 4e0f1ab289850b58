//! View orchestration for one map + histogram session.
//!
//! A session owns both load slots, the selection store and the derived
//! pipeline. State is confined to one thread behind `Rc<RefCell<_>>`;
//! asynchronous loads write back through a [`SessionResolver`] that holds
//! only a weak reference, so a dropped session discards late results.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::api::config::AtlasConfig;
use crate::api::histogram_view::{HistogramInputs, build_histogram_layer};
use crate::api::invalidation::{DerivedValue, InputTopic, InputTopics};
use crate::api::map_view::build_map_layer;
use crate::api::pipeline::{AtlasLayout, Pipeline, PipelineInputs};
use crate::core::{Bin, Dataset, Scale, Viewport};
use crate::error::{AtlasError, AtlasResult};
use crate::geo::{GeoProjector, GeographyModel};
use crate::interaction::{Brush, BrushEvent, Selection, SelectionStore};
use crate::render::{AtlasFrame, Renderer};

/// Progress of one asynchronous input.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    Pending,
    Ready(T),
    Failed(AtlasError),
}

impl<T> LoadState<T> {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&AtlasError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// What the host should display right now.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionFrame {
    /// At least one input is still in flight.
    Loading,
    /// A source failed or a derived value could not be built.
    Failed(Vec<AtlasError>),
    /// The dataset has no record with a usable date.
    NoData,
    Ready(Box<AtlasFrame>),
}

impl SessionFrame {
    #[must_use]
    pub fn ready(&self) -> Option<&AtlasFrame> {
        match self {
            Self::Ready(frame) => Some(&**frame),
            _ => None,
        }
    }
}

/// Serializable summary of the session's current derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub selection: Selection,
    pub selection_revision: u64,
    pub record_count: usize,
    pub filtered_count: usize,
    pub time_domain: Option<(f64, f64)>,
    pub bins: Vec<Bin>,
}

impl SessionSnapshot {
    pub fn to_json_pretty(&self) -> AtlasResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AtlasError::InvalidData(format!("failed to serialize snapshot: {e}")))
    }
}

#[derive(Debug)]
struct SessionState {
    config: AtlasConfig,
    layout: AtlasLayout,
    geography: LoadState<Arc<GeographyModel>>,
    dataset: LoadState<Dataset>,
    store: SelectionStore,
    brush: Brush,
    pipeline: Pipeline,
}

impl SessionState {
    /// Refreshes derived values; `Ok(false)` when inputs are not ready.
    fn refresh(&mut self) -> AtlasResult<bool> {
        let (Some(geography), Some(dataset)) =
            (self.geography.ready().cloned(), self.dataset.ready().cloned())
        else {
            return Ok(false);
        };
        if dataset.time_extent().is_none() {
            return Ok(false);
        }
        let inputs = PipelineInputs {
            geography: &geography,
            dataset: &dataset,
            selection: self.store.selection(),
            layout: self.layout,
            max_bubble_radius: self.config.max_bubble_radius,
            graticule_step_deg: self.config.graticule_step_deg,
        };
        self.pipeline.refresh(&inputs)?;
        Ok(true)
    }

    fn failures(&self) -> Vec<AtlasError> {
        self.geography
            .error()
            .into_iter()
            .chain(self.dataset.error())
            .cloned()
            .collect()
    }

    fn frame(&mut self) -> SessionFrame {
        let failures = self.failures();
        if !failures.is_empty() {
            return SessionFrame::Failed(failures);
        }
        if self.geography.is_pending() || self.dataset.is_pending() {
            return SessionFrame::Loading;
        }

        match self.refresh() {
            Ok(true) => {}
            Ok(false) => return SessionFrame::NoData,
            Err(err) => {
                error!(error = %err, "derived view state could not be built");
                return SessionFrame::Failed(vec![err]);
            }
        }

        let (Some(x_scale), Some(y_scale)) = (self.pipeline.x_scale(), self.pipeline.y_scale())
        else {
            return SessionFrame::NoData;
        };
        let map = build_map_layer(&mut self.pipeline, &self.config.style);
        let histogram = build_histogram_layer(
            &HistogramInputs {
                layout: self.layout,
                x_scale,
                y_scale,
                bins: self.pipeline.bins().unwrap_or_default(),
                brush: self.brush.extent(),
                tick_format: &self.config.time_tick_format,
                y_axis_label: &self.config.row_mapping.measure,
            },
            &self.config.style,
        );
        SessionFrame::Ready(Box::new(AtlasFrame {
            viewport: self.layout.viewport,
            map,
            histogram,
        }))
    }
}

/// One linked map + histogram view.
#[derive(Debug, Clone)]
pub struct ViewSession {
    state: Rc<RefCell<SessionState>>,
}

impl ViewSession {
    pub fn new(config: AtlasConfig) -> AtlasResult<Self> {
        let layout = AtlasLayout::from_config(&config)?;
        let pipeline = Pipeline::new(GeoProjector::for_viewport(config.viewport));
        debug!(
            width = layout.viewport.width,
            height = layout.viewport.height,
            "view session created"
        );
        Ok(Self {
            state: Rc::new(RefCell::new(SessionState {
                config,
                layout,
                geography: LoadState::Pending,
                dataset: LoadState::Pending,
                store: SelectionStore::default(),
                brush: Brush::default(),
                pipeline,
            })),
        })
    }

    /// Handle for writing load results back into this session.
    #[must_use]
    pub fn resolver(&self) -> SessionResolver {
        SessionResolver {
            state: Rc::downgrade(&self.state),
        }
    }

    #[must_use]
    pub fn config(&self) -> AtlasConfig {
        self.state.borrow().config.clone()
    }

    #[must_use]
    pub fn layout(&self) -> AtlasLayout {
        self.state.borrow().layout
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        let state = self.state.borrow();
        state.geography.is_pending() || state.dataset.is_pending()
    }

    #[must_use]
    pub fn geography(&self) -> Option<Arc<GeographyModel>> {
        self.state.borrow().geography.ready().cloned()
    }

    #[must_use]
    pub fn dataset(&self) -> Option<Dataset> {
        self.state.borrow().dataset.ready().cloned()
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.state.borrow().store.selection()
    }

    #[must_use]
    pub fn selection_revision(&self) -> u64 {
        self.state.borrow().store.revision()
    }

    #[must_use]
    pub fn brush(&self) -> Brush {
        self.state.borrow().brush
    }

    /// Builds the current frame, recomputing only stale derived values.
    #[must_use]
    pub fn frame(&self) -> SessionFrame {
        self.state.borrow_mut().frame()
    }

    /// Renders the current frame; `Ok(false)` when there is nothing to draw.
    pub fn render<R: Renderer>(&self, renderer: &mut R) -> AtlasResult<bool> {
        match self.frame() {
            SessionFrame::Ready(frame) => {
                renderer.render(&frame)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Feeds a brush gesture; returns `true` when the selection changed.
    ///
    /// Events arriving before the histogram exists are ignored.
    pub fn dispatch_brush(&self, event: BrushEvent) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(x_scale) = current_x_scale(&mut state) else {
            trace!("brush event ignored before histogram is ready");
            return false;
        };
        let Some(message) = state.brush.on_event(event, x_scale) else {
            return false;
        };
        let changed = state.store.apply(message);
        if changed {
            state
                .pipeline
                .invalidate(InputTopics::from_topic(InputTopic::Selection));
        }
        changed
    }

    /// Applies a new canvas size; the visible brush is dropped.
    pub fn resize(&self, viewport: Viewport) -> AtlasResult<()> {
        let mut state = self.state.borrow_mut();
        let config = state.config.clone().with_viewport(viewport);
        let layout = AtlasLayout::from_config(&config)?;
        state.config = config;
        state.layout = layout;
        state.brush.reset();
        state.pipeline.set_projector(GeoProjector::for_viewport(viewport));
        debug!(width = viewport.width, height = viewport.height, "session resized");
        Ok(())
    }

    /// Histogram time scale, once both inputs are loaded.
    #[must_use]
    pub fn histogram_x_scale(&self) -> Option<Scale> {
        current_x_scale(&mut self.state.borrow_mut())
    }

    /// Records currently shown on the map.
    #[must_use]
    pub fn filtered_dataset(&self) -> Option<Dataset> {
        let mut state = self.state.borrow_mut();
        match state.refresh() {
            Ok(true) => state.pipeline.filtered().cloned(),
            _ => None,
        }
    }

    #[must_use]
    pub fn recomputation_count(&self, value: DerivedValue) -> u64 {
        self.state.borrow().pipeline.recomputation_count(value)
    }

    /// Summary of the derived state; `None` until the session is ready.
    #[must_use]
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        let mut state = self.state.borrow_mut();
        if !matches!(state.refresh(), Ok(true)) {
            return None;
        }
        let record_count = state.dataset.ready().map_or(0, |dataset| dataset.len());
        Some(SessionSnapshot {
            selection: state.store.selection(),
            selection_revision: state.store.revision(),
            record_count,
            filtered_count: state.pipeline.filtered().map_or(0, |dataset| dataset.len()),
            time_domain: state.pipeline.x_scale().map(Scale::domain),
            bins: state.pipeline.bins().map(<[Bin]>::to_vec).unwrap_or_default(),
        })
    }
}

fn current_x_scale(state: &mut SessionState) -> Option<Scale> {
    match state.refresh() {
        Ok(true) => state.pipeline.x_scale(),
        Ok(false) => None,
        Err(err) => {
            error!(error = %err, "histogram scale could not be built");
            None
        }
    }
}

/// Weak write handle used by asynchronous loads.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    state: Weak<RefCell<SessionState>>,
}

impl SessionResolver {
    /// True once the session has been dropped.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.state.strong_count() == 0
    }

    /// Stores the geography result; returns `false` if the session is gone.
    pub fn resolve_geography(&self, result: AtlasResult<GeographyModel>) -> bool {
        let Some(state) = self.state.upgrade() else {
            debug!("geography resolved after session was dropped");
            return false;
        };
        let mut state = state.borrow_mut();
        state.geography = match result {
            Ok(model) => {
                debug!(land_features = model.land.len(), "geography ready");
                LoadState::Ready(Arc::new(model))
            }
            Err(err) => {
                warn!(error = %err, "geography failed to load");
                LoadState::Failed(err)
            }
        };
        state
            .pipeline
            .invalidate(InputTopics::from_topic(InputTopic::Geography));
        true
    }

    /// Stores the dataset result; returns `false` if the session is gone.
    pub fn resolve_dataset(&self, result: AtlasResult<Dataset>) -> bool {
        let Some(state) = self.state.upgrade() else {
            debug!("dataset resolved after session was dropped");
            return false;
        };
        let mut state = state.borrow_mut();
        state.dataset = match result {
            Ok(dataset) => {
                debug!(records = dataset.len(), "dataset ready");
                LoadState::Ready(dataset)
            }
            Err(err) => {
                warn!(error = %err, "dataset failed to load");
                LoadState::Failed(err)
            }
        };
        state
            .pipeline
            .invalidate(InputTopics::from_topic(InputTopic::Dataset));
        true
    }
}
