//! Derived values of a session, rebuilt from explicit input dependencies.

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::api::config::{AtlasConfig, HistogramMargins};
use crate::api::invalidation::{DerivedValue, InputTopic, InputTopics};
use crate::core::{
    Bin, Dataset, PixelPoint, Record, Scale, ScaleKind, ScaleOptions, Viewport, bin_records,
    filter_records, max_bin_sum, month_starts, record_measure, record_time,
};
use crate::error::{AtlasError, AtlasResult};
use crate::geo::{GeoPath, GeoProjector, GeographyModel, Geometry, graticule};
use crate::interaction::Selection;

/// Pixel geometry of both views for one viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasLayout {
    pub viewport: Viewport,
    /// Canvas y of the histogram strip's top edge.
    pub histogram_top: f64,
    pub histogram_height: f64,
    pub margins: HistogramMargins,
    pub inner_width: f64,
    pub inner_height: f64,
}

impl AtlasLayout {
    pub fn from_config(config: &AtlasConfig) -> AtlasResult<Self> {
        config.validate()?;
        let width = f64::from(config.viewport.width);
        let height = f64::from(config.viewport.height);
        let histogram_height = config.histogram_height_ratio * height;
        let margins = config.histogram_margins;
        Ok(Self {
            viewport: config.viewport,
            histogram_top: height - histogram_height,
            histogram_height,
            margins,
            inner_width: width - margins.left - margins.right,
            inner_height: histogram_height - margins.top - margins.bottom,
        })
    }

    /// Canvas position of the histogram plot's top-left corner.
    #[must_use]
    pub fn plot_origin(&self) -> PixelPoint {
        PixelPoint::new(self.margins.left, self.histogram_top + self.margins.top)
    }
}

/// Projected map backdrop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Backdrop {
    pub sphere: GeoPath,
    pub graticule: GeoPath,
    pub land: Vec<GeoPath>,
    pub interiors: GeoPath,
}

/// Current inputs of the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInputs<'a> {
    pub geography: &'a GeographyModel,
    pub dataset: &'a Dataset,
    pub selection: Selection,
    pub layout: AtlasLayout,
    pub max_bubble_radius: f64,
    pub graticule_step_deg: f64,
}

/// Cached derived values plus the set of inputs changed since last refresh.
#[derive(Debug)]
pub struct Pipeline {
    pending: InputTopics,
    projector: GeoProjector,
    size_scale: Option<Scale>,
    x_scale: Option<Scale>,
    bins: Option<Vec<Bin>>,
    y_scale: Option<Scale>,
    filtered: Option<Dataset>,
    backdrop: Option<Backdrop>,
    recomputations: [u64; DerivedValue::ALL.len()],
}

impl Pipeline {
    #[must_use]
    pub fn new(projector: GeoProjector) -> Self {
        Self {
            pending: InputTopics::all(),
            projector,
            size_scale: None,
            x_scale: None,
            bins: None,
            y_scale: None,
            filtered: None,
            backdrop: None,
            recomputations: [0; DerivedValue::ALL.len()],
        }
    }

    /// Marks inputs as changed; dependents recompute on the next refresh.
    pub fn invalidate(&mut self, topics: InputTopics) {
        if topics.contains_topic(InputTopic::Geography) {
            self.projector.reset_for_geography();
        }
        self.pending = self.pending.union(topics);
    }

    /// Swaps the projector, e.g. after a resize, and invalidates the layout.
    pub fn set_projector(&mut self, projector: GeoProjector) {
        self.projector = projector;
        self.invalidate(InputTopics::from_topic(InputTopic::Layout));
    }

    #[must_use]
    pub fn pending(&self) -> InputTopics {
        self.pending
    }

    /// Number of times `value` has been computed.
    #[must_use]
    pub fn recomputation_count(&self, value: DerivedValue) -> u64 {
        self.recomputations[value.index()]
    }

    /// Recomputes every value whose dependencies changed.
    ///
    /// On error the pending set is kept, so the next refresh retries.
    pub fn refresh(&mut self, inputs: &PipelineInputs<'_>) -> AtlasResult<()> {
        let pending = self.pending;
        let stale = |value: DerivedValue, present: bool| {
            !present || value.dependencies().intersects(pending)
        };

        if stale(DerivedValue::SizeScale, self.size_scale.is_some()) {
            self.size_scale = Some(size_scale(inputs.dataset, inputs.max_bubble_radius)?);
            self.count(DerivedValue::SizeScale);
        }

        if stale(DerivedValue::HistogramXScale, self.x_scale.is_some()) {
            self.x_scale = Some(histogram_x_scale(inputs.dataset, inputs.layout)?);
            self.count(DerivedValue::HistogramXScale);
        }
        let x_scale = self.x_scale.ok_or(AtlasError::EmptyDomain)?;

        if stale(DerivedValue::Bins, self.bins.is_some()) {
            self.bins = Some(histogram_bins(inputs.dataset, x_scale)?);
            self.count(DerivedValue::Bins);
        }

        if stale(DerivedValue::HistogramYScale, self.y_scale.is_some()) {
            let bins = self.bins.as_deref().unwrap_or_default();
            self.y_scale = Some(Scale::linear(
                (0.0, max_bin_sum(bins)),
                (inputs.layout.inner_height, 0.0),
            )?);
            self.count(DerivedValue::HistogramYScale);
        }

        if stale(DerivedValue::FilteredRecords, self.filtered.is_some()) {
            self.filtered = Some(filtered_dataset(inputs.dataset, inputs.selection));
            self.count(DerivedValue::FilteredRecords);
        }

        if stale(DerivedValue::Backdrop, self.backdrop.is_some()) {
            self.backdrop = Some(self.project_backdrop(inputs.geography, inputs.graticule_step_deg));
            self.count(DerivedValue::Backdrop);
        }

        self.pending = InputTopics::none();
        Ok(())
    }

    #[must_use]
    pub fn size_scale(&self) -> Option<Scale> {
        self.size_scale
    }

    #[must_use]
    pub fn x_scale(&self) -> Option<Scale> {
        self.x_scale
    }

    #[must_use]
    pub fn y_scale(&self) -> Option<Scale> {
        self.y_scale
    }

    #[must_use]
    pub fn bins(&self) -> Option<&[Bin]> {
        self.bins.as_deref()
    }

    #[must_use]
    pub fn filtered(&self) -> Option<&Dataset> {
        self.filtered.as_ref()
    }

    #[must_use]
    pub fn backdrop(&self) -> Option<&Backdrop> {
        self.backdrop.as_ref()
    }

    /// Projects a record location through the memoized projector.
    pub fn project_record(&mut self, record: &Record) -> Option<PixelPoint> {
        self.projector.project(record.location)
    }

    fn count(&mut self, value: DerivedValue) {
        self.recomputations[value.index()] += 1;
        trace!(value = ?value, "derived value recomputed");
    }

    fn project_backdrop(&mut self, geography: &GeographyModel, graticule_step_deg: f64) -> Backdrop {
        let backdrop = Backdrop {
            sphere: self.projector.path_of(&Geometry::Sphere),
            graticule: self.projector.path_of(&graticule(graticule_step_deg)),
            land: geography
                .land
                .features
                .iter()
                .filter_map(|feature| feature.geometry.as_ref())
                .map(|geometry| self.projector.path_of(geometry))
                .collect(),
            interiors: self.projector.path_of(&geography.interiors_geometry()),
        };
        debug!(
            land_paths = backdrop.land.len(),
            interior_vertices = backdrop.interiors.vertex_count(),
            "backdrop projected"
        );
        backdrop
    }
}

/// `sqrt` scale from `[0, max(measure)]` to `[0, max_radius]`.
///
/// The maximum is taken over the whole dataset so bubble sizes stay
/// comparable while the selection changes.
pub fn size_scale(dataset: &Dataset, max_radius: f64) -> AtlasResult<Scale> {
    let max_measure = dataset.max_measure().unwrap_or(0.0).max(0.0);
    Scale::build(
        ScaleKind::Sqrt,
        (0.0, max_measure),
        (0.0, max_radius),
        ScaleOptions::default(),
    )
}

/// Niced time scale over the dataset's time extent, spanning the plot width.
pub fn histogram_x_scale(dataset: &Dataset, layout: AtlasLayout) -> AtlasResult<Scale> {
    let extent = dataset.time_extent().ok_or(AtlasError::EmptyDomain)?;
    Scale::build(
        ScaleKind::Time,
        extent,
        (0.0, layout.inner_width),
        ScaleOptions::niced(),
    )
}

/// Monthly bins over the x scale's domain.
pub fn histogram_bins(dataset: &Dataset, x_scale: Scale) -> AtlasResult<Vec<Bin>> {
    let (start, stop) = x_scale.domain();
    bin_records(
        dataset.records(),
        Some((start, stop)),
        &month_starts(start, stop),
        record_time,
        record_measure,
    )
}

/// Records visible on the map under `selection`.
#[must_use]
pub fn filtered_dataset(dataset: &Dataset, selection: Selection) -> Dataset {
    match filter_records(dataset.records(), selection, record_time) {
        Cow::Borrowed(_) => dataset.clone(),
        Cow::Owned(records) => Dataset::new(records),
    }
}
