//! Asynchronous sources for the two session inputs.
//!
//! Network clients live outside the crate; they plug in by implementing
//! [`TopologySource`] or [`DatasetSource`].

pub mod rows;

use std::future::Future;
use std::path::PathBuf;

use tracing::debug;

use crate::core::Dataset;
use crate::error::{AtlasError, AtlasResult};
use crate::geo::Topology;

pub use rows::{
    MalformedRowPolicy, RawRow, RowMapping, coerce_number, parse_coordinates, parse_csv_rows,
    parse_dataset_csv, parse_date,
};

/// Produces the world topology document.
pub trait TopologySource {
    /// Label used in fetch errors and logs.
    fn name(&self) -> &str;

    fn fetch_topology(&self) -> impl Future<Output = AtlasResult<Topology>>;
}

/// Produces the event dataset.
pub trait DatasetSource {
    fn name(&self) -> &str;

    fn fetch_dataset(&self) -> impl Future<Output = AtlasResult<Dataset>>;
}

/// Topology held as JSON text.
#[derive(Debug, Clone)]
pub struct TopologyText {
    name: String,
    json: String,
}

impl TopologyText {
    #[must_use]
    pub fn new(name: impl Into<String>, json: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            json: json.into(),
        }
    }
}

impl TopologySource for TopologyText {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_topology(&self) -> AtlasResult<Topology> {
        Topology::from_json_str(&self.json)
            .map_err(|err| AtlasError::source_fetch(&self.name, err))
    }
}

/// Topology read from a JSON file on first poll.
#[derive(Debug, Clone)]
pub struct TopologyFile {
    path: PathBuf,
    name: String,
}

impl TopologyFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl TopologySource for TopologyFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_topology(&self) -> AtlasResult<Topology> {
        let json = std::fs::read_to_string(&self.path)
            .map_err(|err| AtlasError::source_fetch(&self.name, err))?;
        debug!(source = %self.name, bytes = json.len(), "topology read");
        Topology::from_json_str(&json).map_err(|err| AtlasError::source_fetch(&self.name, err))
    }
}

/// Dataset held as CSV text.
#[derive(Debug, Clone)]
pub struct CsvText {
    name: String,
    text: String,
    mapping: RowMapping,
    policy: MalformedRowPolicy,
}

impl CsvText {
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            mapping: RowMapping::default(),
            policy: MalformedRowPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_mapping(mut self, mapping: RowMapping, policy: MalformedRowPolicy) -> Self {
        self.mapping = mapping;
        self.policy = policy;
        self
    }
}

impl DatasetSource for CsvText {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_dataset(&self) -> AtlasResult<Dataset> {
        parse_dataset_csv(&self.text, &self.mapping, self.policy)
            .map_err(|err| AtlasError::source_fetch(&self.name, err))
    }
}

/// Dataset read from a CSV file on first poll.
#[derive(Debug, Clone)]
pub struct CsvFile {
    path: PathBuf,
    name: String,
    mapping: RowMapping,
    policy: MalformedRowPolicy,
}

impl CsvFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self {
            path,
            name,
            mapping: RowMapping::default(),
            policy: MalformedRowPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_mapping(mut self, mapping: RowMapping, policy: MalformedRowPolicy) -> Self {
        self.mapping = mapping;
        self.policy = policy;
        self
    }
}

impl DatasetSource for CsvFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_dataset(&self) -> AtlasResult<Dataset> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|err| AtlasError::source_fetch(&self.name, err))?;
        debug!(source = %self.name, bytes = text.len(), "csv read");
        parse_dataset_csv(&text, &self.mapping, self.policy)
            .map_err(|err| AtlasError::source_fetch(&self.name, err))
    }
}

/// Already materialized dataset.
#[derive(Debug, Clone)]
pub struct StaticDataset {
    name: String,
    dataset: Dataset,
}

impl StaticDataset {
    #[must_use]
    pub fn new(name: impl Into<String>, dataset: Dataset) -> Self {
        Self {
            name: name.into(),
            dataset,
        }
    }
}

impl DatasetSource for StaticDataset {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_dataset(&self) -> AtlasResult<Dataset> {
        Ok(self.dataset.clone())
    }
}
