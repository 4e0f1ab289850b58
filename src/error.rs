use thiserror::Error;

pub type AtlasResult<T> = Result<T, AtlasError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AtlasError {
    #[error("failed to load {source_name}: {reason}")]
    SourceFetch { source_name: String, reason: String },

    #[error("invalid scale domain: low={low}, high={high}")]
    InvalidDomain { low: f64, high: f64 },

    #[error("cannot compute a domain from empty data")]
    EmptyDomain,

    #[error("invalid scale range: start={start}, end={end}")]
    InvalidRange { start: f64, end: f64 },

    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl AtlasError {
    pub(crate) fn source_fetch(source_name: &str, reason: impl ToString) -> Self {
        Self::SourceFetch {
            source_name: source_name.to_owned(),
            reason: reason.to_string(),
        }
    }
}
