use std::path::PathBuf;
use thiserror::Error;

/// The main error type for bccdprep operations.
///
/// Every variant here aborts a run. Per-record problems (a missing image,
/// an unknown class name) are not errors; they are counted in the
/// [`ConversionReport`](crate::conversion::ConversionReport) instead.
#[derive(Debug, Error)]
pub enum BccdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error at {path}: {source}")]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Raw annotation directory {path} does not exist (fetch the dataset from {dataset_url} first)")]
    RawDataMissing { path: PathBuf, dataset_url: String },

    #[error("Failed to parse VOC XML {path}: {message}")]
    VocXmlParse { path: PathBuf, message: String },

    #[error("Failed to parse label file {path} at line {line}: {message}")]
    LabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to write manifest {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize report as JSON: {0}")]
    ReportJson(#[from] serde_json::Error),

    #[error("Benchmark failed: {message}")]
    Benchmark { message: String },

    #[error("Detector failed: {message}")]
    Detector { message: String },
}

impl BccdError {
    /// Wrap an IO error with the path it happened at.
    pub fn io_at(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| BccdError::IoAt { path, source }
    }
}
