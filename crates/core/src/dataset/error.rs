//! Error types for dataset operations

use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::PipelineError;

/// Errors that can occur while creating, loading or updating datasets
#[derive(Error, Debug)]
pub enum DatasetError {
    /// IO error with path context
    #[error("IO error with {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A state or config file has unexpected content
    #[error("Corrupt dataset file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Provenance could not be computed from the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// `initialize_on_disk` was called on an initialized dataset
    #[error("Dataset already initialized: {0}")]
    AlreadyInitialized(PathBuf),

    /// The dataset has no state or provenance on disk yet
    #[error("Dataset not initialized: {0}")]
    NotInitialized(PathBuf),

    /// The operation needs the producing stage name
    #[error("Dataset {0} has no stage name")]
    MissingStage(PathBuf),

    /// The dataset on disk was produced by another stage
    #[error("Dataset {path} was produced by stage '{found}', not '{expected}'")]
    StageMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// More than one dataset qualifies
    #[error("Ambiguous datasets in category '{category}': {}", .candidates.join(", "))]
    AmbiguousCandidates {
        category: String,
        candidates: Vec<String>,
    },

    /// No dataset qualifies
    #[error("No matching dataset in category '{category}'")]
    NoCandidates { category: String },
}

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            DatasetError::Pipeline(err) => err.user_message(),
            DatasetError::AmbiguousCandidates { .. } => format!(
                "{self}\n\nHint: Pass an explicit --version to choose one of the candidates."
            ),
            DatasetError::NoCandidates { category } => format!(
                "{self}\n\nHint: Run the stage producing '{category}' with the current pipeline first."
            ),
            DatasetError::NotInitialized(_) => {
                format!("{self}\n\nHint: Run 'batchline dataset init' first.")
            }
            _ => self.to_string(),
        }
    }
}
