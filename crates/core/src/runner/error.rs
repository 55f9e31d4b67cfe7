//! Error types for stage runs

use std::path::PathBuf;
use thiserror::Error;

use crate::dataset::DatasetError;
use crate::ledger::LedgerError;
use crate::manifest::ManifestError;
use crate::pipeline::PipelineError;

/// Errors that can occur while running a stage over a batch
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// The output dataset was produced by a different pipeline
    #[error("Dataset {path} does not match the current pipeline at stage '{stage}'")]
    ProvenanceMismatch { path: PathBuf, stage: String },

    /// More files reported as processed than the manifest has left
    #[error("Stage '{stage}' cannot advance by {requested}: only {remaining} manifest entries remain")]
    Overrun {
        stage: String,
        requested: u64,
        remaining: u64,
    },

    /// The processing closure failed; nothing was recorded
    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for stage runs
pub type RunnerResult<T> = Result<T, RunnerError>;

impl RunnerError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            RunnerError::Pipeline(err) => err.user_message(),
            RunnerError::Manifest(err) => err.user_message(),
            RunnerError::Ledger(err) => err.user_message(),
            RunnerError::Dataset(err) => err.user_message(),
            RunnerError::ProvenanceMismatch { .. } => format!(
                "{self}\n\nHint: Write into a new dataset version (omit --version) or restore the pipeline it was created with."
            ),
            RunnerError::Overrun { .. } => format!(
                "{self}\n\nHint: Check the stage count with 'batchline ledger show'."
            ),
            RunnerError::Stage { .. } => {
                format!("{self}\n\nHint: The batch can be retried; no counters were advanced.")
            }
        }
    }
}
