//! Error types for pipeline configuration and provenance
//!
//! A stage that cannot be located in the pipeline configuration is a
//! configuration inconsistency and is always reported as an error; only
//! option lookups tolerate it (see [`PipelineConfig::options_for`]).
//!
//! [`PipelineConfig::options_for`]: super::PipelineConfig::options_for

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or splitting a pipeline configuration
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The pipeline configuration file could not be read
    #[error("Failed to read pipeline configuration '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested stage does not appear in the pipeline
    #[error("Stage '{stage}' not found in pipeline [{available}]")]
    StageNotFound { stage: String, available: String },

    /// A serialized pipeline head did not contain exactly one step
    #[error("Expected exactly one pipeline step in {path}, found {found}")]
    InvalidHead { path: PathBuf, found: usize },
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Create a stage-not-found error listing the stages that do exist
    pub fn stage_not_found<'a>(
        stage: impl Into<String>,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::StageNotFound {
            stage: stage.into(),
            available: available.into_iter().collect::<Vec<_>>().join(", "),
        }
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::ReadConfig { path, .. } => format!(
                "{self}\n\nHint: Check that {} exists; pipeline configurations are never created implicitly.",
                path.display()
            ),
            PipelineError::StageNotFound { stage, .. } => format!(
                "{self}\n\nHint: Add a '{stage}' line to the pipeline configuration or fix the stage name."
            ),
            PipelineError::InvalidHead { .. } => format!(
                "{self}\n\nHint: The dataset's config directory was edited by hand or truncated."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_not_found_lists_available() {
        let err = PipelineError::stage_not_found("tag", ["xml2txt", "txt2seg"]);
        let display = err.to_string();
        assert!(display.contains("'tag'"));
        assert!(display.contains("xml2txt, txt2seg"));
    }

    #[test]
    fn test_user_message_has_hint() {
        let err = PipelineError::stage_not_found("tag", []);
        assert!(err.user_message().contains("Hint:"));

        let err = PipelineError::InvalidHead {
            path: PathBuf::from("/data/d1/config/pipeline-head.txt"),
            found: 2,
        };
        assert!(err.to_string().contains("found 2"));
    }
}
