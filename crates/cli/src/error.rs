//! CLI error types

use thiserror::Error;

use batchline_core::{
    DatasetError, LedgerError, ManifestError, PipelineError, RunnerError, SettingsError,
};

/// Errors reported by CLI commands
///
/// Core errors are converted with their `user_message()` so the hint lines
/// reach the terminal.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Settings(String),

    #[error("{0}")]
    Pipeline(String),

    #[error("{0}")]
    Manifest(String),

    #[error("{0}")]
    Ledger(String),

    #[error("{0}")]
    Dataset(String),

    #[error("{0}")]
    Runner(String),

    /// A dataset is not usable with the current pipeline
    #[error("Incompatible dataset: {0}")]
    Incompatible(String),

    #[error("Failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<SettingsError> for CliError {
    fn from(e: SettingsError) -> Self {
        CliError::Settings(e.user_message())
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e.user_message())
    }
}

impl From<ManifestError> for CliError {
    fn from(e: ManifestError) -> Self {
        CliError::Manifest(e.user_message())
    }
}

impl From<LedgerError> for CliError {
    fn from(e: LedgerError) -> Self {
        CliError::Ledger(e.user_message())
    }
}

impl From<DatasetError> for CliError {
    fn from(e: DatasetError) -> Self {
        CliError::Dataset(e.user_message())
    }
}

impl From<RunnerError> for CliError {
    fn from(e: RunnerError) -> Self {
        CliError::Runner(e.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_carry_hints() {
        let err: CliError = PipelineError::stage_not_found("tag", ["xml2txt"]).into();
        let text = err.to_string();
        assert!(text.contains("Stage 'tag' not found"));
        assert!(text.contains("Hint:"));
    }
}
