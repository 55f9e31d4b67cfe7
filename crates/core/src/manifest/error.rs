//! Error types for manifest access

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be opened or read
    #[error("Failed to read manifest '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest line has too many columns
    #[error("Malformed manifest line {line} in {path}: {content:?}")]
    Malformed {
        path: PathBuf,
        line: usize,
        content: String,
    },
}

/// Result type for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;

impl ManifestError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            ManifestError::Read { path, .. } => format!(
                "{self}\n\nHint: The manifest is produced by the populate step; check that {} exists.",
                path.display()
            ),
            ManifestError::Malformed { .. } => format!(
                "{self}\n\nHint: Manifest lines are 'year<TAB>source[<TAB>target]' or a single path."
            ),
        }
    }
}
