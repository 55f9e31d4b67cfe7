//! Ledger error types.

use std::path::PathBuf;

/// Errors produced by [`StageLedger`](super::StageLedger) and its backends.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No ledger exists yet for the scope.
    #[error("no stage ledger for {scope} at {location}")]
    Missing { scope: String, location: String },

    /// A ledger line is not `name<TAB>count`.
    #[error("malformed ledger line {line} in {path}: {content:?}")]
    Malformed {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// File-system failure while reading, backing up or writing the ledger.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stage name that cannot be stored as `name<TAB>count`.
    #[error("invalid stage name {stage:?}: {reason}")]
    InvalidStage { stage: String, reason: &'static str },

    /// Internal mutex was poisoned by a panicked thread.
    #[error("ledger backend lock poisoned")]
    LockPoisoned,
}

/// Convenience alias used throughout the ledger module.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            LedgerError::Missing { .. } => {
                format!("{self}\n\nHint: Run 'batchline ledger init' for this corpus and language.")
            }
            LedgerError::Malformed { .. } => format!(
                "{self}\n\nHint: Restore the ledger from the most recent ALL_STAGES.<timestamp>.txt backup."
            ),
            LedgerError::InvalidStage { .. } => format!(
                "{self}\n\nHint: Use the stage name exactly as it appears in the pipeline configuration."
            ),
            _ => self.to_string(),
        }
    }
}
