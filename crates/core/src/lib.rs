//! Batchline Core - checkpointed batch windows and pipeline provenance
//!
//! Provides the building blocks for running corpus-processing stages in
//! resumable batches:
//! - Manifest windows over the corpus file list
//! - A per-corpus ledger of how far each stage has got
//! - Pipeline configuration and step-level provenance
//! - Versioned datasets that record the pipeline that produced them
//! - A stage runner tying the above together

pub mod dataset;
pub mod ledger;
pub mod manifest;
pub mod pipeline;
pub mod revision;
pub mod runner;
pub mod settings;

// Re-export commonly used types
pub use dataset::{Dataset, DatasetError, DatasetRegistry, ProcessingHistoryRecord, Selection};
pub use ledger::{FileLedgerBackend, LedgerBackend, LedgerError, Scope, StageCounts, StageLedger};
pub use manifest::{ManifestEntry, ManifestError, ManifestStore};
pub use pipeline::{OptionValue, PipelineConfig, PipelineError, PipelineStep, Provenance};
pub use revision::{FixedRevision, GitDescribe, RevisionSource};
pub use runner::{Batch, BatchReport, RunnerError, StageRunner};
pub use settings::{Settings, SettingsError};
