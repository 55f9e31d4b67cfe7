//! Batch-at-a-time execution of one pipeline stage

use std::time::Instant;

use serde::Serialize;
use tracing::{info, info_span, warn};

use super::error::{RunnerError, RunnerResult};
use crate::dataset::{Dataset, DatasetError, ProcessingHistoryRecord};
use crate::ledger::{FileLedgerBackend, LedgerBackend, Scope, StageLedger};
use crate::manifest::{ManifestEntry, ManifestStore};
use crate::pipeline::{PipelineConfig, StepOptions};
use crate::revision::{GitDescribe, RevisionSource};

/// One window of manifest entries handed to a stage
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    /// Stage count the window starts at
    pub offset: u64,
    /// Requested window size
    pub limit: usize,
    pub entries: Vec<ManifestEntry>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a completed batch changed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub stage: String,
    pub offset: u64,
    pub processed: u64,
    /// Stage count after the batch
    pub ledger_count: u64,
    /// Dataset processed counter after the batch
    pub dataset_processed: u64,
    /// Appended history record; `None` when nothing was processed
    pub history: Option<ProcessingHistoryRecord>,
}

impl BatchReport {
    /// Whether the batch changed any state
    pub fn is_empty(&self) -> bool {
        self.history.is_none()
    }

    /// One-line summary for terminal output
    pub fn summary(&self) -> String {
        match &self.history {
            Some(record) => format!(
                "{}: processed {} files from offset {} in {}s (stage count {}, dataset {})",
                self.stage,
                self.processed,
                self.offset,
                record.elapsed_seconds,
                self.ledger_count,
                self.dataset_processed
            ),
            None => format!(
                "{}: nothing to process at offset {}",
                self.stage, self.offset
            ),
        }
    }
}

/// Runs one stage of a pipeline against a manifest, a ledger and an
/// output dataset
pub struct StageRunner<B: LedgerBackend = FileLedgerBackend> {
    stage: String,
    pipeline: PipelineConfig,
    manifest: ManifestStore,
    ledger: StageLedger<B>,
    scope: Scope,
    dataset: Dataset,
    revision: Box<dyn RevisionSource>,
}

impl<B: LedgerBackend> StageRunner<B> {
    /// Prepare `stage` to write into `dataset`
    ///
    /// An uninitialized dataset is initialized for the current pipeline. An
    /// existing one must have been produced by exactly this pipeline up to
    /// and including `stage`.
    pub fn new(
        stage: impl Into<String>,
        pipeline: PipelineConfig,
        manifest: ManifestStore,
        ledger: StageLedger<B>,
        scope: Scope,
        mut dataset: Dataset,
    ) -> RunnerResult<Self> {
        let stage = stage.into();
        pipeline.split(&stage)?;

        match dataset.stage_name() {
            Some(name) if name == stage => {}
            Some(name) => {
                return Err(DatasetError::StageMismatch {
                    path: dataset.path(),
                    expected: stage,
                    found: name.to_string(),
                }
                .into());
            }
            None => return Err(DatasetError::MissingStage(dataset.path()).into()),
        }

        if !dataset.is_initialized() {
            dataset.initialize_on_disk(&pipeline)?;
        } else if !dataset.output_matches(&pipeline)? {
            return Err(RunnerError::ProvenanceMismatch {
                path: dataset.path(),
                stage,
            });
        }

        Ok(Self {
            stage,
            pipeline,
            manifest,
            ledger,
            scope,
            dataset,
            revision: Box::new(GitDescribe::new()),
        })
    }

    /// Use another revision source for history records
    pub fn with_revision(mut self, revision: impl RevisionSource + 'static) -> Self {
        self.revision = Box::new(revision);
        self
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn ledger(&self) -> &StageLedger<B> {
        &self.ledger
    }

    /// Options configured for this stage
    pub fn options(&self) -> &StepOptions {
        self.pipeline.options_for(&self.stage)
    }

    /// Next window of at most `limit` entries after the current stage count
    pub fn next_batch(&self, limit: usize) -> RunnerResult<Batch> {
        let offset = self.ledger.count(&self.scope, &self.stage)?;
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let entries = self.manifest.windowed(start, limit)?;
        Ok(Batch {
            offset,
            limit,
            entries,
        })
    }

    /// Record `batch` as processed
    ///
    /// The stage count advances by the entries the batch held. If another
    /// runner moved the count meanwhile, it is raised to the end of this
    /// window instead and never lowered. An empty batch changes nothing.
    pub fn complete_batch(&mut self, batch: &Batch, started: Instant) -> RunnerResult<BatchReport> {
        if batch.is_empty() {
            info!(stage = %self.stage, offset = batch.offset, "No entries left to process");
            return Ok(self.unchanged(batch.offset));
        }

        let processed = batch.len() as u64;
        let current = self.ledger.count(&self.scope, &self.stage)?;
        let ledger_count = if current == batch.offset {
            self.ledger.update(&self.scope, &self.stage, processed)?
        } else {
            warn!(
                stage = %self.stage,
                expected = batch.offset,
                found = current,
                "Stage count moved while the batch was processed"
            );
            self.ledger
                .advance_to(&self.scope, &self.stage, batch.offset + processed)?
        };
        self.record(batch.offset, processed, ledger_count, batch.limit, started)
    }

    /// Record `processed` files that were handled outside of [`run_batch`](Self::run_batch)
    ///
    /// Fails if that would move the stage count past the end of the
    /// manifest.
    pub fn commit(
        &mut self,
        processed: u64,
        limit: usize,
        started: Instant,
    ) -> RunnerResult<BatchReport> {
        let offset = self.ledger.count(&self.scope, &self.stage)?;
        let remaining = (self.manifest.len()? as u64).saturating_sub(offset);
        if processed > remaining {
            return Err(RunnerError::Overrun {
                stage: self.stage.clone(),
                requested: processed,
                remaining,
            });
        }
        if processed == 0 {
            return Ok(self.unchanged(offset));
        }
        let ledger_count = self.ledger.update(&self.scope, &self.stage, processed)?;
        self.record(offset, processed, ledger_count, limit, started)
    }

    /// Fetch the next batch, hand it to `process` and record the result
    ///
    /// When `process` fails nothing is recorded and the same window is
    /// returned by the next call.
    pub fn run_batch<F, E>(&mut self, limit: usize, process: F) -> RunnerResult<BatchReport>
    where
        F: FnOnce(&Batch, &StepOptions) -> Result<(), E>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let started = Instant::now();
        let batch = self.next_batch(limit)?;
        let _span = info_span!(
            "stage_batch",
            stage = %self.stage,
            offset = batch.offset,
            count = batch.len()
        )
        .entered();

        if batch.is_empty() {
            return self.complete_batch(&batch, started);
        }

        info!(limit, "Processing batch");
        process(&batch, self.options()).map_err(|e| RunnerError::Stage {
            stage: self.stage.clone(),
            source: e.into(),
        })?;
        self.complete_batch(&batch, started)
    }

    fn record(
        &mut self,
        offset: u64,
        processed: u64,
        ledger_count: u64,
        limit: usize,
        started: Instant,
    ) -> RunnerResult<BatchReport> {
        let dataset_processed = self.dataset.update_processed_count(processed)?;
        let record = self
            .dataset
            .update_state(limit, started, self.revision.as_ref())?;
        info!(
            stage = %self.stage,
            offset,
            count = processed,
            path = %self.dataset.path().display(),
            "Batch recorded"
        );
        Ok(BatchReport {
            stage: self.stage.clone(),
            offset,
            processed,
            ledger_count,
            dataset_processed,
            history: Some(record),
        })
    }

    fn unchanged(&self, offset: u64) -> BatchReport {
        BatchReport {
            stage: self.stage.clone(),
            offset,
            processed: 0,
            ledger_count: offset,
            dataset_processed: self.dataset.files_processed(),
            history: None,
        }
    }
}
