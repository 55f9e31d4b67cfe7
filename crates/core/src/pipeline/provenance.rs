//! Pipeline provenance: the trace and head that produced a dataset
//!
//! A dataset records the exact steps that ran before the step that produced
//! it (the trace) and that step itself (the head). Matching compares those
//! recorded steps against a split of the current pipeline, step for step and
//! option for option, without any normalization.

use serde::Serialize;

use super::config::PipelineConfig;
use super::error::{PipelineError, PipelineResult};
use super::step::PipelineStep;

/// Trace and head of one pipeline position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    trace: Vec<PipelineStep>,
    head: PipelineStep,
}

impl Provenance {
    /// Build a provenance from an explicit trace and head
    pub fn new(trace: Vec<PipelineStep>, head: PipelineStep) -> Self {
        Self { trace, head }
    }

    /// Split `pipeline` at the first step named `stage`
    ///
    /// Every step before it becomes the trace, the step itself the head.
    pub fn split(pipeline: &PipelineConfig, stage: &str) -> PipelineResult<Self> {
        let idx = pipeline
            .position(stage)
            .ok_or_else(|| PipelineError::stage_not_found(stage, pipeline.stage_names()))?;
        let steps = pipeline.steps();
        Ok(Self {
            trace: steps[..idx].to_vec(),
            head: steps[idx].clone(),
        })
    }

    /// Steps that ran before the head
    pub fn trace(&self) -> &[PipelineStep] {
        &self.trace
    }

    /// Step that produced the dataset
    pub fn head(&self) -> &PipelineStep {
        &self.head
    }

    /// Fresh `trace ++ [head]`
    pub fn lineage(&self) -> Vec<&PipelineStep> {
        self.trace.iter().chain(std::iter::once(&self.head)).collect()
    }

    /// Whether a dataset with this provenance may feed `consumer` in `pipeline`
    ///
    /// True iff the full lineage equals everything `pipeline` runs before
    /// `consumer`.
    pub fn is_input_for(&self, pipeline: &PipelineConfig, consumer: &str) -> PipelineResult<bool> {
        let expected = Self::split(pipeline, consumer)?;
        Ok(self.lineage().into_iter().eq(expected.trace.iter()))
    }

    /// Whether a dataset with this provenance is the output location of
    /// `stage` in `pipeline`
    ///
    /// True iff the full lineage equals the pipeline's lineage through and
    /// including `stage`.
    pub fn is_output_of(&self, pipeline: &PipelineConfig, stage: &str) -> PipelineResult<bool> {
        let expected = Self::split(pipeline, stage)?;
        Ok(self.lineage() == expected.lineage())
    }

    /// Text form of the trace, one step per line
    pub fn trace_to_string(&self) -> String {
        self.trace.iter().map(|s| format!("{s}\n")).collect()
    }

    /// Text form of the head
    pub fn head_to_string(&self) -> String {
        format!("{}\n", self.head)
    }
}
