//! Pipeline configuration: an ordered list of steps parsed from text

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use super::error::{PipelineError, PipelineResult};
use super::provenance::Provenance;
use super::step::{PipelineStep, StepOptions};

static NO_OPTIONS: StepOptions = StepOptions::new();

/// The global pipeline: every step in execution order
///
/// Step names may repeat; lookups always resolve to the first step with a
/// given name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    steps: Vec<PipelineStep>,
}

impl PipelineConfig {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn with_step(mut self, step: PipelineStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Replace all steps
    pub fn with_steps(mut self, steps: Vec<PipelineStep>) -> Self {
        self.steps = steps;
        self
    }

    /// Parse a pipeline from its text form
    ///
    /// Blank lines and lines starting with `#` are skipped; every other line
    /// is one step.
    pub fn parse(text: &str) -> Self {
        Self {
            steps: text.lines().filter_map(PipelineStep::parse_line).collect(),
        }
    }

    /// Read and parse a pipeline configuration file
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// All steps in order
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Stage names in order
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name.as_str())
    }

    /// Index of the first step named `stage`
    pub fn position(&self, stage: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name == stage)
    }

    /// First step named `stage`
    pub fn step(&self, stage: &str) -> Option<&PipelineStep> {
        self.position(stage).map(|idx| &self.steps[idx])
    }

    /// Options of the first step named `stage`
    ///
    /// An unknown stage is not fatal here: a warning is logged and an empty
    /// option map is returned.
    pub fn options_for(&self, stage: &str) -> &StepOptions {
        match self.step(stage) {
            Some(step) => &step.options,
            None => {
                warn!(stage, "No pipeline step found, using empty options");
                &NO_OPTIONS
            }
        }
    }

    /// Split the pipeline at the first step named `stage`
    pub fn split(&self, stage: &str) -> PipelineResult<Provenance> {
        Provenance::split(self, stage)
    }

    /// Text form, one step per line
    pub fn to_config_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{step}")?;
        }
        Ok(())
    }
}

impl From<Vec<PipelineStep>> for PipelineConfig {
    fn from(steps: Vec<PipelineStep>) -> Self {
        Self { steps }
    }
}
