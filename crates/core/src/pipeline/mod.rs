//! Pipeline configuration and provenance
//!
//! A pipeline is an ordered list of steps, each a stage name with options,
//! read from a plain text file:
//!
//! ```text
//! # comments and blank lines are ignored
//! xml2txt --filter=en
//! txt2tag verbose
//! tag2chk --chunker=np
//! ```
//!
//! Splitting the pipeline at a stage yields a [`Provenance`]: the steps that
//! run before it (the trace) and the stage step itself (the head). Datasets
//! persist their provenance so a later run can decide whether an existing
//! dataset is a legal input or output for the current configuration.
//!
//! # Example
//!
//! ```rust
//! use batchline_core::pipeline::PipelineConfig;
//!
//! let pipeline = PipelineConfig::parse("a\nb --n=1\nc\n");
//! let produced_by_b = pipeline.split("b")?;
//!
//! assert!(produced_by_b.is_input_for(&pipeline, "c")?);
//! assert!(produced_by_b.is_output_of(&pipeline, "b")?);
//! # Ok::<(), batchline_core::pipeline::PipelineError>(())
//! ```

mod config;
mod error;
mod provenance;
mod step;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use provenance::Provenance;
pub use step::{OptionValue, PipelineStep, StepOptions};
