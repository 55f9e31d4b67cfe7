//! Stage-runner control flow
//!
//! A [`StageRunner`] reads its stage count from the ledger, takes the next
//! manifest window from there, and after processing advances the ledger and
//! the output dataset's state together.

mod error;
mod stage;

pub use error::{RunnerError, RunnerResult};
pub use stage::{Batch, BatchReport, StageRunner};
