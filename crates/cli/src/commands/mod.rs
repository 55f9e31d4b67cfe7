//! CLI command implementations

pub mod batch;
pub mod dataset;
pub mod ledger;
pub mod manifest;
pub mod pipeline;
pub mod status;
