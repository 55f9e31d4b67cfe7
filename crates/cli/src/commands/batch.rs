//! CLI commands for batch-at-a-time stage runs
//!
//! `batch next` prints the window a stage should process next and
//! `batch commit` records it once the external stage has finished.

use std::time::{Duration, Instant};

use batchline_core::dataset::DatasetRegistry;
use batchline_core::ledger::StageLedger;
use batchline_core::manifest::ManifestStore;
use batchline_core::pipeline::PipelineConfig;
use batchline_core::revision::GitDescribe;
use batchline_core::runner::StageRunner;
use batchline_core::settings::Settings;

use crate::commands::manifest::print_entries;
use crate::error::CliError;
use crate::output::{OutputFormat, print_json};

/// Arguments for the `batch next` command
pub struct BatchNextArgs {
    pub stage: String,
    pub limit: Option<usize>,
    pub format: OutputFormat,
}

/// Arguments for the `batch commit` command
pub struct BatchCommitArgs {
    pub stage: String,
    /// Output dataset category
    pub category: String,
    /// Output dataset version
    pub version: String,
    /// Files the stage processed
    pub processed: u64,
    /// Batch size the stage was run with
    pub limit: Option<usize>,
    /// Wall-clock seconds the batch took
    pub elapsed: u64,
    pub format: OutputFormat,
}

/// Handle the `batch next` command
pub fn handle_batch_next(settings: &Settings, args: &BatchNextArgs) -> Result<(), CliError> {
    let offset = StageLedger::file().count(&settings.scope(), &args.stage)?;
    let limit = args.limit.unwrap_or(settings.default_limit);
    let start = usize::try_from(offset).unwrap_or(usize::MAX);
    let entries = ManifestStore::new(settings.manifest_path()).windowed(start, limit)?;
    if args.format == OutputFormat::Text {
        eprintln!(
            "Stage '{}' at offset {}: {} entries",
            args.stage,
            offset,
            entries.len()
        );
    }
    print_entries(&entries, args.format)
}

/// Handle the `batch commit` command
pub fn handle_batch_commit(settings: &Settings, args: &BatchCommitArgs) -> Result<(), CliError> {
    let pipeline = PipelineConfig::load(&settings.pipeline_path())?;
    let registry = DatasetRegistry::new(settings.datasets_path());
    let dataset = registry.open(&args.category, &args.version, Some(&args.stage))?;

    let mut runner = StageRunner::new(
        args.stage.clone(),
        pipeline,
        ManifestStore::new(settings.manifest_path()),
        StageLedger::file(),
        settings.scope(),
        dataset,
    )?
    .with_revision(GitDescribe::new());

    let started = Instant::now()
        .checked_sub(Duration::from_secs(args.elapsed))
        .unwrap_or_else(Instant::now);
    let limit = args.limit.unwrap_or(settings.default_limit);
    let report = runner.commit(args.processed, limit, started)?;

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => println!("{}", report.summary()),
    }
    Ok(())
}
