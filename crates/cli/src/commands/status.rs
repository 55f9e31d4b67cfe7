//! CLI command comparing ledger and dataset progress

use serde::Serialize;
use tracing::warn;

use batchline_core::dataset::DatasetRegistry;
use batchline_core::ledger::StageLedger;
use batchline_core::manifest::ManifestStore;
use batchline_core::settings::Settings;

use crate::error::CliError;
use crate::output::{OutputFormat, format_rows, print_json};

/// Arguments for the `status` command
pub struct StatusArgs {
    pub category: String,
    pub version: String,
    pub stage: String,
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StageStatus {
    stage: String,
    manifest_entries: usize,
    ledger_count: u64,
    dataset_processed: u64,
    in_sync: bool,
}

/// Handle the `status` command
///
/// Both counters are reported as they are; a disagreement is only flagged.
pub fn handle_status(settings: &Settings, args: &StatusArgs) -> Result<(), CliError> {
    let manifest_entries = ManifestStore::new(settings.manifest_path()).len()?;
    let ledger_count = StageLedger::file().count(&settings.scope(), &args.stage)?;
    let dataset = DatasetRegistry::new(settings.datasets_path()).open(
        &args.category,
        &args.version,
        None,
    )?;

    let status = StageStatus {
        stage: args.stage.clone(),
        manifest_entries,
        ledger_count,
        dataset_processed: dataset.files_processed(),
        in_sync: ledger_count == dataset.files_processed(),
    };
    if !status.in_sync {
        warn!(
            stage = %status.stage,
            ledger = status.ledger_count,
            dataset = status.dataset_processed,
            path = %dataset.path().display(),
            "Ledger and dataset counts disagree"
        );
    }

    match args.format {
        OutputFormat::Json => print_json(&status)?,
        OutputFormat::Text => {
            let rows = [
                ("stage", status.stage.clone()),
                ("manifest", status.manifest_entries.to_string()),
                ("ledger", status.ledger_count.to_string()),
                ("dataset", status.dataset_processed.to_string()),
                ("in sync", if status.in_sync { "yes" } else { "no" }.to_string()),
            ];
            print!("{}", format_rows(&rows));
        }
    }
    Ok(())
}
