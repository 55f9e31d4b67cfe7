//! CLI commands for versioned datasets

use batchline_core::dataset::{Dataset, DatasetRegistry};
use batchline_core::pipeline::PipelineConfig;
use batchline_core::settings::Settings;

use crate::error::CliError;
use crate::output::{OutputFormat, format_rows, print_json};

/// Arguments for the `dataset init` command
pub struct DatasetInitArgs {
    pub category: String,
    /// Stage that writes into the dataset
    pub stage: String,
    /// Version identifier; a UUID is generated when absent
    pub version: Option<String>,
    /// Output directories; `files` when empty
    pub output_dirs: Vec<String>,
}

/// Arguments for the `dataset show` command
pub struct DatasetShowArgs {
    pub category: String,
    pub version: String,
    pub format: OutputFormat,
}

/// Arguments for the `dataset list` command
pub struct DatasetListArgs {
    pub category: String,
    pub format: OutputFormat,
}

/// Arguments for the `dataset check` command
pub struct DatasetCheckArgs {
    pub category: String,
    pub version: String,
    /// Stage that would read the dataset
    pub consumer: String,
}

/// Handle the `dataset init` command
pub fn handle_dataset_init(settings: &Settings, args: &DatasetInitArgs) -> Result<(), CliError> {
    let pipeline = PipelineConfig::load(&settings.pipeline_path())?;
    let registry = DatasetRegistry::new(settings.datasets_path());
    let version = args
        .version
        .clone()
        .unwrap_or_else(Dataset::generate_version_id);

    let mut dataset = registry.open(&args.category, &version, Some(&args.stage))?;
    if !args.output_dirs.is_empty() {
        dataset = dataset.with_output_dirs(args.output_dirs.iter().cloned());
    }
    dataset.initialize_on_disk(&pipeline)?;

    println!("Initialized dataset {} at: {}", version, dataset.path().display());
    Ok(())
}

/// Handle the `dataset show` command
pub fn handle_dataset_show(settings: &Settings, args: &DatasetShowArgs) -> Result<(), CliError> {
    let registry = DatasetRegistry::new(settings.datasets_path());
    let dataset = registry.open(&args.category, &args.version, None)?;
    if !dataset.is_initialized() {
        return Err(CliError::Dataset(format!(
            "Dataset not initialized: {}",
            dataset.path().display()
        )));
    }

    match args.format {
        OutputFormat::Json => print_json(&dataset)?,
        OutputFormat::Text => {
            let history = dataset.history()?;
            let mut rows = vec![
                ("path", dataset.path().display().to_string()),
                ("stage", dataset.stage_name().unwrap_or("-").to_string()),
                ("processed", dataset.files_processed().to_string()),
                ("batches", history.len().to_string()),
            ];
            if let Some(provenance) = dataset.provenance() {
                let trace: Vec<_> = provenance.trace().iter().map(|s| s.to_string()).collect();
                rows.push(("trace", trace.join(" | ")));
                rows.push(("head", provenance.head().to_string()));
            }
            if let Some(last) = history.last() {
                rows.push(("last run", format!("{} ({})", last.timestamp, last.revision)));
            }
            print!("{}", format_rows(&rows));
        }
    }
    Ok(())
}

/// Handle the `dataset list` command
pub fn handle_dataset_list(settings: &Settings, args: &DatasetListArgs) -> Result<(), CliError> {
    let registry = DatasetRegistry::new(settings.datasets_path());
    let datasets = registry.list(&args.category)?;
    match args.format {
        OutputFormat::Json => print_json(&datasets)?,
        OutputFormat::Text if datasets.is_empty() => {
            println!("No datasets in category '{}'", args.category)
        }
        OutputFormat::Text => {
            for dataset in &datasets {
                println!(
                    "{}\t{}\t{}",
                    dataset.version_id(),
                    dataset.stage_name().unwrap_or("-"),
                    dataset.files_processed()
                );
            }
        }
    }
    Ok(())
}

/// Handle the `dataset check` command
///
/// Fails when the dataset cannot feed the consumer stage.
pub fn handle_dataset_check(settings: &Settings, args: &DatasetCheckArgs) -> Result<(), CliError> {
    let pipeline = PipelineConfig::load(&settings.pipeline_path())?;
    let registry = DatasetRegistry::new(settings.datasets_path());
    let dataset = registry.open(&args.category, &args.version, None)?;

    let output = dataset.output_matches(&pipeline)?;
    let input = dataset.input_matches(&pipeline, &args.consumer)?;
    println!("output of its own stage: {}", if output { "yes" } else { "no" });
    println!("input for '{}': {}", args.consumer, if input { "yes" } else { "no" });

    if input {
        Ok(())
    } else {
        Err(CliError::Incompatible(format!(
            "{} cannot feed stage '{}' of the current pipeline",
            dataset.path().display(),
            args.consumer
        )))
    }
}
