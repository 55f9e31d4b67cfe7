mod commands;
mod context;
mod error;
mod logging;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::batch::{BatchCommitArgs, BatchNextArgs};
use crate::commands::dataset::{
    DatasetCheckArgs, DatasetInitArgs, DatasetListArgs, DatasetShowArgs,
};
use crate::commands::ledger::LedgerUpdateArgs;
use crate::commands::manifest::ManifestWindowArgs;
use crate::commands::pipeline::PipelineStageArgs;
use crate::commands::status::StatusArgs;
use crate::context::{GlobalArgs, resolve_settings};
use crate::error::CliError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "batchline",
    version,
    about = "Checkpointed batch processing of corpus manifests"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (default: ./batchline.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Corpus directory, overrides the settings file
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Corpus language, overrides the settings file
    #[arg(long, global = true)]
    language: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and update the stage ledger
    #[command(subcommand)]
    Ledger(LedgerCommand),
    /// Read the corpus manifest
    #[command(subcommand)]
    Manifest(ManifestCommand),
    /// Inspect the pipeline configuration
    #[command(subcommand)]
    Pipeline(PipelineCommand),
    /// Create and inspect versioned datasets
    #[command(subcommand)]
    Dataset(DatasetCommand),
    /// Fetch and record batches of a stage
    #[command(subcommand)]
    Batch(BatchCommand),
    /// Compare ledger and dataset progress of a stage
    Status {
        #[arg(long)]
        category: String,
        #[arg(long)]
        version: String,
        #[arg(long)]
        stage: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum LedgerCommand {
    /// Create an empty ledger for the corpus language
    Init,
    /// Print all stage counts
    Show {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Advance a stage count
    Update {
        stage: String,
        delta: u64,
    },
    /// List ledger backups, oldest first
    Backups,
}

#[derive(Subcommand)]
enum ManifestCommand {
    /// Print the number of manifest entries
    Count,
    /// Print a window of manifest entries
    Window {
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum PipelineCommand {
    /// Print every pipeline step
    Show {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Print the options of one stage
    Options {
        stage: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Print the trace and head of one stage
    Split {
        stage: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum DatasetCommand {
    /// Create a dataset for a stage of the current pipeline
    Init {
        #[arg(long)]
        category: String,
        #[arg(long)]
        stage: String,
        /// Version identifier (default: random UUID)
        #[arg(long)]
        version: Option<String>,
        /// Output directory, repeatable (default: files)
        #[arg(long = "output-dir")]
        output_dirs: Vec<String>,
    },
    /// Print a dataset's state and provenance
    Show {
        #[arg(long)]
        category: String,
        #[arg(long)]
        version: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// List the datasets of a category
    List {
        #[arg(long)]
        category: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Check whether a dataset can feed a stage
    Check {
        #[arg(long)]
        category: String,
        #[arg(long)]
        version: String,
        #[arg(long)]
        consumer: String,
    },
}

#[derive(Subcommand)]
enum BatchCommand {
    /// Print the next window of a stage
    Next {
        #[arg(long)]
        stage: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Record a processed batch
    Commit {
        #[arg(long)]
        stage: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        version: String,
        /// Number of files the stage processed
        #[arg(long)]
        processed: u64,
        #[arg(long)]
        limit: Option<usize>,
        /// Seconds the batch took
        #[arg(long, default_value_t = 0)]
        elapsed: u64,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    let global = GlobalArgs {
        config: cli.config,
        corpus: cli.corpus,
        language: cli.language,
    };
    run(cli.command, &global)?;
    Ok(())
}

fn run(command: Commands, global: &GlobalArgs) -> Result<(), CliError> {
    let settings = resolve_settings(global)?;

    match command {
        Commands::Ledger(cmd) => match cmd {
            LedgerCommand::Init => commands::ledger::handle_ledger_init(&settings),
            LedgerCommand::Show { format } => {
                commands::ledger::handle_ledger_show(&settings, format)
            }
            LedgerCommand::Update { stage, delta } => commands::ledger::handle_ledger_update(
                &settings,
                &LedgerUpdateArgs { stage, delta },
            ),
            LedgerCommand::Backups => commands::ledger::handle_ledger_backups(&settings),
        },
        Commands::Manifest(cmd) => match cmd {
            ManifestCommand::Count => commands::manifest::handle_manifest_count(&settings),
            ManifestCommand::Window {
                offset,
                limit,
                format,
            } => commands::manifest::handle_manifest_window(
                &settings,
                &ManifestWindowArgs {
                    offset,
                    limit,
                    format,
                },
            ),
        },
        Commands::Pipeline(cmd) => match cmd {
            PipelineCommand::Show { format } => {
                commands::pipeline::handle_pipeline_show(&settings, format)
            }
            PipelineCommand::Options { stage, format } => {
                commands::pipeline::handle_pipeline_options(
                    &settings,
                    &PipelineStageArgs { stage, format },
                )
            }
            PipelineCommand::Split { stage, format } => commands::pipeline::handle_pipeline_split(
                &settings,
                &PipelineStageArgs { stage, format },
            ),
        },
        Commands::Dataset(cmd) => match cmd {
            DatasetCommand::Init {
                category,
                stage,
                version,
                output_dirs,
            } => commands::dataset::handle_dataset_init(
                &settings,
                &DatasetInitArgs {
                    category,
                    stage,
                    version,
                    output_dirs,
                },
            ),
            DatasetCommand::Show {
                category,
                version,
                format,
            } => commands::dataset::handle_dataset_show(
                &settings,
                &DatasetShowArgs {
                    category,
                    version,
                    format,
                },
            ),
            DatasetCommand::List { category, format } => commands::dataset::handle_dataset_list(
                &settings,
                &DatasetListArgs { category, format },
            ),
            DatasetCommand::Check {
                category,
                version,
                consumer,
            } => commands::dataset::handle_dataset_check(
                &settings,
                &DatasetCheckArgs {
                    category,
                    version,
                    consumer,
                },
            ),
        },
        Commands::Batch(cmd) => match cmd {
            BatchCommand::Next {
                stage,
                limit,
                format,
            } => commands::batch::handle_batch_next(
                &settings,
                &BatchNextArgs {
                    stage,
                    limit,
                    format,
                },
            ),
            BatchCommand::Commit {
                stage,
                category,
                version,
                processed,
                limit,
                elapsed,
                format,
            } => commands::batch::handle_batch_commit(
                &settings,
                &BatchCommitArgs {
                    stage,
                    category,
                    version,
                    processed,
                    limit,
                    elapsed,
                    format,
                },
            ),
        },
        Commands::Status {
            category,
            version,
            stage,
            format,
        } => commands::status::handle_status(
            &settings,
            &StatusArgs {
                category,
                version,
                stage,
                format,
            },
        ),
    }
}
