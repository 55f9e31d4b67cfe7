//! CLI commands for inspecting the pipeline configuration

use batchline_core::pipeline::PipelineConfig;
use batchline_core::settings::Settings;

use crate::error::CliError;
use crate::output::{OutputFormat, print_json};

/// Arguments for the `pipeline options` and `pipeline split` commands
pub struct PipelineStageArgs {
    pub stage: String,
    pub format: OutputFormat,
}

fn load(settings: &Settings) -> Result<PipelineConfig, CliError> {
    Ok(PipelineConfig::load(&settings.pipeline_path())?)
}

/// Handle the `pipeline show` command
pub fn handle_pipeline_show(settings: &Settings, format: OutputFormat) -> Result<(), CliError> {
    let pipeline = load(settings)?;
    match format {
        OutputFormat::Json => print_json(&pipeline)?,
        OutputFormat::Text => {
            for (idx, step) in pipeline.steps().iter().enumerate() {
                println!("{:>3}  {step}", idx + 1);
            }
        }
    }
    Ok(())
}

/// Handle the `pipeline options` command
///
/// An unknown stage prints no options and logs a warning.
pub fn handle_pipeline_options(
    settings: &Settings,
    args: &PipelineStageArgs,
) -> Result<(), CliError> {
    let pipeline = load(settings)?;
    let options = pipeline.options_for(&args.stage);
    match args.format {
        OutputFormat::Json => print_json(options)?,
        OutputFormat::Text => {
            for (key, value) in options {
                println!("{key}\t{}", value.as_str());
            }
        }
    }
    Ok(())
}

/// Handle the `pipeline split` command
pub fn handle_pipeline_split(
    settings: &Settings,
    args: &PipelineStageArgs,
) -> Result<(), CliError> {
    let pipeline = load(settings)?;
    let provenance = pipeline.split(&args.stage)?;
    match args.format {
        OutputFormat::Json => print_json(&provenance)?,
        OutputFormat::Text => {
            println!("trace:");
            for step in provenance.trace() {
                println!("  {step}");
            }
            println!("head:\n  {}", provenance.head());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(dir: &TempDir) -> Settings {
        let settings = Settings::new(dir.path(), "en");
        std::fs::write(settings.pipeline_path(), "xml2txt\ntxt2tag --lang=en\n").unwrap();
        settings
    }

    #[test]
    fn test_split_unknown_stage_fails() {
        let dir = TempDir::new().unwrap();
        let args = PipelineStageArgs {
            stage: "nope".into(),
            format: OutputFormat::Text,
        };
        assert!(matches!(
            handle_pipeline_split(&settings(&dir), &args),
            Err(CliError::Pipeline(_))
        ));
    }

    #[test]
    fn test_options_of_unknown_stage_is_empty() {
        let dir = TempDir::new().unwrap();
        let args = PipelineStageArgs {
            stage: "nope".into(),
            format: OutputFormat::Json,
        };
        handle_pipeline_options(&settings(&dir), &args).unwrap();
    }

    #[test]
    fn test_missing_pipeline_file_fails() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::new(dir.path(), "en");
        assert!(matches!(
            handle_pipeline_show(&settings, OutputFormat::Text),
            Err(CliError::Pipeline(_))
        ));
    }
}
