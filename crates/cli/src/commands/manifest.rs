//! CLI commands for reading the manifest

use batchline_core::manifest::{ManifestEntry, ManifestStore};
use batchline_core::settings::Settings;

use crate::error::CliError;
use crate::output::{OutputFormat, print_json};

/// Arguments for the `manifest window` command
pub struct ManifestWindowArgs {
    /// Number of entries to skip
    pub offset: usize,
    /// Window size; the configured default when absent
    pub limit: Option<usize>,
    pub format: OutputFormat,
}

/// Handle the `manifest count` command
pub fn handle_manifest_count(settings: &Settings) -> Result<(), CliError> {
    let store = ManifestStore::new(settings.manifest_path());
    println!("{}", store.len()?);
    Ok(())
}

/// Handle the `manifest window` command
pub fn handle_manifest_window(
    settings: &Settings,
    args: &ManifestWindowArgs,
) -> Result<(), CliError> {
    let store = ManifestStore::new(settings.manifest_path());
    let limit = args.limit.unwrap_or(settings.default_limit);
    let entries = store.windowed(args.offset, limit)?;
    print_entries(&entries, args.format)
}

/// Print entries as tab-separated `year source target` lines or JSON
pub fn print_entries(entries: &[ManifestEntry], format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => print_json(entries)?,
        OutputFormat::Text => {
            for entry in entries {
                println!(
                    "{}\t{}\t{}",
                    entry.year_or_unknown(),
                    entry.source_path.as_deref().unwrap_or("-"),
                    entry.target_path
                );
            }
        }
    }
    Ok(())
}
