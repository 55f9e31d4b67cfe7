//! Resolution of corpus settings from the command line

use std::path::{Path, PathBuf};

use batchline_core::settings::{SETTINGS_FILE, Settings};
use tracing::debug;

use crate::error::CliError;

/// Global options shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Explicit settings file
    pub config: Option<PathBuf>,
    /// Corpus directory override
    pub corpus: Option<PathBuf>,
    /// Language override
    pub language: Option<String>,
}

/// Build the settings a command runs with
///
/// An explicit `--config` must exist. Otherwise `batchline.toml` in the
/// current directory is used when present, and `--corpus` plus
/// `--language` are enough on their own. Overrides always win.
pub fn resolve_settings(args: &GlobalArgs) -> Result<Settings, CliError> {
    resolve_in(args, Path::new("."))
}

fn resolve_in(args: &GlobalArgs, cwd: &Path) -> Result<Settings, CliError> {
    let default_file = cwd.join(SETTINGS_FILE);
    let mut settings = match (&args.config, &args.corpus, &args.language) {
        (Some(path), _, _) => Settings::load(path)?,
        (None, _, _) if default_file.is_file() => Settings::load(&default_file)?,
        (None, Some(corpus), Some(language)) => Settings::new(corpus, language),
        _ => {
            return Err(CliError::InvalidArgument(format!(
                "no {SETTINGS_FILE} found; pass --config FILE or both --corpus and --language"
            )));
        }
    };

    if let Some(corpus) = &args.corpus {
        settings.corpus = corpus.clone();
    }
    if let Some(language) = &args.language {
        settings.language = language.clone();
    }
    settings.validate()?;
    debug!(
        corpus = %settings.corpus.display(),
        language = %settings.language,
        "Resolved settings"
    );
    Ok(settings)
}
