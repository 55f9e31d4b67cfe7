//! Corpus settings loaded from TOML
//!
//! ```toml
//! corpus = "/data/patents/uspto"
//! language = "en"
//! # optional, shown with their defaults
//! manifest = "/data/patents/uspto/en/ALL_FILES.txt"
//! pipeline = "/data/patents/uspto/pipeline.txt"
//! datasets = "/data/patents/uspto/en/data"
//! default_limit = 500
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::Scope;

/// Default settings file name
pub const SETTINGS_FILE: &str = "batchline.toml";

/// Batch size used when neither settings nor arguments give one
pub const DEFAULT_LIMIT: usize = 500;

/// Errors that can occur while loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

impl SettingsError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            SettingsError::Read { .. } => format!(
                "{self}\n\nHint: Create {SETTINGS_FILE} or pass --corpus and --language."
            ),
            _ => self.to_string(),
        }
    }
}

/// Where a corpus lives and how it is processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Corpus directory
    pub corpus: PathBuf,
    /// Language subdirectory of the corpus
    pub language: String,
    /// Manifest file; defaults to `<corpus>/<language>/ALL_FILES.txt`
    #[serde(default)]
    pub manifest: Option<PathBuf>,
    /// Pipeline configuration; defaults to `<corpus>/pipeline.txt`
    #[serde(default)]
    pub pipeline: Option<PathBuf>,
    /// Dataset root; defaults to `<corpus>/<language>/data`
    #[serde(default)]
    pub datasets: Option<PathBuf>,
    /// Batch size used when none is given
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Settings {
    /// Settings with every optional path defaulted
    pub fn new(corpus: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            corpus: corpus.into(),
            language: language.into(),
            manifest: None,
            pipeline: None,
            datasets: None,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Parse settings from TOML text
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.language.trim().is_empty() {
            return Err(SettingsError::Invalid("language must not be empty".into()));
        }
        if self.default_limit == 0 {
            return Err(SettingsError::Invalid(
                "default_limit must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Ledger scope of this corpus and language
    pub fn scope(&self) -> Scope {
        Scope::new(&self.corpus, &self.language)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.manifest
            .clone()
            .unwrap_or_else(|| self.scope().dir().join("ALL_FILES.txt"))
    }

    pub fn pipeline_path(&self) -> PathBuf {
        self.pipeline
            .clone()
            .unwrap_or_else(|| self.corpus.join("pipeline.txt"))
    }

    pub fn datasets_path(&self) -> PathBuf {
        self.datasets
            .clone()
            .unwrap_or_else(|| self.scope().dir().join("data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_settings_use_defaults() {
        let settings =
            Settings::from_toml("corpus = \"/c\"\nlanguage = \"en\"\n", Path::new("b.toml"))
                .unwrap();
        assert_eq!(settings.default_limit, DEFAULT_LIMIT);
        assert_eq!(settings.manifest_path(), PathBuf::from("/c/en/ALL_FILES.txt"));
        assert_eq!(settings.pipeline_path(), PathBuf::from("/c/pipeline.txt"));
        assert_eq!(settings.datasets_path(), PathBuf::from("/c/en/data"));
        assert_eq!(settings.scope(), Scope::new("/c", "en"));
    }

    #[test]
    fn test_explicit_paths_win() {
        let text = r#"
corpus = "/c"
language = "de"
manifest = "/lists/train.txt"
pipeline = "/etc/pipeline.txt"
default_limit = 20
"#;
        let settings = Settings::from_toml(text, Path::new("b.toml")).unwrap();
        assert_eq!(settings.manifest_path(), PathBuf::from("/lists/train.txt"));
        assert_eq!(settings.pipeline_path(), PathBuf::from("/etc/pipeline.txt"));
        assert_eq!(settings.default_limit, 20);
    }

    #[test]
    fn test_invalid_settings() {
        let err = Settings::from_toml("corpus = \"/c\"\n", Path::new("b.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));

        let err = Settings::from_toml(
            "corpus = \"/c\"\nlanguage = \"en\"\ndefault_limit = 0\n",
            Path::new("b.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load(Path::new("/nonexistent/batchline.toml")).unwrap_err();
        assert!(err.user_message().contains("Hint:"));
    }
}
