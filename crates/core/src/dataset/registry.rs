//! Discovery and selection of dataset versions

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{DatasetError, DatasetResult};
use super::versioned::Dataset;
use crate::pipeline::PipelineConfig;

/// Outcome of selecting a dataset by provenance
#[derive(Debug)]
pub enum Selection {
    /// Exactly one dataset qualifies
    Found(Dataset),
    /// Several datasets qualify; the caller has to choose
    Ambiguous(Vec<Dataset>),
    NotFound,
}

impl Selection {
    /// Turn anything but a unique match into an error
    pub fn into_result(self, category: &str) -> DatasetResult<Dataset> {
        match self {
            Selection::Found(dataset) => Ok(dataset),
            Selection::Ambiguous(candidates) => Err(DatasetError::AmbiguousCandidates {
                category: category.to_string(),
                candidates: candidates
                    .iter()
                    .map(|d| d.version_id().to_string())
                    .collect(),
            }),
            Selection::NotFound => Err(DatasetError::NoCandidates {
                category: category.to_string(),
            }),
        }
    }

    fn from_candidates(mut candidates: Vec<Dataset>) -> Self {
        match candidates.len() {
            0 => Selection::NotFound,
            1 => Selection::Found(candidates.remove(0)),
            _ => Selection::Ambiguous(candidates),
        }
    }
}

/// All dataset categories under one root directory
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    root: PathBuf,
}

impl DatasetRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Version identifiers of `category`, sorted
    ///
    /// A category without a directory has no versions.
    pub fn versions(&self, category: &str) -> DatasetResult<Vec<String>> {
        let dir = self.root.join(category);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DatasetError::io(dir, e)),
        };
        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DatasetError::io(&dir, e))?;
            if entry.path().is_dir() {
                versions.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        versions.sort();
        Ok(versions)
    }

    /// Open one version for reading or as the output of `stage_name`
    pub fn open(
        &self,
        category: &str,
        version_id: &str,
        stage_name: Option<&str>,
    ) -> DatasetResult<Dataset> {
        Dataset::open(&self.root, category, version_id, stage_name)
    }

    /// Create and initialize a new version produced by `stage_name`
    ///
    /// A version identifier is generated when none is given.
    pub fn create(
        &self,
        category: &str,
        stage_name: &str,
        pipeline: &PipelineConfig,
        version_id: Option<&str>,
    ) -> DatasetResult<Dataset> {
        let version_id = version_id
            .map(str::to_string)
            .unwrap_or_else(Dataset::generate_version_id);
        let mut dataset = self.open(category, &version_id, Some(stage_name))?;
        dataset.initialize_on_disk(pipeline)?;
        Ok(dataset)
    }

    /// Every initialized version of `category`
    pub fn list(&self, category: &str) -> DatasetResult<Vec<Dataset>> {
        let mut datasets = Vec::new();
        for version in self.versions(category)? {
            let dataset = self.open(category, &version, None)?;
            if dataset.is_initialized() {
                datasets.push(dataset);
            } else {
                debug!("Skipping uninitialized dataset {}", dataset.path().display());
            }
        }
        Ok(datasets)
    }

    /// Version of `category` that may feed `consumer` in `pipeline`
    pub fn select_input(
        &self,
        category: &str,
        pipeline: &PipelineConfig,
        consumer: &str,
    ) -> DatasetResult<Selection> {
        let mut candidates = Vec::new();
        for dataset in self.list(category)? {
            if dataset.input_matches(pipeline, consumer)? {
                candidates.push(dataset);
            }
        }
        let selection = Selection::from_candidates(candidates);
        if let Selection::Ambiguous(found) = &selection {
            warn!(
                "{} datasets in '{}' qualify as input for '{}'",
                found.len(),
                category,
                consumer
            );
        }
        Ok(selection)
    }

    /// Version of `category` that `stage` of `pipeline` writes into
    pub fn select_output(
        &self,
        category: &str,
        pipeline: &PipelineConfig,
        stage: &str,
    ) -> DatasetResult<Selection> {
        let mut candidates = Vec::new();
        for dataset in self.list(category)? {
            if dataset.stage_name() == Some(stage) && dataset.output_matches(pipeline)? {
                candidates.push(dataset);
            }
        }
        Ok(Selection::from_candidates(candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pipeline() -> PipelineConfig {
        PipelineConfig::parse("a\nb --x=1\nc\n")
    }

    #[test]
    fn test_missing_category_is_empty() {
        let dir = TempDir::new().unwrap();
        let registry = DatasetRegistry::new(dir.path());
        assert!(registry.versions("nothing").unwrap().is_empty());
        assert!(matches!(
            registry.select_input("nothing", &pipeline(), "c").unwrap(),
            Selection::NotFound
        ));
    }

    #[test]
    fn test_versions_sorted_and_uninitialized_skipped() {
        let dir = TempDir::new().unwrap();
        let registry = DatasetRegistry::new(dir.path());
        registry.create("d_b", "b", &pipeline(), Some("02")).unwrap();
        registry.create("d_b", "b", &pipeline(), Some("01")).unwrap();
        fs::create_dir_all(dir.path().join("d_b/00")).unwrap();

        assert_eq!(registry.versions("d_b").unwrap(), vec!["00", "01", "02"]);
        let listed: Vec<_> = registry
            .list("d_b")
            .unwrap()
            .into_iter()
            .map(|d| d.version_id().to_string())
            .collect();
        assert_eq!(listed, vec!["01", "02"]);
    }

    #[test]
    fn test_select_input_unique() {
        let dir = TempDir::new().unwrap();
        let registry = DatasetRegistry::new(dir.path());
        registry.create("d_b", "b", &pipeline(), Some("01")).unwrap();
        let other = PipelineConfig::parse("a\nb --x=2\nc\n");
        registry.create("d_b", "b", &other, Some("02")).unwrap();

        let found = registry
            .select_input("d_b", &pipeline(), "c")
            .unwrap()
            .into_result("d_b")
            .unwrap();
        assert_eq!(found.version_id(), "01");
    }

    #[test]
    fn test_select_input_ambiguous() {
        let dir = TempDir::new().unwrap();
        let registry = DatasetRegistry::new(dir.path());
        registry.create("d_b", "b", &pipeline(), Some("01")).unwrap();
        registry.create("d_b", "b", &pipeline(), Some("02")).unwrap();

        let err = registry
            .select_input("d_b", &pipeline(), "c")
            .unwrap()
            .into_result("d_b")
            .unwrap_err();
        match err {
            DatasetError::AmbiguousCandidates { candidates, .. } => {
                assert_eq!(candidates, vec!["01", "02"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_select_output() {
        let dir = TempDir::new().unwrap();
        let registry = DatasetRegistry::new(dir.path());
        registry.create("d_b", "b", &pipeline(), Some("01")).unwrap();

        let found = registry.select_output("d_b", &pipeline(), "b").unwrap();
        assert!(matches!(found, Selection::Found(ref d) if d.version_id() == "01"));

        let other = PipelineConfig::parse("a --y\nb --x=1\nc\n");
        assert!(matches!(
            registry.select_output("d_b", &other, "b").unwrap(),
            Selection::NotFound
        ));
    }

    #[test]
    fn test_select_unknown_consumer_fails() {
        let dir = TempDir::new().unwrap();
        let registry = DatasetRegistry::new(dir.path());
        registry.create("d_b", "b", &pipeline(), Some("01")).unwrap();
        assert!(matches!(
            registry.select_input("d_b", &pipeline(), "zzz"),
            Err(DatasetError::Pipeline(_))
        ));
    }
}
