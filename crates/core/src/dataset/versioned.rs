//! One version of a dataset category and its on-disk state

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, Timelike};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{DatasetError, DatasetResult};
use super::history::ProcessingHistoryRecord;
use crate::pipeline::{PipelineConfig, PipelineError, Provenance};
use crate::revision::RevisionSource;

const CONFIG_DIR: &str = "config";
const STATE_DIR: &str = "state";
const HEAD_FILE: &str = "pipeline-head.txt";
const TRACE_FILE: &str = "pipeline-trace.txt";
const PROCESSED_FILE: &str = "processed.txt";
const HISTORY_FILE: &str = "processing-history.txt";

/// Output directory created when none are configured
pub const DEFAULT_OUTPUT_DIR: &str = "files";

/// A versioned dataset at `<root>/<category>/<version_id>`
///
/// ```text
/// <version_id>/
///   config/pipeline-head.txt
///   config/pipeline-trace.txt
///   state/processed.txt
///   state/processing-history.txt
///   files/
/// ```
///
/// `files_processed` mirrors `state/processed.txt`. Provenance is written
/// once by [`Dataset::initialize_on_disk`] and never rewritten.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    root: PathBuf,
    category: String,
    version_id: String,
    stage_name: Option<String>,
    output_dirs: Vec<String>,
    files_processed: u64,
    provenance: Option<Provenance>,
}

impl Dataset {
    /// Open a dataset handle, loading its state if it is initialized
    ///
    /// `stage_name` may be `None` for datasets that are only read; it is
    /// then taken from the stored head.
    pub fn open(
        root: impl Into<PathBuf>,
        category: impl Into<String>,
        version_id: impl Into<String>,
        stage_name: Option<&str>,
    ) -> DatasetResult<Self> {
        let mut dataset = Self {
            root: root.into(),
            category: category.into(),
            version_id: version_id.into(),
            stage_name: stage_name.map(str::to_string),
            output_dirs: vec![DEFAULT_OUTPUT_DIR.to_string()],
            files_processed: 0,
            provenance: None,
        };
        if dataset.is_initialized() {
            dataset.load_from_disk()?;
        }
        Ok(dataset)
    }

    /// Replace the output directories created on initialization
    pub fn with_output_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Fresh random version identifier
    pub fn generate_version_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    pub fn stage_name(&self) -> Option<&str> {
        self.stage_name.as_deref()
    }

    pub fn output_dirs(&self) -> &[String] {
        &self.output_dirs
    }

    pub fn files_processed(&self) -> u64 {
        self.files_processed
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    /// `<root>/<category>/<version_id>`
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.category).join(&self.version_id)
    }

    /// Directory the first output directory resolves to
    pub fn files_dir(&self) -> PathBuf {
        let dir = self
            .output_dirs
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_OUTPUT_DIR);
        self.path().join(dir)
    }

    pub fn head_path(&self) -> PathBuf {
        self.path().join(CONFIG_DIR).join(HEAD_FILE)
    }

    pub fn trace_path(&self) -> PathBuf {
        self.path().join(CONFIG_DIR).join(TRACE_FILE)
    }

    pub fn processed_path(&self) -> PathBuf {
        self.path().join(STATE_DIR).join(PROCESSED_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.path().join(STATE_DIR).join(HISTORY_FILE)
    }

    /// Whether the dataset directory exists at all
    pub fn exists(&self) -> bool {
        self.path().is_dir()
    }

    /// Whether the dataset carries a processed counter on disk
    pub fn is_initialized(&self) -> bool {
        self.processed_path().is_file()
    }

    /// Create the directory layout and record provenance for `pipeline`
    ///
    /// Directories that already exist are reused. Fails if the dataset is
    /// already initialized or has no stage name.
    pub fn initialize_on_disk(&mut self, pipeline: &PipelineConfig) -> DatasetResult<()> {
        if self.is_initialized() {
            return Err(DatasetError::AlreadyInitialized(self.path()));
        }
        let stage = self
            .stage_name
            .clone()
            .ok_or_else(|| DatasetError::MissingStage(self.path()))?;
        let provenance = pipeline.split(&stage)?;

        let base = self.path();
        ensure_dir(&base.join(CONFIG_DIR))?;
        ensure_dir(&base.join(STATE_DIR))?;
        for dir in &self.output_dirs {
            ensure_dir(&base.join(dir))?;
        }

        write_file(&self.head_path(), &provenance.head_to_string())?;
        write_file(&self.trace_path(), &provenance.trace_to_string())?;
        write_file(&self.processed_path(), "0\n")?;
        write_file(&self.history_path(), "")?;

        self.files_processed = 0;
        self.provenance = Some(provenance);
        info!(
            "Initialized dataset {} for stage '{}'",
            base.display(),
            stage
        );
        Ok(())
    }

    /// Reload the processed counter and provenance from disk
    pub fn load_from_disk(&mut self) -> DatasetResult<()> {
        self.files_processed = self.read_processed()?;

        let head_path = self.head_path();
        let head_text = read_file(&head_path)?;
        let mut head_steps = PipelineConfig::parse(&head_text).steps().to_vec();
        if head_steps.len() != 1 {
            return Err(PipelineError::InvalidHead {
                path: head_path,
                found: head_steps.len(),
            }
            .into());
        }
        let head = head_steps.remove(0);
        let trace = PipelineConfig::parse(&read_file(&self.trace_path())?)
            .steps()
            .to_vec();

        match &self.stage_name {
            Some(expected) if *expected != head.name => {
                return Err(DatasetError::StageMismatch {
                    path: self.path(),
                    expected: expected.clone(),
                    found: head.name,
                });
            }
            Some(_) => {}
            None => self.stage_name = Some(head.name.clone()),
        }

        self.provenance = Some(Provenance::new(trace, head));
        debug!(
            "Loaded dataset {} ({} files processed)",
            self.path().display(),
            self.files_processed
        );
        Ok(())
    }

    /// Add `count` to the persisted processed counter and return the total
    ///
    /// The counter is re-read first so that several handles on the same
    /// dataset accumulate rather than overwrite each other.
    pub fn update_processed_count(&mut self, count: u64) -> DatasetResult<u64> {
        if !self.is_initialized() {
            return Err(DatasetError::NotInitialized(self.path()));
        }
        let total = self.read_processed()?.saturating_add(count);
        write_file(&self.processed_path(), &format!("{total}\n"))?;
        self.files_processed = total;
        Ok(total)
    }

    /// Persist the processed counter and append a history record
    ///
    /// `limit` is the batch size that was requested and `started` the
    /// moment the batch began.
    pub fn update_state(
        &mut self,
        limit: usize,
        started: Instant,
        revision: &dyn RevisionSource,
    ) -> DatasetResult<ProcessingHistoryRecord> {
        if !self.is_initialized() {
            return Err(DatasetError::NotInitialized(self.path()));
        }
        let stage_name = self
            .stage_name
            .clone()
            .ok_or_else(|| DatasetError::MissingStage(self.path()))?;
        write_file(&self.processed_path(), &format!("{}\n", self.files_processed))?;

        let now = Local::now().naive_local();
        let record = ProcessingHistoryRecord {
            stage_name,
            limit,
            timestamp: now.with_nanosecond(0).unwrap_or(now),
            revision: revision.revision(),
            elapsed_seconds: started.elapsed().as_secs(),
        };
        let history_path = self.history_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&history_path)
            .map_err(|e| DatasetError::io(&history_path, e))?;
        writeln!(file, "{record}").map_err(|e| DatasetError::io(&history_path, e))?;
        Ok(record)
    }

    /// Every history record, oldest first
    pub fn history(&self) -> DatasetResult<Vec<ProcessingHistoryRecord>> {
        let path = self.history_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DatasetError::io(path, e)),
        };
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(idx, line)| {
                ProcessingHistoryRecord::parse(line).ok_or_else(|| DatasetError::Corrupt {
                    path: path.clone(),
                    reason: format!("line {}: {line:?}", idx + 1),
                })
            })
            .collect()
    }

    /// Whether this dataset can feed stage `consumer` of `pipeline`
    pub fn input_matches(&self, pipeline: &PipelineConfig, consumer: &str) -> DatasetResult<bool> {
        let provenance = self.require_provenance()?;
        Ok(provenance.is_input_for(pipeline, consumer)?)
    }

    /// Whether this dataset is where its own stage of `pipeline` writes
    pub fn output_matches(&self, pipeline: &PipelineConfig) -> DatasetResult<bool> {
        let provenance = self.require_provenance()?;
        let stage = self
            .stage_name
            .as_deref()
            .ok_or_else(|| DatasetError::MissingStage(self.path()))?;
        Ok(provenance.is_output_of(pipeline, stage)?)
    }

    fn require_provenance(&self) -> DatasetResult<&Provenance> {
        self.provenance
            .as_ref()
            .ok_or_else(|| DatasetError::NotInitialized(self.path()))
    }

    fn read_processed(&self) -> DatasetResult<u64> {
        let path = self.processed_path();
        let text = read_file(&path)?;
        text.trim().parse().map_err(|_| DatasetError::Corrupt {
            path,
            reason: format!("expected a file count, found {:?}", text.trim()),
        })
    }
}

fn ensure_dir(path: &Path) -> DatasetResult<()> {
    fs::create_dir_all(path).map_err(|e| DatasetError::io(path, e))
}

fn read_file(path: &Path) -> DatasetResult<String> {
    fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))
}

fn write_file(path: &Path, contents: &str) -> DatasetResult<()> {
    fs::write(path, contents).map_err(|e| DatasetError::io(path, e))
}
