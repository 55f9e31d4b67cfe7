//! Scopes and per-stage consumed counts.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::error::{LedgerError, LedgerResult};

/// One ledger per (corpus, language).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Scope {
    corpus: PathBuf,
    language: String,
}

impl Scope {
    pub fn new(corpus: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            corpus: corpus.into(),
            language: language.into(),
        }
    }

    /// Corpus directory
    pub fn corpus(&self) -> &Path {
        &self.corpus
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// `<corpus>/<language>`, where ledger and manifest live
    pub fn dir(&self) -> PathBuf {
        self.corpus.join(&self.language)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.corpus.display(), self.language)
    }
}

/// Reject stage names that would not survive the `name<TAB>count` format.
///
/// Pipeline stage names are single whitespace-free tokens, so any
/// whitespace is refused.
pub fn check_stage_name(stage: &str) -> LedgerResult<()> {
    let reason = if stage.is_empty() {
        "empty"
    } else if stage.chars().any(char::is_whitespace) {
        "contains whitespace"
    } else {
        return Ok(());
    };
    Err(LedgerError::InvalidStage {
        stage: stage.to_string(),
        reason,
    })
}

/// Stage name to number of manifest entries consumed.
///
/// Absent stages have consumed nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StageCounts(BTreeMap<String, u64>);

impl StageCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for `stage`, 0 when absent
    pub fn get(&self, stage: &str) -> u64 {
        self.0.get(stage).copied().unwrap_or(0)
    }

    pub fn contains(&self, stage: &str) -> bool {
        self.0.contains_key(stage)
    }

    pub fn set(&mut self, stage: impl Into<String>, count: u64) {
        self.0.insert(stage.into(), count);
    }

    /// Add `delta` to `stage`, returning the new count
    pub fn advance(&mut self, stage: &str, delta: u64) -> u64 {
        let count = self.0.entry(stage.to_string()).or_insert(0);
        *count = count.saturating_add(delta);
        *count
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse `name<TAB>count` lines, skipping blank ones
    ///
    /// On failure returns the 1-based line number and the offending line.
    pub fn parse(text: &str) -> Result<Self, (usize, String)> {
        let mut counts = Self::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parsed = line
                .split_once('\t')
                .and_then(|(stage, count)| Some((stage.trim(), count.trim().parse::<u64>().ok()?)));
            match parsed {
                Some((stage, count)) if !stage.is_empty() => counts.set(stage, count),
                _ => return Err((idx + 1, line.to_string())),
            }
        }
        Ok(counts)
    }

    /// Serialize as `name<TAB>count` lines ordered by stage name
    pub fn to_ledger_string(&self) -> String {
        self.0
            .iter()
            .map(|(stage, count)| format!("{stage}\t{count}\n"))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for StageCounts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
