//! One parsed manifest line

use serde::Serialize;

use super::paths;

/// A file reference from the manifest
///
/// `target_path` never starts with a path separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Year column, absent for single-column lists
    pub year: Option<String>,
    /// Original source location, absent for single-column lists
    pub source_path: Option<String>,
    /// Corpus-relative target location
    pub target_path: String,
}

impl ManifestEntry {
    /// Parse a line of the form `year<TAB>source[<TAB>target]` or `path`
    ///
    /// Returns `None` when the line has more than three columns.
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        let (year, source, target) = match fields.as_slice() {
            [path] => (None, None, *path),
            [year, source] => (Some(*year), Some(*source), *source),
            [year, source, target] => (Some(*year), Some(*source), *target),
            _ => return None,
        };
        Some(Self {
            year: year.filter(|y| !y.is_empty()).map(str::to_string),
            source_path: source.map(str::to_string),
            target_path: paths::strip_root(target).to_string(),
        })
    }

    /// Year column, or the year found in the target path, or `9999`
    pub fn year_or_unknown(&self) -> &str {
        match &self.year {
            Some(year) => year,
            None => self.path_year(),
        }
    }

    /// Year segment of the target's directory
    pub fn path_year(&self) -> &str {
        let dir = self
            .target_path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("");
        paths::year_from_path(dir)
    }

    /// File name of the target
    pub fn basename(&self) -> &str {
        self.target_path
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.target_path)
    }
}
