//! Windowed reads over a manifest file

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::entry::ManifestEntry;
use super::error::{ManifestError, ManifestResult};

/// An append-only manifest of file entries, one per line
///
/// Windows are addressed by line ordinal, not byte offset: a read at
/// `offset` scans past `offset` newlines first, so its cost grows with the
/// offset. Offsets are the counts stored in the stage ledger.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    /// Create a store for the manifest at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the manifest file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read at most `limit` entries starting at line `offset`
    ///
    /// Returns fewer entries when the file ends (or an empty line is met)
    /// first, and an empty window when `offset` is at or past the end.
    pub fn windowed(&self, offset: usize, limit: usize) -> ManifestResult<Vec<ManifestEntry>> {
        let mut reader = self.reader()?;

        let mut buf = Vec::new();
        for _ in 0..offset {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| self.read_error(e))?;
            if read == 0 {
                debug!(path = %self.path.display(), offset, "Manifest window starts past end of file");
                return Ok(Vec::new());
            }
        }

        let mut entries = Vec::with_capacity(limit.min(4096));
        for (idx, line) in reader.lines().take(limit).enumerate() {
            let line = line.map_err(|e| self.read_error(e))?;
            if line.trim().is_empty() {
                break;
            }
            let line = line.trim_end();
            let entry = ManifestEntry::parse(line).ok_or_else(|| ManifestError::Malformed {
                path: self.path.clone(),
                line: offset + idx + 1,
                content: line.to_string(),
            })?;
            entries.push(entry);
        }

        debug!(
            path = %self.path.display(),
            offset,
            limit,
            returned = entries.len(),
            "Read manifest window"
        );
        Ok(entries)
    }

    /// Every entry in manifest order
    pub fn entries(&self) -> ManifestResult<Vec<ManifestEntry>> {
        self.windowed(0, usize::MAX)
    }

    /// Number of lines in the manifest
    pub fn len(&self) -> ManifestResult<usize> {
        let mut reader = self.reader()?;
        let mut buf = Vec::new();
        let mut count = 0;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| self.read_error(e))?;
            if read == 0 {
                return Ok(count);
            }
            count += 1;
        }
    }

    /// Whether the manifest has no lines
    pub fn is_empty(&self) -> ManifestResult<bool> {
        Ok(self.len()? == 0)
    }

    fn reader(&self) -> ManifestResult<BufReader<File>> {
        File::open(&self.path)
            .map(BufReader::new)
            .map_err(|e| self.read_error(e))
    }

    fn read_error(&self, source: std::io::Error) -> ManifestError {
        ManifestError::Read {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifest(dir: &TempDir, lines: &[&str]) -> ManifestStore {
        let path = dir.path().join("ALL_FILES.txt");
        let mut text = lines.join("\n");
        text.push('\n');
        std::fs::write(&path, text).unwrap();
        ManifestStore::new(path)
    }

    #[test]
    fn test_windowed_reads_consecutive_slices() {
        let dir = TempDir::new().unwrap();
        let store = manifest(&dir, &["1999\ta\ta", "1999\tb\tb", "2000\tc\tc", "2000\td\td"]);

        let first = store.windowed(0, 2).unwrap();
        let second = store.windowed(2, 2).unwrap();
        assert_eq!(
            first.iter().map(|e| e.target_path.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(
            second.iter().map(|e| e.target_path.as_str()).collect::<Vec<_>>(),
            vec!["c", "d"]
        );
    }

    #[test]
    fn test_windowed_short_and_empty_windows() {
        let dir = TempDir::new().unwrap();
        let store = manifest(&dir, &["a", "b", "c"]);

        assert_eq!(store.windowed(2, 10).unwrap().len(), 1);
        assert!(store.windowed(3, 10).unwrap().is_empty());
        assert!(store.windowed(50, 10).unwrap().is_empty());
        assert!(store.windowed(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_windowed_stops_at_blank_line() {
        let dir = TempDir::new().unwrap();
        let store = manifest(&dir, &["a", "", "c"]);
        assert_eq!(store.windowed(0, 3).unwrap().len(), 1);
    }

    #[test]
    fn test_last_line_without_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.txt");
        std::fs::write(&path, "a\nb").unwrap();
        let store = ManifestStore::new(path);
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.windowed(1, 5).unwrap()[0].target_path, "b");
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let dir = TempDir::new().unwrap();
        let store = manifest(&dir, &["a", "1\t2\t3\t4"]);
        let err = store.windowed(0, 5).unwrap_err();
        assert!(matches!(err, ManifestError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_missing_manifest_is_error() {
        let store = ManifestStore::new("/nonexistent/ALL_FILES.txt");
        assert!(matches!(
            store.windowed(0, 1),
            Err(ManifestError::Read { .. })
        ));
        assert!(store.len().is_err());
    }
}
