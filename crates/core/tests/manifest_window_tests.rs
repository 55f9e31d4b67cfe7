//! Integration tests for manifest windows
//!
//! Covers the three line formats, window boundaries and the blank-line stop.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use batchline_core::manifest::{ManifestError, ManifestStore, paths};

/// Write a manifest with `count` three-column entries
fn create_manifest(dir: &TempDir, count: usize) -> PathBuf {
    let path = dir.path().join("ALL_FILES.txt");
    let lines: String = (0..count)
        .map(|i| {
            let year = 1990 + (i % 5);
            format!("{year}\t/archive/{year}/doc_{i:03}.xml\t/{year}/doc_{i:03}.xml\n")
        })
        .collect();
    fs::write(&path, lines).expect("Failed to write manifest");
    path
}

#[test]
fn test_window_sizes() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ManifestStore::new(create_manifest(&dir, 10));

    assert_eq!(store.windowed(0, 3).unwrap().len(), 3);
    assert_eq!(store.windowed(8, 5).unwrap().len(), 2);
    assert_eq!(store.windowed(0, 0).unwrap().len(), 0);
    assert_eq!(store.windowed(0, 100).unwrap().len(), 10);
}

#[test]
fn test_window_at_end_is_empty() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ManifestStore::new(create_manifest(&dir, 10));

    assert!(store.windowed(10, 5).unwrap().is_empty());
    assert!(store.windowed(25, 5).unwrap().is_empty());
}

#[test]
fn test_consecutive_windows_cover_manifest() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ManifestStore::new(create_manifest(&dir, 10));
    let all = store.windowed(0, 10).unwrap();

    let mut stitched = Vec::new();
    let mut offset = 0;
    loop {
        let window = store.windowed(offset, 3).unwrap();
        if window.is_empty() {
            break;
        }
        offset += window.len();
        stitched.extend(window);
    }
    assert_eq!(stitched, all);
    assert_eq!(store.len().unwrap(), 10);
}

#[test]
fn test_entries_strip_leading_separator() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ManifestStore::new(create_manifest(&dir, 2));
    let entries = store.entries().unwrap();

    assert_eq!(entries[1].year.as_deref(), Some("1991"));
    assert_eq!(entries[1].source_path.as_deref(), Some("/archive/1991/doc_001.xml"));
    assert_eq!(entries[1].target_path, "1991/doc_001.xml");
    assert_eq!(entries[1].basename(), "doc_001.xml");
    assert_eq!(entries[1].path_year(), "1991");

    let resolved = paths::resolve(dir.path(), &entries[1].target_path);
    assert_eq!(resolved, dir.path().join("1991").join("doc_001.xml"));
}

#[test]
fn test_mixed_line_formats() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("files.txt");
    fs::write(
        &path,
        "/train/a.txt\n2001\t/src/b.xml\n\t/src/c.xml\t/c.xml\n",
    )
    .expect("Failed to write manifest");
    let entries = ManifestStore::new(&path).entries().unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].year, None);
    assert_eq!(entries[0].source_path, None);
    assert_eq!(entries[0].target_path, "train/a.txt");
    assert_eq!(entries[0].year_or_unknown(), "9999");

    assert_eq!(entries[1].year.as_deref(), Some("2001"));
    assert_eq!(entries[1].target_path, "src/b.xml");

    assert_eq!(entries[2].year, None);
    assert_eq!(entries[2].target_path, "c.xml");
}

#[test]
fn test_blank_line_ends_window() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("files.txt");
    fs::write(&path, "a.txt\nb.txt\n\nc.txt\n").expect("Failed to write manifest");
    let store = ManifestStore::new(&path);

    let names: Vec<_> = store
        .windowed(0, 10)
        .unwrap()
        .into_iter()
        .map(|e| e.target_path)
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
}

#[test]
fn test_too_many_columns_is_malformed() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("files.txt");
    fs::write(&path, "a.txt\n1\t2\t3\t4\n").expect("Failed to write manifest");

    match ManifestStore::new(&path).windowed(0, 10) {
        Err(ManifestError::Malformed { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected malformed line error, got {other:?}"),
    }
}

#[test]
fn test_missing_manifest_is_fatal() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ManifestStore::new(dir.path().join("missing.txt"));
    assert!(matches!(store.windowed(0, 1), Err(ManifestError::Read { .. })));
    assert!(matches!(store.len(), Err(ManifestError::Read { .. })));
}
