//! Path helpers for manifest targets

use std::path::{Path, PathBuf};

/// Year used when a path carries no year segment
pub const UNKNOWN_YEAR: &str = "9999";

/// Strip leading separators so the path can be joined onto a corpus root
pub fn strip_root(path: &str) -> &str {
    path.trim_start_matches(['/', '\\'])
}

/// Resolve a manifest target against a root directory
pub fn resolve(root: &Path, target: &str) -> PathBuf {
    root.join(strip_root(target))
}

/// First path segment made of exactly four ASCII digits, or [`UNKNOWN_YEAR`]
pub fn year_from_path(path: &str) -> &str {
    path.split(['/', '\\'])
        .find(|segment| segment.len() == 4 && segment.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(UNKNOWN_YEAR)
}
