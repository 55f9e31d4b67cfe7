//! Revision identifiers recorded in processing history
//!
//! Every history record carries the revision of the code that produced it.
//! Looking the revision up must never fail a run: any problem yields
//! [`UNKNOWN_REVISION`].

use std::path::PathBuf;

use tracing::debug;

/// Identifier used when no revision can be determined
pub const UNKNOWN_REVISION: &str = "unknown";

/// Source of the current revision identifier
pub trait RevisionSource: Send + Sync {
    /// Opaque revision string, or [`UNKNOWN_REVISION`]
    fn revision(&self) -> String;
}

/// Constant revision, for tests and for callers that already know it
#[derive(Debug, Clone)]
pub struct FixedRevision(pub String);

impl FixedRevision {
    pub fn new(revision: impl Into<String>) -> Self {
        Self(revision.into())
    }
}

impl RevisionSource for FixedRevision {
    fn revision(&self) -> String {
        self.0.clone()
    }
}

/// `git describe` of a working directory
#[derive(Debug, Clone, Default)]
pub struct GitDescribe {
    repo_dir: Option<PathBuf>,
}

impl GitDescribe {
    /// Describe the repository containing the current directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe the repository containing `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: Some(dir.into()),
        }
    }

    #[cfg(feature = "git")]
    fn describe(&self) -> Option<String> {
        let dir = match &self.repo_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().ok()?,
        };
        let repo = git2::Repository::discover(dir)
            .map_err(|e| debug!(error = %e, "No git repository for revision lookup"))
            .ok()?;
        let description = repo
            .describe(git2::DescribeOptions::new().describe_tags())
            .and_then(|d| d.format(None))
            .map_err(|e| debug!(error = %e, "git describe failed"))
            .ok()?;
        Some(description)
    }

    #[cfg(not(feature = "git"))]
    fn describe(&self) -> Option<String> {
        let mut command = std::process::Command::new("git");
        command.arg("describe");
        if let Some(dir) = &self.repo_dir {
            command.current_dir(dir);
        }
        let output = command
            .output()
            .map_err(|e| debug!(error = %e, "Could not run git describe"))
            .ok()?;
        if !output.status.success() {
            debug!(status = %output.status, "git describe failed");
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl RevisionSource for GitDescribe {
    fn revision(&self) -> String {
        self.describe()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| UNKNOWN_REVISION.to_string())
    }
}
