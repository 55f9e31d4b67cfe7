//! Ledger storage backends.
//!
//! [`LedgerBackend`] is the storage contract behind [`StageLedger`]:
//! load a scope's counts, and store new counts after keeping a backup of the
//! previous ones. [`FileLedgerBackend`] keeps one `ALL_STAGES.txt` per scope
//! with timestamped backups next to it; [`MemoryLedgerBackend`] keeps
//! everything in memory for tests.
//!
//! [`StageLedger`]: super::StageLedger

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Local;
use tracing::debug;

use super::counts::{Scope, StageCounts};
use super::error::{LedgerError, LedgerResult};

/// Storage contract for stage ledgers.
///
/// Implementations must be `Send + Sync` for use behind `Arc<dyn LedgerBackend>`.
pub trait LedgerBackend: Send + Sync {
    /// Create an empty ledger for `scope` if none exists.
    ///
    /// Returns `true` when a ledger was created.
    fn initialize(&self, scope: &Scope) -> LedgerResult<bool>;

    /// Read the counts currently stored for `scope`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Missing`] when the scope has no ledger.
    fn load(&self, scope: &Scope) -> LedgerResult<StageCounts>;

    /// Back up the stored counts, then replace them with `counts`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Missing`] when the scope has no ledger.
    fn store(&self, scope: &Scope, counts: &StageCounts) -> LedgerResult<()>;

    /// Names of the backups taken for `scope`, oldest first.
    fn backups(&self, scope: &Scope) -> LedgerResult<Vec<String>>;
}

impl<T: LedgerBackend + ?Sized> LedgerBackend for Arc<T> {
    fn initialize(&self, scope: &Scope) -> LedgerResult<bool> {
        (**self).initialize(scope)
    }

    fn load(&self, scope: &Scope) -> LedgerResult<StageCounts> {
        (**self).load(scope)
    }

    fn store(&self, scope: &Scope, counts: &StageCounts) -> LedgerResult<()> {
        (**self).store(scope, counts)
    }

    fn backups(&self, scope: &Scope) -> LedgerResult<Vec<String>> {
        (**self).backups(scope)
    }
}

const LEDGER_STEM: &str = "ALL_STAGES";

/// Flat-file ledger at `<corpus>/<language>/ALL_STAGES.txt`.
///
/// Every store copies the current file to
/// `ALL_STAGES.<YYYYmmdd-HHMMSS>[-N].txt` before overwriting it. Backups are
/// never pruned. The overwrite itself is a plain write, so an interrupted
/// process can leave a truncated ledger; the latest backup is the recovery
/// point.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLedgerBackend;

impl FileLedgerBackend {
    pub fn new() -> Self {
        Self
    }

    /// Location of the ledger file for `scope`
    pub fn ledger_path(scope: &Scope) -> PathBuf {
        scope.dir().join(format!("{LEDGER_STEM}.txt"))
    }

    fn missing(scope: &Scope) -> LedgerError {
        LedgerError::Missing {
            scope: scope.to_string(),
            location: Self::ledger_path(scope).display().to_string(),
        }
    }

    /// First unused backup path for the current second
    fn next_backup_path(scope: &Scope) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
        let dir = scope.dir();
        let mut candidate = dir.join(format!("{LEDGER_STEM}.{stamp}.txt"));
        let mut n = 1;
        while candidate.exists() {
            candidate = dir.join(format!("{LEDGER_STEM}.{stamp}-{n}.txt"));
            n += 1;
        }
        candidate
    }

    /// `(timestamp, counter)` of a backup file name, `None` for other files
    fn backup_key(name: &str) -> Option<(String, u32)> {
        let stem = name
            .strip_prefix(&format!("{LEDGER_STEM}."))?
            .strip_suffix(".txt")?;
        let stamp = stem.get(..15)?;
        let well_formed = stamp.bytes().enumerate().all(|(i, b)| match i {
            8 => b == b'-',
            _ => b.is_ascii_digit(),
        });
        if !well_formed {
            return None;
        }
        let rest = &stem[15..];
        let n = match rest {
            "" => 0,
            _ => rest.strip_prefix('-')?.parse().ok()?,
        };
        Some((stamp.to_string(), n))
    }
}

impl LedgerBackend for FileLedgerBackend {
    fn initialize(&self, scope: &Scope) -> LedgerResult<bool> {
        let path = Self::ledger_path(scope);
        if path.exists() {
            return Ok(false);
        }
        let dir = scope.dir();
        fs::create_dir_all(&dir).map_err(|e| LedgerError::io(&dir, e))?;
        fs::write(&path, "").map_err(|e| LedgerError::io(&path, e))?;
        debug!(path = %path.display(), "Created empty stage ledger");
        Ok(true)
    }

    fn load(&self, scope: &Scope) -> LedgerResult<StageCounts> {
        let path = Self::ledger_path(scope);
        let text = fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Self::missing(scope),
            _ => LedgerError::io(&path, e),
        })?;
        StageCounts::parse(&text).map_err(|(line, content)| LedgerError::Malformed {
            path,
            line,
            content,
        })
    }

    fn store(&self, scope: &Scope, counts: &StageCounts) -> LedgerResult<()> {
        let path = Self::ledger_path(scope);
        if !path.exists() {
            return Err(Self::missing(scope));
        }
        let backup = Self::next_backup_path(scope);
        fs::copy(&path, &backup).map_err(|e| LedgerError::io(&backup, e))?;
        fs::write(&path, counts.to_ledger_string()).map_err(|e| LedgerError::io(&path, e))?;
        debug!(
            path = %path.display(),
            backup = %backup.display(),
            stages = counts.len(),
            "Wrote stage ledger"
        );
        Ok(())
    }

    fn backups(&self, scope: &Scope) -> LedgerResult<Vec<String>> {
        let dir = scope.dir();
        let entries = fs::read_dir(&dir).map_err(|e| LedgerError::io(&dir, e))?;
        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LedgerError::io(&dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(key) = Self::backup_key(&name) {
                backups.push((key, name));
            }
        }
        backups.sort();
        Ok(backups.into_iter().map(|(_, name)| name).collect())
    }
}

#[derive(Debug, Default)]
struct MemoryLedger {
    current: StageCounts,
    backups: Vec<StageCounts>,
}

/// In-memory ledger keyed by scope; each store keeps a snapshot as backup.
#[derive(Debug, Default)]
pub struct MemoryLedgerBackend {
    ledgers: Mutex<HashMap<Scope, MemoryLedger>>,
}

impl MemoryLedgerBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots taken before each store, oldest first
    pub fn snapshots(&self, scope: &Scope) -> LedgerResult<Vec<StageCounts>> {
        let ledgers = self.ledgers.lock().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(ledgers
            .get(scope)
            .map(|l| l.backups.clone())
            .unwrap_or_default())
    }

    fn missing(scope: &Scope) -> LedgerError {
        LedgerError::Missing {
            scope: scope.to_string(),
            location: "memory".to_string(),
        }
    }
}

impl LedgerBackend for MemoryLedgerBackend {
    fn initialize(&self, scope: &Scope) -> LedgerResult<bool> {
        let mut ledgers = self.ledgers.lock().map_err(|_| LedgerError::LockPoisoned)?;
        if ledgers.contains_key(scope) {
            return Ok(false);
        }
        ledgers.insert(scope.clone(), MemoryLedger::default());
        Ok(true)
    }

    fn load(&self, scope: &Scope) -> LedgerResult<StageCounts> {
        let ledgers = self.ledgers.lock().map_err(|_| LedgerError::LockPoisoned)?;
        ledgers
            .get(scope)
            .map(|l| l.current.clone())
            .ok_or_else(|| Self::missing(scope))
    }

    fn store(&self, scope: &Scope, counts: &StageCounts) -> LedgerResult<()> {
        let mut ledgers = self.ledgers.lock().map_err(|_| LedgerError::LockPoisoned)?;
        let ledger = ledgers.get_mut(scope).ok_or_else(|| Self::missing(scope))?;
        let previous = std::mem::replace(&mut ledger.current, counts.clone());
        ledger.backups.push(previous);
        Ok(())
    }

    fn backups(&self, scope: &Scope) -> LedgerResult<Vec<String>> {
        let count = self.snapshots(scope)?.len();
        Ok((1..=count).map(|n| format!("snapshot-{n}")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_object_safe() {
        fn _assert_object_safe(_: &dyn LedgerBackend) {}
    }

    #[test]
    fn backup_key_orders_counter_after_base() {
        let base = FileLedgerBackend::backup_key("ALL_STAGES.20240102-030405.txt").unwrap();
        let second = FileLedgerBackend::backup_key("ALL_STAGES.20240102-030405-1.txt").unwrap();
        assert!(base < second);
        assert_eq!(second.1, 1);
    }

    #[test]
    fn backup_key_ignores_other_files() {
        assert!(FileLedgerBackend::backup_key("ALL_STAGES.txt").is_none());
        assert!(FileLedgerBackend::backup_key("ALL_FILES.txt").is_none());
        assert!(FileLedgerBackend::backup_key("ALL_STAGES.20240102-030405-x.txt").is_none());
        assert!(FileLedgerBackend::backup_key("ALL_STAGES.old.txt").is_none());
    }

    #[test]
    fn memory_backend_requires_initialize() {
        let backend = MemoryLedgerBackend::new();
        let scope = Scope::new("/c", "en");
        assert!(matches!(
            backend.load(&scope),
            Err(LedgerError::Missing { .. })
        ));
        assert!(backend.initialize(&scope).unwrap());
        assert!(!backend.initialize(&scope).unwrap());
        assert!(backend.load(&scope).unwrap().is_empty());
    }

    #[test]
    fn memory_backend_snapshots_previous_counts() {
        let backend = MemoryLedgerBackend::new();
        let scope = Scope::new("/c", "en");
        backend.initialize(&scope).unwrap();

        let counts: StageCounts = [("a", 1)].into_iter().collect();
        backend.store(&scope, &counts).unwrap();
        backend.store(&scope, &StageCounts::new()).unwrap();

        let snapshots = backend.snapshots(&scope).unwrap();
        assert_eq!(snapshots, vec![StageCounts::new(), counts]);
        assert_eq!(backend.backups(&scope).unwrap().len(), 2);
    }
}
