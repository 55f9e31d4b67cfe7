//! Read, write and update stage counts through a backend.

use tracing::{debug, info};

use super::backend::{FileLedgerBackend, LedgerBackend};
use super::counts::{Scope, StageCounts, check_stage_name};
use super::error::LedgerResult;

/// Stage-count ledger over an injected storage backend.
///
/// There is no locking across processes. [`update`](Self::update) re-reads
/// the stored counts immediately before writing, which narrows the window in
/// which two processes finishing together can lose one increment. A lost
/// increment only makes a count too low (a batch is processed again); counts
/// are never raised beyond what was actually added.
#[derive(Debug, Clone, Default)]
pub struct StageLedger<B: LedgerBackend = FileLedgerBackend> {
    backend: B,
}

impl StageLedger<FileLedgerBackend> {
    /// Ledger backed by `ALL_STAGES.txt` files
    pub fn file() -> Self {
        Self::new(FileLedgerBackend::new())
    }
}

impl<B: LedgerBackend> StageLedger<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Create an empty ledger for `scope` if none exists
    pub fn init(&self, scope: &Scope) -> LedgerResult<bool> {
        let created = self.backend.initialize(scope)?;
        if created {
            info!(%scope, "Initialized stage ledger");
        }
        Ok(created)
    }

    /// All counts for `scope`
    pub fn read(&self, scope: &Scope) -> LedgerResult<StageCounts> {
        self.backend.load(scope)
    }

    /// Count for one stage, 0 when the stage has not run yet
    pub fn count(&self, scope: &Scope, stage: &str) -> LedgerResult<u64> {
        Ok(self.read(scope)?.get(stage))
    }

    /// Back up the stored ledger and replace it with `counts`
    ///
    /// Every stage name is checked first; nothing is written if one is
    /// invalid.
    pub fn write(&self, scope: &Scope, counts: &StageCounts) -> LedgerResult<()> {
        for (stage, _) in counts.iter() {
            check_stage_name(stage)?;
        }
        self.backend.store(scope, counts)
    }

    /// Add `delta` to `stage`, merging with whatever is stored right now
    ///
    /// Returns the stage's new count.
    pub fn update(&self, scope: &Scope, stage: &str, delta: u64) -> LedgerResult<u64> {
        check_stage_name(stage)?;
        let mut counts = self.read(scope)?;
        let before = counts.get(stage);
        let after = counts.advance(stage, delta);
        self.write(scope, &counts)?;
        debug!(%scope, stage, before, after, "Advanced stage count");
        Ok(after)
    }

    /// Raise `stage` to at least `high_water`, merging with what is stored
    ///
    /// A count that is already at or above `high_water` is left alone and
    /// nothing is written. Returns the stage's resulting count.
    pub fn advance_to(&self, scope: &Scope, stage: &str, high_water: u64) -> LedgerResult<u64> {
        check_stage_name(stage)?;
        let mut counts = self.read(scope)?;
        let before = counts.get(stage);
        if before >= high_water {
            debug!(%scope, stage, before, high_water, "Stage count already past high-water mark");
            return Ok(before);
        }
        counts.set(stage, high_water);
        self.write(scope, &counts)?;
        debug!(%scope, stage, before, after = high_water, "Raised stage count");
        Ok(high_water)
    }

    /// Backups taken so far, oldest first
    pub fn backups(&self, scope: &Scope) -> LedgerResult<Vec<String>> {
        self.backend.backups(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LedgerError, MemoryLedgerBackend};
    use std::sync::Arc;

    fn scope() -> Scope {
        Scope::new("/corpus", "en")
    }

    #[test]
    fn update_defaults_absent_stage_to_zero() {
        let ledger = StageLedger::new(MemoryLedgerBackend::new());
        ledger.init(&scope()).unwrap();

        assert_eq!(ledger.update(&scope(), "xml2txt", 5).unwrap(), 5);
        assert_eq!(ledger.count(&scope(), "xml2txt").unwrap(), 5);
        assert_eq!(ledger.count(&scope(), "other").unwrap(), 0);
    }

    #[test]
    fn update_merges_concurrent_writer() {
        let backend = Arc::new(MemoryLedgerBackend::new());
        let first = StageLedger::new(Arc::clone(&backend));
        let second = StageLedger::new(Arc::clone(&backend));
        first.init(&scope()).unwrap();

        // First process reads, second process advances another stage in between.
        let stale = first.read(&scope()).unwrap();
        second.update(&scope(), "txt2tag", 7).unwrap();
        first.update(&scope(), "xml2txt", 3).unwrap();

        let counts = first.read(&scope()).unwrap();
        assert!(stale.is_empty());
        assert_eq!(counts.get("txt2tag"), 7);
        assert_eq!(counts.get("xml2txt"), 3);
    }

    #[test]
    fn update_without_ledger_fails() {
        let ledger = StageLedger::new(MemoryLedgerBackend::new());
        assert!(matches!(
            ledger.update(&scope(), "a", 1),
            Err(LedgerError::Missing { .. })
        ));
    }

    #[test]
    fn advance_to_never_lowers_a_count() {
        let ledger = StageLedger::new(MemoryLedgerBackend::new());
        ledger.init(&scope()).unwrap();
        ledger.update(&scope(), "a", 5).unwrap();

        assert_eq!(ledger.advance_to(&scope(), "a", 3).unwrap(), 5);
        assert_eq!(ledger.backups(&scope()).unwrap().len(), 1);
        assert_eq!(ledger.advance_to(&scope(), "a", 8).unwrap(), 8);
        assert_eq!(ledger.count(&scope(), "a").unwrap(), 8);
    }

    #[test]
    fn invalid_stage_names_are_never_written() {
        let ledger = StageLedger::new(MemoryLedgerBackend::new());
        ledger.init(&scope()).unwrap();

        assert!(matches!(
            ledger.update(&scope(), "", 3),
            Err(LedgerError::InvalidStage { .. })
        ));
        let padded: StageCounts = [(" padded", 1)].into_iter().collect();
        assert!(matches!(
            ledger.write(&scope(), &padded),
            Err(LedgerError::InvalidStage { .. })
        ));
        assert!(matches!(
            ledger.advance_to(&scope(), "a\tb", 1),
            Err(LedgerError::InvalidStage { .. })
        ));
        assert!(ledger.read(&scope()).unwrap().is_empty());
        assert!(ledger.backups(&scope()).unwrap().is_empty());
    }

    #[test]
    fn each_write_takes_one_backup() {
        let ledger = StageLedger::new(MemoryLedgerBackend::new());
        ledger.init(&scope()).unwrap();
        ledger.update(&scope(), "a", 1).unwrap();
        ledger.update(&scope(), "a", 1).unwrap();
        ledger.write(&scope(), &StageCounts::new()).unwrap();
        assert_eq!(ledger.backups(&scope()).unwrap().len(), 3);
    }
}
