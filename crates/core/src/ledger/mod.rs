//! Stage ledger: how many manifest entries each stage has consumed
//!
//! The ledger is the resumable cursor of every stage. A run reads its
//! stage's count, processes the manifest window starting there, and then
//! advances the count by the number of entries it processed. Runs may happen
//! on different machines sharing a file system; see [`StageLedger`] for the
//! guarantees that holds without a lock.
//!
//! # Example
//!
//! ```rust,no_run
//! use batchline_core::ledger::{Scope, StageLedger};
//!
//! let ledger = StageLedger::file();
//! let scope = Scope::new("/data/patents/uspto", "en");
//!
//! ledger.init(&scope)?;
//! let offset = ledger.count(&scope, "xml2txt")?;
//! // ... process manifest entries offset..offset + 500 ...
//! ledger.update(&scope, "xml2txt", 500)?;
//! # Ok::<(), batchline_core::ledger::LedgerError>(())
//! ```

mod backend;
mod counts;
mod error;
mod store;

pub use backend::{FileLedgerBackend, LedgerBackend, MemoryLedgerBackend};
pub use counts::{Scope, StageCounts, check_stage_name};
pub use error::{LedgerError, LedgerResult};
pub use store::StageLedger;
