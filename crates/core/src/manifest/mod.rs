//! File manifests and windowed batch reads
//!
//! A manifest lists the corpus files in a fixed order, one per line:
//!
//! ```text
//! 1999<TAB>/source/1999/US5855000.xml<TAB>1999/US5855000.xml
//! 1999<TAB>/source/1999/US5855001.xml
//! test/US5855002.xml
//! ```
//!
//! Stages consume the manifest front to back in windows; the ledger stores
//! how many lines each stage has consumed, and that count is the offset of
//! the stage's next window.

mod entry;
mod error;
pub mod paths;
mod store;

pub use entry::ManifestEntry;
pub use error::{ManifestError, ManifestResult};
pub use store::ManifestStore;
