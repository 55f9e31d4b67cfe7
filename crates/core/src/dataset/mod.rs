//! Versioned datasets and provenance-based selection
//!
//! Datasets live at `<root>/<category>/<version_id>`. Each records the
//! pipeline steps that produced it, so a stage can find its input and
//! output locations by comparing that record against the current pipeline:
//!
//! ```no_run
//! use batchline_core::dataset::DatasetRegistry;
//! use batchline_core::pipeline::PipelineConfig;
//!
//! let pipeline = PipelineConfig::parse("xml2txt\ntxt2tag\ntag2chk\n");
//! let registry = DatasetRegistry::new("/corpus/en/data");
//! let input = registry
//!     .select_input("d2_tag", &pipeline, "tag2chk")?
//!     .into_result("d2_tag")?;
//! println!("reading from {}", input.files_dir().display());
//! # Ok::<(), batchline_core::dataset::DatasetError>(())
//! ```

mod error;
mod history;
mod registry;
mod versioned;

pub use error::{DatasetError, DatasetResult};
pub use history::ProcessingHistoryRecord;
pub use registry::{DatasetRegistry, Selection};
pub use versioned::{DEFAULT_OUTPUT_DIR, Dataset};
