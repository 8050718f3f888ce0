//! Output module for persisting crawl batches
//!
//! This module handles:
//! - Writing each non-empty batch to its own file under a run directory
//! - Generating run and batch identifiers
//! - Recording run statistics

mod file_sink;
mod ids;
mod memory;
pub mod stats;
mod traits;

pub use file_sink::FileSink;
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use memory::MemorySink;
pub use stats::{print_summary, RunSummary};
pub use traits::{BatchSink, OutputBatch, OutputError, OutputResult};
