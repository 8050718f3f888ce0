//! Output sink traits and types
//!
//! This module defines the trait interface for batch sinks and the batch
//! data structure they persist.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write batch {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// The instrument codes extracted from one completed job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBatch {
    source_url: String,
    item_codes: Vec<String>,
}

impl OutputBatch {
    /// Creates a batch for `source_url` holding `item_codes` in order
    pub fn new(source_url: impl Into<String>, item_codes: Vec<String>) -> Self {
        Self {
            source_url: source_url.into(),
            item_codes,
        }
    }

    /// The request URL the codes were extracted from
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// The item codes in document order
    pub fn item_codes(&self) -> &[String] {
        &self.item_codes
    }

    /// Number of item codes in the batch
    pub fn len(&self) -> usize {
        self.item_codes.len()
    }

    /// Returns true if the batch holds no item codes
    pub fn is_empty(&self) -> bool {
        self.item_codes.is_empty()
    }

    /// Serializes the batch: the source URL, then one code per line
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(
            self.source_url.len() + self.item_codes.len() * (crate::crawler::ITEM_CODE_LEN + 1),
        );
        out.push_str(&self.source_url);
        for code in &self.item_codes {
            out.push('\n');
            out.push_str(code);
        }
        out
    }
}

/// Trait for batch sinks
///
/// A sink is scoped to a single crawl run. Implementations must be
/// thread-safe: batches are written from concurrently running jobs, and each
/// individual write must be atomic.
pub trait BatchSink: Send + Sync {
    /// Identifier of the run this sink writes for
    fn run_id(&self) -> &str;

    /// Persists one batch and returns where it was written
    fn write(&self, batch: &OutputBatch) -> OutputResult<PathBuf>;
}
