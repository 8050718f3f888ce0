//! In-memory batch sink
//!
//! Keeps every batch in a vector instead of writing files, for callers that
//! consume the crawl in-process and for tests that assert on batch content.

use crate::output::traits::{BatchSink, OutputBatch, OutputResult};
use std::path::PathBuf;
use std::sync::Mutex;

/// Collects batches in memory, in completion order
#[derive(Debug, Default)]
pub struct MemorySink {
    run_id: String,
    batches: Mutex<Vec<OutputBatch>>,
}

impl MemorySink {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Returns a copy of every batch written so far
    pub fn batches(&self) -> Vec<OutputBatch> {
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl BatchSink for MemorySink {
    fn run_id(&self) -> &str {
        &self.run_id
    }

    fn write(&self, batch: &OutputBatch) -> OutputResult<PathBuf> {
        let mut batches = self
            .batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        batches.push(batch.clone());
        Ok(PathBuf::from(format!("memory://{}/{}", self.run_id, batches.len())))
    }
}
