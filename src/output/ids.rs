//! Run and batch identifier generation

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Source of unique identifiers for run directories and batch files
pub trait IdGenerator: Debug + Send + Sync {
    /// Returns a fresh identifier, never repeated by this generator
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-0000`, `<prefix>-0001`, ... identifiers
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicUsize,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicUsize::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}-{:04}", self.prefix, n)
    }
}
