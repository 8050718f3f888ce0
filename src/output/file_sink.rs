//! Filesystem batch sink
//!
//! Batches land at `<drop location>/<run id>/<batch id>.txt`. The run
//! directory is created on the first write, so a run that produces nothing
//! leaves nothing behind.

use crate::output::ids::IdGenerator;
use crate::output::traits::{BatchSink, OutputBatch, OutputError, OutputResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Writes each batch to its own file under a run-scoped directory
#[derive(Debug)]
pub struct FileSink {
    run_id: String,
    run_dir: PathBuf,
    ids: Arc<dyn IdGenerator>,
}

impl FileSink {
    /// Opens a sink for a new run under `drop_location`
    ///
    /// The run id is drawn from `ids`; every batch id afterwards comes from
    /// the same generator.
    pub fn new(drop_location: impl AsRef<Path>, ids: Arc<dyn IdGenerator>) -> Self {
        let run_id = ids.next_id();
        let run_dir = drop_location.as_ref().join(&run_id);

        Self {
            run_id,
            run_dir,
            ids,
        }
    }

    /// Directory that holds this run's batch files
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }
}

impl BatchSink for FileSink {
    fn run_id(&self) -> &str {
        &self.run_id
    }

    fn write(&self, batch: &OutputBatch) -> OutputResult<PathBuf> {
        fs::create_dir_all(&self.run_dir)?;

        let batch_id = self.ids.next_id();
        let path = self.run_dir.join(format!("{}.txt", batch_id));
        let staging = self.run_dir.join(format!(".{}.txt.part", batch_id));

        // Write beside the target and rename so readers never see a partial file
        let persist = fs::write(&staging, batch.render()).and_then(|_| fs::rename(&staging, &path));
        if let Err(source) = persist {
            let _ = fs::remove_file(&staging);
            return Err(OutputError::Write { path, source });
        }

        tracing::debug!(
            "Wrote batch of {} codes from {} to {}",
            batch.len(),
            batch.source_url(),
            path.display()
        );

        Ok(path)
    }
}
