//! JSON-lines brew log sink.
//!
//! One JSON object per line, appended to `brewlog.jsonl` in the data
//! directory. This is the CLI's implementation of the persistence
//! collaborator; the core only ever sees the [`LogSink`] trait.

use std::io::Write;
use std::path::PathBuf;

use brewflow_core::{CoreError, CreateLogRequest, LogSink};

pub struct JsonlLogSink {
    path: PathBuf,
}

impl JsonlLogSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl LogSink for JsonlLogSink {
    fn append(&self, request: &CreateLogRequest) -> Result<(), CoreError> {
        let line = serde_json::to_string(request)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}
