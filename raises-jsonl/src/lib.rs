//! JSONL sink for `raises`. Writes one chain event per line.
//! Appends to the file at the given path, creating it if needed.

use raises::telemetry::{ChainEvent, EventSink};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event, surfacing I/O failures to the caller.
    pub fn write_event(&self, event: &ChainEvent) -> io::Result<()> {
        let mut line = serde_json::to_string(&event.to_json())?;
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

impl EventSink for JsonlSink {
    fn emit(&self, event: ChainEvent) {
        if let Err(error) = self.write_event(&event) {
            tracing::warn!(
                target: "raises::jsonl",
                path = %self.path.display(),
                error = %error,
                event = %event,
                "dropping chain event"
            );
        }
    }
}
