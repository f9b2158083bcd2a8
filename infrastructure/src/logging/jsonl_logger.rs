//! JSONL round log
//!
//! One JSON object per line, one line per [`RoundEvent`]. Every record
//! carries `type` and `timestamp` next to the event's own payload fields.
//! The file is opened in append mode, so the transcript grows across
//! process restarts instead of starting over.

use chrono::SecondsFormat;
use roundtable_application::ports::round_logger::{RoundEvent, RoundLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

pub struct JsonlRoundLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlRoundLogger {
    /// Open the round log for appending, creating the file and its parent
    /// directories as needed. `None` means the log location is unusable;
    /// the caller decides whether to run without a transcript.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match Self::open_append(path) {
            Ok(file) => Some(Self {
                writer: Mutex::new(BufWriter::new(file)),
                path: path.to_path_buf(),
            }),
            Err(e) => {
                warn!(
                    "Round log at {} is unavailable, events will not be recorded: {e}",
                    path.display()
                );
                None
            }
        }
    }

    fn open_append(path: &Path) -> std::io::Result<File> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wrap the payload into the record shape: the payload's own fields
    /// when it is an object, a single `data` field otherwise, plus the
    /// `type` and `timestamp` envelope.
    fn record(event: RoundEvent) -> Map<String, Value> {
        let mut fields = match event.payload {
            Value::Object(fields) => fields,
            other => {
                let mut fields = Map::new();
                fields.insert("data".to_string(), other);
                fields
            }
        };
        fields.insert("type".to_string(), Value::from(event.event_type));
        fields.insert(
            "timestamp".to_string(),
            Value::from(chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        fields
    }
}

impl RoundLogger for JsonlRoundLogger {
    fn log(&self, event: RoundEvent) {
        let Ok(line) = serde_json::to_string(&Self::record(event)) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{line}");
            // Flush per event so short-lived CLI runs never lose entries
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlRoundLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
