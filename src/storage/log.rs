/// Append-only persistence of readings and auth events.
use log::info;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::models::LogRecord;

/// Durable JSON Lines log. One serialized record per line, synced per
/// write so a process restart loses at most the in-flight record.
pub struct PersistenceLog {
    file: File,
    path: String,
}

impl PersistenceLog {
    /// Open (or create) the log for appending. Failure here is fatal:
    /// monitoring without any durable record is not allowed to start.
    pub async fn open(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| format!("Cannot open data log '{}': {}", path, e))?;

        info!("Persistence log opened at {}", path);
        Ok(PersistenceLog {
            file,
            path: path.to_string(),
        })
    }

    /// Append one record. Errors are reported to the caller, which keeps
    /// monitoring alive and records the degraded-logging condition.
    pub async fn append(&mut self, record: &LogRecord) -> Result<(), String> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| format!("Serialization error: {}", e))?;
        line.push('\n');

        self.file
            .write_all(line.as_bytes())
            .await
            .map_err(|e| format!("Write error on '{}': {}", self.path, e))?;
        self.file
            .sync_data()
            .await
            .map_err(|e| format!("Sync error on '{}': {}", self.path, e))
    }

    /// Final flush before shutdown.
    pub async fn sync(&mut self) -> Result<(), String> {
        self.file
            .sync_all()
            .await
            .map_err(|e| format!("Sync error on '{}': {}", self.path, e))
    }
}
