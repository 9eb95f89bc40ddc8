//! CSV rollup for archiving the unlock event log.
//!
//! The JSONL unlock log grows one line per unlock; this module rolls
//! it into a headered CSV archive so the log stays small and the
//! history loader has a stable long-term source to read from.

use crate::{Result, UnlockEvent};
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV archive
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct CsvRow {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) code: String,
    pub(crate) unlocked_at: String,
}

impl From<&UnlockEvent> for CsvRow {
    fn from(event: &UnlockEvent) -> Self {
        CsvRow {
            id: event.id.to_string(),
            user_id: event.user_id.clone(),
            code: event.code.clone(),
            unlocked_at: event.unlocked_at.to_rfc3339(),
        }
    }
}

impl TryFrom<CsvRow> for UnlockEvent {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = uuid::Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;
        let unlocked_at = DateTime::parse_from_rfc3339(&row.unlocked_at)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(UnlockEvent {
            id,
            user_id: row.user_id,
            code: row.code,
            unlocked_at,
        })
    }
}

/// Roll up logged unlock events into CSV and archive the log atomically
///
/// This function:
/// 1. Reads all events from the unlock log
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the log to .processed
/// 5. Returns the number of events processed
///
/// # Safety
/// - CSV is fsynced before the log is renamed
/// - The log is renamed (not deleted) to allow manual recovery
pub fn log_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let events = crate::unlock_log::read_events(log_path)?;

    if events.is_empty() {
        tracing::info!("No unlock events in log to roll up");
        return Ok(0);
    }

    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Open CSV file for appending
    let file = OpenOptions::new().create(true).append(true).open(csv_path)?;

    // Write headers only when the archive is new
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for event in &events {
        writer.serialize(CsvRow::from(event))?;
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} unlock events to CSV", events.len());

    // Atomically archive the log by renaming it
    let processed_path = log_path.with_extension("log.processed");
    std::fs::rename(log_path, &processed_path)?;

    tracing::info!("Archived unlock log to {:?}", processed_path);

    Ok(events.len())
}

/// Clean up old processed log files
///
/// This removes all .log.processed files in the given directory.
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed unlock log: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed unlock logs", count);
    }

    Ok(count)
}
