//! Append-only unlock event log.
//!
//! Unlock events are appended to a JSONL (JSON Lines) file with file
//! locking to ensure safe concurrent access. The log is the audit
//! trail of unlocks; the authoritative idempotency check lives in the
//! store's state file.

use crate::{Result, UnlockEvent};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Append unlock events to the JSONL log
pub fn append_events(path: &Path, events: &[UnlockEvent]) -> Result<()> {
    if events.is_empty() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Open file for appending
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // Acquire exclusive lock
    file.lock_exclusive()?;

    // Write each event as a JSON line
    let mut writer = std::io::BufWriter::new(&file);
    for event in events {
        let line = serde_json::to_string(event)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    file.unlock()?;

    tracing::debug!("Appended {} unlock events to log", events.len());
    Ok(())
}

/// Read all unlock events from a log file
///
/// Unparseable lines are skipped with a warning rather than failing
/// the whole read.
pub fn read_events(path: &Path) -> Result<Vec<UnlockEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut events = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<UnlockEvent>(&line) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!("Failed to parse unlock event at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} unlock events from log", events.len());
    Ok(events)
}
