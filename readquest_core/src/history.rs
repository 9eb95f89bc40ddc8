//! Unlock history loading.
//!
//! Recent unlock events live in the JSONL log until a rollup moves
//! them to the CSV archive; a window query has to read both and
//! deduplicate events that appear in each.

use crate::{Result, UnlockEvent};
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::path::Path;

/// Load unlock events from the last N days from both log and CSV
///
/// Returns events sorted by unlock time (newest first), deduplicated
/// by event id across the two sources.
pub fn load_recent_unlocks(
    log_path: &Path,
    csv_path: &Path,
    days: i64,
) -> Result<Vec<UnlockEvent>> {
    let cutoff = Utc::now() - Duration::days(days);
    let mut events = Vec::new();
    let mut seen_ids = HashSet::new();

    // Load from the live log first (most recent)
    if log_path.exists() {
        for event in crate::unlock_log::read_events(log_path)? {
            if event.unlocked_at >= cutoff {
                seen_ids.insert(event.id);
                events.push(event);
            }
        }
        tracing::debug!("Loaded {} unlock events from log", events.len());
    }

    // Load from the CSV archive
    if csv_path.exists() {
        let mut csv_count = 0;
        for event in load_events_from_csv(csv_path)? {
            if event.unlocked_at >= cutoff && !seen_ids.contains(&event.id) {
                seen_ids.insert(event.id);
                events.push(event);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} unlock events from CSV", csv_count);
    }

    // Sort by unlock time, newest first
    events.sort_by(|a, b| b.unlocked_at.cmp(&a.unlocked_at));

    tracing::info!(
        "Loaded {} unlock events from last {} days",
        events.len(),
        days
    );

    Ok(events)
}

/// Load all unlock events from a CSV archive
fn load_events_from_csv(path: &Path) -> Result<Vec<UnlockEvent>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut events = Vec::new();
    for result in reader.deserialize::<crate::csv_rollup::CsvRow>() {
        match result {
            Ok(row) => match UnlockEvent::try_from(row) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(events)
}
