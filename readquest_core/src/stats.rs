//! Stats snapshot loading.
//!
//! The reading-stats provider (session tracker, flashcard reviewer,
//! podcast player) writes a JSON snapshot of lifetime totals and any
//! windowed aggregates it maintains. This module only reads that
//! file; window boundary semantics belong to the producer.

use crate::{Result, StatsSnapshot};
use std::path::Path;

/// Load a stats snapshot from a JSON file
///
/// Returns None if the file doesn't exist (no stats recorded yet).
/// A malformed file is logged and treated as absent rather than
/// failing the caller — a broken snapshot should never block an
/// achievement check from reporting "nothing new".
pub fn load_stats_snapshot(path: &Path) -> Result<Option<StatsSnapshot>> {
    if !path.exists() {
        tracing::debug!("No stats snapshot found at {:?}", path);
        return Ok(None);
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(
                "Failed to read stats snapshot at {:?}: {}. Ignoring snapshot.",
                path,
                e
            );
            return Ok(None);
        }
    };

    match serde_json::from_str::<StatsSnapshot>(&contents) {
        Ok(snapshot) => {
            tracing::info!(
                "Loaded stats snapshot from {:?} ({} totals, {} windowed)",
                path,
                snapshot.totals.len(),
                snapshot.windowed.len()
            );
            Ok(Some(snapshot))
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse stats snapshot at {:?}: {}. Ignoring snapshot.",
                path,
                e
            );
            Ok(None)
        }
    }
}
