//! Achievement matching against a stats snapshot.
//!
//! Walks the catalog in sort order and reports which achievements have
//! just become satisfied. Matching is pure; the caller decides what to
//! do with the result.

use crate::catalog::Catalog;
use crate::criteria;
use crate::types::{AchievementDefinition, StatsSnapshot};
use std::collections::BTreeSet;

/// Find achievements that are newly satisfied by the given snapshot
///
/// Inactive definitions and codes in `already_unlocked` are skipped.
/// An achievement matches only when every one of its criteria holds
/// (evaluation short-circuits on the first failure). Results come back
/// in catalog order.
pub fn newly_unlocked<'a>(
    catalog: &'a Catalog,
    stats: &StatsSnapshot,
    already_unlocked: &BTreeSet<String>,
) -> Vec<&'a AchievementDefinition> {
    let mut matched = Vec::new();

    for def in catalog.achievements() {
        if !def.is_active {
            continue;
        }
        if already_unlocked.contains(&def.code) {
            continue;
        }

        if def.criteria.iter().all(|c| criteria::evaluate(c, stats)) {
            tracing::debug!("Achievement '{}' satisfied", def.code);
            matched.push(def);
        }
    }

    matched
}
