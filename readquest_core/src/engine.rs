//! The progression ledger: one achievement check, start to finish.
//!
//! `check_and_award` is the only entry point that turns a stats
//! snapshot into persisted unlocks and XP. Matching and level math
//! are pure; the store's commit supplies the at-most-once guarantee.
//! If two checks race, the store accepts each unlock exactly once and
//! the losing call reports neither the unlock nor its XP.

use crate::catalog::Catalog;
use crate::progression::level_for_xp;
use crate::store::{PendingUnlock, ProgressionStore};
use crate::types::{ProgressionOutcome, StatsSnapshot};
use crate::{matcher, Result};
use chrono::Utc;
use std::collections::HashSet;

/// Evaluate the catalog against a snapshot and persist what unlocked
///
/// The whole call either commits (unlock events plus the XP bump) or
/// fails with no state change; callers may retry freely.
pub fn check_and_award(
    store: &dyn ProgressionStore,
    catalog: &Catalog,
    user_id: &str,
    stats: &StatsSnapshot,
) -> Result<ProgressionOutcome> {
    let state = store.load(user_id)?;
    let already_unlocked = state.unlocked_codes();

    let matched = matcher::newly_unlocked(catalog, stats, &already_unlocked);

    if matched.is_empty() {
        let level = level_for_xp(state.current_xp);
        return Ok(ProgressionOutcome {
            newly_unlocked: Vec::new(),
            total_xp_awarded: 0,
            previous_xp: state.current_xp,
            new_xp: state.current_xp,
            previous_level: level,
            new_level: level,
            leveled_up: false,
        });
    }

    let now = Utc::now();
    let pending: Vec<PendingUnlock> = matched
        .iter()
        .map(|def| PendingUnlock {
            code: def.code.clone(),
            xp_reward: def.xp_reward,
            unlocked_at: now,
        })
        .collect();

    let receipt = store.commit(user_id, &pending)?;

    // A concurrent check may have won some of these unlocks between our
    // read and the commit; only what the store accepted counts here.
    let accepted: HashSet<&str> = receipt.accepted.iter().map(String::as_str).collect();
    let newly_unlocked: Vec<_> = matched
        .into_iter()
        .filter(|def| accepted.contains(def.code.as_str()))
        .map(|def| (def.clone(), now))
        .collect();
    let total_xp_awarded: u32 = newly_unlocked.iter().map(|(def, _)| def.xp_reward).sum();

    let previous_level = level_for_xp(receipt.previous_xp);
    let new_level = level_for_xp(receipt.new_xp);

    if !newly_unlocked.is_empty() {
        tracing::info!(
            "User {} unlocked {} achievements (+{} XP, level {} -> {})",
            user_id,
            newly_unlocked.len(),
            total_xp_awarded,
            previous_level,
            new_level
        );
    }

    Ok(ProgressionOutcome {
        newly_unlocked,
        total_xp_awarded,
        previous_xp: receipt.previous_xp,
        new_xp: receipt.new_xp,
        previous_level,
        new_level,
        leveled_up: new_level > previous_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::store::FileStore;
    use crate::types::StatKey;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn snapshot(entries: &[(StatKey, f64)]) -> StatsSnapshot {
        StatsSnapshot {
            totals: entries.iter().copied().collect::<HashMap<_, _>>(),
            windowed: vec![],
        }
    }

    #[test]
    fn test_no_matches_changes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        let catalog = build_default_catalog();

        let outcome =
            check_and_award(&store, &catalog, "reader-1", &StatsSnapshot::default()).unwrap();

        assert!(outcome.newly_unlocked.is_empty());
        assert_eq!(outcome.total_xp_awarded, 0);
        assert_eq!(outcome.previous_xp, 0);
        assert_eq!(outcome.new_xp, 0);
        assert!(!outcome.leveled_up);
        assert!(!store.state_path("reader-1").exists());
    }

    #[test]
    fn test_simultaneous_unlocks_sum_xp_and_level_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        let catalog = build_default_catalog();

        // first_book (100 XP) and marathon_listener (500 XP) together
        let stats = snapshot(&[
            (StatKey::BooksCompleted, 1.0),
            (StatKey::MinutesListened, 600.0),
        ]);
        let outcome = check_and_award(&store, &catalog, "reader-1", &stats).unwrap();

        let codes: Vec<&str> = outcome
            .newly_unlocked
            .iter()
            .map(|(d, _)| d.code.as_str())
            .collect();
        assert_eq!(codes, vec!["first_book", "marathon_listener"]);
        assert_eq!(outcome.total_xp_awarded, 600);
        assert_eq!(outcome.previous_xp, 0);
        assert_eq!(outcome.new_xp, 600);
        assert_eq!(outcome.previous_level, 1);
        assert_eq!(outcome.new_level, 4);
        assert!(outcome.leveled_up);
    }

    #[test]
    fn test_second_identical_check_awards_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        let catalog = build_default_catalog();

        let stats = snapshot(&[(StatKey::BooksCompleted, 1.0)]);
        let first = check_and_award(&store, &catalog, "reader-1", &stats).unwrap();
        assert_eq!(first.newly_unlocked.len(), 1);
        assert_eq!(first.total_xp_awarded, 100);

        let second = check_and_award(&store, &catalog, "reader-1", &stats).unwrap();
        assert!(second.newly_unlocked.is_empty());
        assert_eq!(second.total_xp_awarded, 0);
        assert_eq!(second.previous_xp, 100);
        assert_eq!(second.new_xp, 100);
        assert!(!second.leveled_up);
    }

    #[test]
    fn test_inactive_achievement_never_awarded() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        let catalog = build_default_catalog();

        // launch_reader shares first_book's criterion but is retired
        let stats = snapshot(&[(StatKey::BooksCompleted, 1.0)]);
        let outcome = check_and_award(&store, &catalog, "reader-1", &stats).unwrap();

        assert!(outcome
            .newly_unlocked
            .iter()
            .all(|(d, _)| d.code != "launch_reader"));
    }

    #[test]
    fn test_growing_stats_award_incrementally() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        let catalog = build_default_catalog();

        let outcome = check_and_award(
            &store,
            &catalog,
            "reader-1",
            &snapshot(&[(StatKey::BooksCompleted, 1.0)]),
        )
        .unwrap();
        assert_eq!(outcome.new_xp, 100);

        // More books later: only the new tier pays out
        let outcome = check_and_award(
            &store,
            &catalog,
            "reader-1",
            &snapshot(&[(StatKey::BooksCompleted, 10.0)]),
        )
        .unwrap();
        let codes: Vec<&str> = outcome
            .newly_unlocked
            .iter()
            .map(|(d, _)| d.code.as_str())
            .collect();
        assert_eq!(codes, vec!["bookworm"]);
        assert_eq!(outcome.previous_xp, 100);
        assert_eq!(outcome.new_xp, 600);
    }

    #[test]
    fn test_racing_checks_award_at_most_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(temp_dir.path()));
        let catalog = Arc::new(build_default_catalog());

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let store = Arc::clone(&store);
                let catalog = Arc::clone(&catalog);
                std::thread::spawn(move || {
                    let stats = snapshot(&[(StatKey::BooksCompleted, 1.0)]);
                    check_and_award(store.as_ref(), &catalog, "reader-1", &stats).unwrap()
                })
            })
            .collect();

        let outcomes: Vec<ProgressionOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Exactly one call reports the unlock and its XP
        let winners: Vec<_> = outcomes
            .iter()
            .filter(|o| !o.newly_unlocked.is_empty())
            .collect();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].total_xp_awarded, 100);
        assert!(outcomes
            .iter()
            .filter(|o| o.newly_unlocked.is_empty())
            .all(|o| o.total_xp_awarded == 0));

        // Final state holds the XP once
        let state = store.load("reader-1").unwrap();
        assert_eq!(state.current_xp, 100);
    }
}
