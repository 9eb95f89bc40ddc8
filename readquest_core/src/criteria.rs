//! Criterion evaluation against a stats snapshot.
//!
//! Evaluation is pure and fail-closed: a missing statistic reads as
//! zero, and a criterion the engine does not recognize is simply
//! false. Malformed input can never grant an achievement and never
//! raises an error.

use crate::types::{ComparisonOp, Criterion, StatKey, StatsSnapshot};

/// Evaluate a single criterion against a stats snapshot
pub fn evaluate(criterion: &Criterion, stats: &StatsSnapshot) -> bool {
    match criterion {
        Criterion::Stat { stat, op, value } => {
            if *stat == StatKey::Unknown {
                tracing::debug!("Skipping criterion on unrecognized statistic");
                return false;
            }
            compare(stats.value(*stat), *op, *value)
        }
        Criterion::WindowedStat {
            stat,
            op,
            value,
            window_days,
        } => {
            if *stat == StatKey::Unknown {
                tracing::debug!("Skipping windowed criterion on unrecognized statistic");
                return false;
            }
            compare(stats.windowed_value(*stat, *window_days), *op, *value)
        }
    }
}

fn compare(actual: f64, op: ComparisonOp, target: f64) -> bool {
    match op {
        ComparisonOp::Gte => actual >= target,
        ComparisonOp::Gt => actual > target,
        ComparisonOp::Lte => actual <= target,
        ComparisonOp::Lt => actual < target,
        ComparisonOp::Eq => actual == target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn snapshot(entries: &[(StatKey, f64)]) -> StatsSnapshot {
        StatsSnapshot {
            totals: entries.iter().copied().collect::<HashMap<_, _>>(),
            windowed: vec![],
        }
    }

    fn criterion(stat: StatKey, op: ComparisonOp, value: f64) -> Criterion {
        Criterion::Stat { stat, op, value }
    }

    #[test]
    fn test_all_operators() {
        let stats = snapshot(&[(StatKey::BooksCompleted, 5.0)]);

        assert!(evaluate(
            &criterion(StatKey::BooksCompleted, ComparisonOp::Gte, 5.0),
            &stats
        ));
        assert!(evaluate(
            &criterion(StatKey::BooksCompleted, ComparisonOp::Gt, 4.0),
            &stats
        ));
        assert!(!evaluate(
            &criterion(StatKey::BooksCompleted, ComparisonOp::Gt, 5.0),
            &stats
        ));
        assert!(evaluate(
            &criterion(StatKey::BooksCompleted, ComparisonOp::Lte, 5.0),
            &stats
        ));
        assert!(evaluate(
            &criterion(StatKey::BooksCompleted, ComparisonOp::Lt, 6.0),
            &stats
        ));
        assert!(evaluate(
            &criterion(StatKey::BooksCompleted, ComparisonOp::Eq, 5.0),
            &stats
        ));
        assert!(!evaluate(
            &criterion(StatKey::BooksCompleted, ComparisonOp::Eq, 4.0),
            &stats
        ));
    }

    #[test]
    fn test_missing_stat_defaults_to_zero() {
        let stats = StatsSnapshot::default();

        // 0 >= 0 holds; 0 >= 1 does not
        assert!(evaluate(
            &criterion(StatKey::CardsReviewed, ComparisonOp::Gte, 0.0),
            &stats
        ));
        assert!(!evaluate(
            &criterion(StatKey::CardsReviewed, ComparisonOp::Gte, 1.0),
            &stats
        ));
    }

    #[test]
    fn test_unknown_stat_fails_closed() {
        let stats = StatsSnapshot::default();

        // Even a trivially-true comparison fails on an unknown key
        assert!(!evaluate(
            &criterion(StatKey::Unknown, ComparisonOp::Gte, 0.0),
            &stats
        ));
        assert!(!evaluate(
            &Criterion::WindowedStat {
                stat: StatKey::Unknown,
                op: ComparisonOp::Gte,
                value: 0.0,
                window_days: 7,
            },
            &stats
        ));
    }

    #[test]
    fn test_windowed_criterion_reads_matching_aggregate() {
        let stats = StatsSnapshot {
            totals: HashMap::new(),
            windowed: vec![crate::types::WindowedStat {
                stat: StatKey::PagesRead,
                window_days: 7,
                value: 350.0,
            }],
        };

        let passes = Criterion::WindowedStat {
            stat: StatKey::PagesRead,
            op: ComparisonOp::Gte,
            value: 300.0,
            window_days: 7,
        };
        assert!(evaluate(&passes, &stats));

        // Same stat, different window: no aggregate, reads as zero
        let other_window = Criterion::WindowedStat {
            stat: StatKey::PagesRead,
            op: ComparisonOp::Gte,
            value: 300.0,
            window_days: 30,
        };
        assert!(!evaluate(&other_window, &stats));
    }
}
