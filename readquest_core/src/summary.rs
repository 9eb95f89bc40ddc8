//! Per-category achievement tallies.
//!
//! Categories come back in the order they are first seen in the
//! input. HashMap iteration order is not trusted for this; an
//! explicit ordered key list sits beside the lookup map.

use crate::response::AchievementWithStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unlock progress for one category
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySummary {
    pub name: String,
    pub total: usize,
    pub unlocked: usize,
}

/// Tally achievements per category, preserving first-seen order
pub fn summarize(achievements: &[AchievementWithStatus]) -> Vec<CategorySummary> {
    let mut order: Vec<String> = Vec::new();
    let mut tallies: HashMap<String, (usize, usize)> = HashMap::new();

    for achievement in achievements {
        let name = achievement.category.as_str().to_string();
        let entry = tallies.entry(name.clone()).or_insert_with(|| {
            order.push(name);
            (0, 0)
        });
        entry.0 += 1;
        if achievement.is_unlocked {
            entry.1 += 1;
        }
    }

    order
        .into_iter()
        .map(|name| {
            let (total, unlocked) = tallies[&name];
            CategorySummary {
                name,
                total,
                unlocked,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::to_wire;
    use crate::types::{
        AchievementCategory, AchievementDefinition, AchievementTier, ComparisonOp, Criterion,
        StatKey,
    };
    use chrono::Utc;

    fn with_status(
        code: &str,
        category: AchievementCategory,
        is_unlocked: bool,
    ) -> AchievementWithStatus {
        let def = AchievementDefinition {
            code: code.into(),
            name: code.into(),
            description: String::new(),
            category,
            tier: AchievementTier::Common,
            xp_reward: 100,
            badge_icon: "badge".into(),
            badge_color: "#ffffff".into(),
            sort_order: 0,
            criteria: vec![Criterion::Stat {
                stat: StatKey::BooksCompleted,
                op: ComparisonOp::Gte,
                value: 1.0,
            }],
            is_active: true,
        };
        let at = is_unlocked.then(Utc::now);
        to_wire(&def, is_unlocked, at)
    }

    #[test]
    fn test_tallies_per_category_in_first_seen_order() {
        let input = vec![
            with_status("r1", AchievementCategory::Reading, true),
            with_status("r2", AchievementCategory::Reading, true),
            with_status("s1", AchievementCategory::Streak, false),
            with_status("r3", AchievementCategory::Reading, false),
            with_status("s2", AchievementCategory::Streak, true),
        ];

        let summaries = summarize(&input);
        assert_eq!(
            summaries,
            vec![
                CategorySummary {
                    name: "READING".into(),
                    total: 3,
                    unlocked: 2,
                },
                CategorySummary {
                    name: "STREAK".into(),
                    total: 2,
                    unlocked: 1,
                },
            ]
        );
    }

    #[test]
    fn test_first_seen_order_not_alphabetical() {
        let input = vec![
            with_status("s1", AchievementCategory::Streak, false),
            with_status("f1", AchievementCategory::Flashcards, false),
        ];

        let summaries = summarize(&input);
        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["STREAK", "FLASHCARDS"]);
    }

    #[test]
    fn test_empty_input_yields_no_categories() {
        assert!(summarize(&[]).is_empty());
    }
}
