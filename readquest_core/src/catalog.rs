//! Default catalog of achievement definitions.
//!
//! This module provides the built-in achievements for the system. The
//! catalog is assembled once at startup and never mutated at runtime;
//! engine components receive it as an explicit dependency so tests can
//! substitute synthetic catalogs.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog of achievements
///
/// **Note**: For production use, prefer `get_default_catalog()` which
/// returns a cached reference. This function is retained for testing
/// and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

/// The immutable catalog of achievement definitions
///
/// Achievements are held in ascending `sort_order`, which fixes the
/// order in which the matcher examines them and therefore the order of
/// unlock events.
#[derive(Clone, Debug)]
pub struct Catalog {
    achievements: Vec<AchievementDefinition>,
}

impl Catalog {
    /// Build a catalog from definitions, sorting by `sort_order`
    pub fn new(mut achievements: Vec<AchievementDefinition>) -> Self {
        achievements.sort_by_key(|a| a.sort_order);
        Self { achievements }
    }

    /// All achievements in ascending sort order
    pub fn achievements(&self) -> &[AchievementDefinition] {
        &self.achievements
    }

    /// Look up a definition by code
    pub fn get(&self, code: &str) -> Option<&AchievementDefinition> {
        self.achievements.iter().find(|a| a.code == code)
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen_codes = HashSet::new();

        for def in &self.achievements {
            if def.code.is_empty() {
                errors.push("Achievement has empty code".to_string());
            }
            if !seen_codes.insert(def.code.as_str()) {
                errors.push(format!("Duplicate achievement code '{}'", def.code));
            }
            if def.name.is_empty() {
                errors.push(format!("Achievement '{}' has empty name", def.code));
            }
            if def.criteria.is_empty() {
                errors.push(format!("Achievement '{}' has no criteria", def.code));
            }

            for criterion in &def.criteria {
                let (stat, value) = match criterion {
                    Criterion::Stat { stat, value, .. } => (stat, value),
                    Criterion::WindowedStat {
                        stat,
                        value,
                        window_days,
                        ..
                    } => {
                        if *window_days == 0 {
                            errors.push(format!(
                                "Achievement '{}' has a zero-day window",
                                def.code
                            ));
                        }
                        (stat, value)
                    }
                };
                if *stat == StatKey::Unknown {
                    errors.push(format!(
                        "Achievement '{}' references an unknown statistic",
                        def.code
                    ));
                }
                if !value.is_finite() {
                    errors.push(format!(
                        "Achievement '{}' has a non-finite target value",
                        def.code
                    ));
                }
            }
        }

        // Check that every category is represented
        for category in [
            AchievementCategory::Reading,
            AchievementCategory::Streak,
            AchievementCategory::Flashcards,
            AchievementCategory::Listening,
            AchievementCategory::Social,
        ] {
            if !self.achievements.iter().any(|a| a.category == category) {
                errors.push(format!("Catalog has no {} achievements", category));
            }
        }

        errors
    }
}

fn stat_gte(stat: StatKey, value: f64) -> Criterion {
    Criterion::Stat {
        stat,
        op: ComparisonOp::Gte,
        value,
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let mut achievements = Vec::new();

    // ========================================================================
    // Reading
    // ========================================================================

    achievements.push(AchievementDefinition {
        code: "first_book".into(),
        name: "First Chapter Closed".into(),
        description: "Finish your first book".into(),
        category: AchievementCategory::Reading,
        tier: AchievementTier::Common,
        xp_reward: 100,
        badge_icon: "book-open".into(),
        badge_color: "#4ade80".into(),
        sort_order: 10,
        criteria: vec![stat_gte(StatKey::BooksCompleted, 1.0)],
        is_active: true,
    });

    achievements.push(AchievementDefinition {
        code: "bookworm".into(),
        name: "Bookworm".into(),
        description: "Finish 10 books".into(),
        category: AchievementCategory::Reading,
        tier: AchievementTier::Uncommon,
        xp_reward: 500,
        badge_icon: "books".into(),
        badge_color: "#22c55e".into(),
        sort_order: 20,
        criteria: vec![stat_gte(StatKey::BooksCompleted, 10.0)],
        is_active: true,
    });

    achievements.push(AchievementDefinition {
        code: "library_legend".into(),
        name: "Library Legend".into(),
        description: "Finish 50 books".into(),
        category: AchievementCategory::Reading,
        tier: AchievementTier::Legendary,
        xp_reward: 5000,
        badge_icon: "crown".into(),
        badge_color: "#f59e0b".into(),
        sort_order: 30,
        criteria: vec![stat_gte(StatKey::BooksCompleted, 50.0)],
        is_active: true,
    });

    achievements.push(AchievementDefinition {
        code: "page_turner".into(),
        name: "Page Turner".into(),
        description: "Read 300 pages within a single week".into(),
        category: AchievementCategory::Reading,
        tier: AchievementTier::Rare,
        xp_reward: 750,
        badge_icon: "pages".into(),
        badge_color: "#10b981".into(),
        sort_order: 40,
        criteria: vec![Criterion::WindowedStat {
            stat: StatKey::PagesRead,
            op: ComparisonOp::Gte,
            value: 300.0,
            window_days: 7,
        }],
        is_active: true,
    });

    // ========================================================================
    // Streaks
    // ========================================================================

    achievements.push(AchievementDefinition {
        code: "week_streak".into(),
        name: "Seven in a Row".into(),
        description: "Read every day for a week".into(),
        category: AchievementCategory::Streak,
        tier: AchievementTier::Common,
        xp_reward: 200,
        badge_icon: "flame".into(),
        badge_color: "#f97316".into(),
        sort_order: 50,
        criteria: vec![stat_gte(StatKey::CurrentStreak, 7.0)],
        is_active: true,
    });

    achievements.push(AchievementDefinition {
        code: "month_streak".into(),
        name: "Thirty Days Strong".into(),
        description: "Read every day for a month".into(),
        category: AchievementCategory::Streak,
        tier: AchievementTier::Epic,
        xp_reward: 1500,
        badge_icon: "flame-tall".into(),
        badge_color: "#ea580c".into(),
        sort_order: 60,
        criteria: vec![stat_gte(StatKey::CurrentStreak, 30.0)],
        is_active: true,
    });

    achievements.push(AchievementDefinition {
        code: "dedicated_reader".into(),
        name: "Dedicated Reader".into(),
        description: "Hold a week-long streak after finishing a book".into(),
        category: AchievementCategory::Streak,
        tier: AchievementTier::Uncommon,
        xp_reward: 400,
        badge_icon: "medal".into(),
        badge_color: "#fb923c".into(),
        sort_order: 70,
        criteria: vec![
            stat_gte(StatKey::BooksCompleted, 1.0),
            stat_gte(StatKey::CurrentStreak, 7.0),
        ],
        is_active: true,
    });

    // ========================================================================
    // Flashcards
    // ========================================================================

    achievements.push(AchievementDefinition {
        code: "first_review".into(),
        name: "Memory Lane".into(),
        description: "Review your first 10 flashcards".into(),
        category: AchievementCategory::Flashcards,
        tier: AchievementTier::Common,
        xp_reward: 100,
        badge_icon: "cards".into(),
        badge_color: "#818cf8".into(),
        sort_order: 80,
        criteria: vec![stat_gte(StatKey::CardsReviewed, 10.0)],
        is_active: true,
    });

    achievements.push(AchievementDefinition {
        code: "card_shark".into(),
        name: "Card Shark".into(),
        description: "Review 1000 flashcards".into(),
        category: AchievementCategory::Flashcards,
        tier: AchievementTier::Rare,
        xp_reward: 1000,
        badge_icon: "cards-stack".into(),
        badge_color: "#6366f1".into(),
        sort_order: 90,
        criteria: vec![stat_gte(StatKey::CardsReviewed, 1000.0)],
        is_active: true,
    });

    // ========================================================================
    // Listening
    // ========================================================================

    achievements.push(AchievementDefinition {
        code: "first_listen".into(),
        name: "All Ears".into(),
        description: "Finish your first podcast episode".into(),
        category: AchievementCategory::Listening,
        tier: AchievementTier::Common,
        xp_reward: 100,
        badge_icon: "headphones".into(),
        badge_color: "#38bdf8".into(),
        sort_order: 100,
        criteria: vec![stat_gte(StatKey::PodcastsFinished, 1.0)],
        is_active: true,
    });

    achievements.push(AchievementDefinition {
        code: "marathon_listener".into(),
        name: "Marathon Listener".into(),
        description: "Listen for 600 minutes in total".into(),
        category: AchievementCategory::Listening,
        tier: AchievementTier::Uncommon,
        xp_reward: 500,
        badge_icon: "waveform".into(),
        badge_color: "#0ea5e9".into(),
        sort_order: 110,
        criteria: vec![stat_gte(StatKey::MinutesListened, 600.0)],
        is_active: true,
    });

    // ========================================================================
    // Social
    // ========================================================================

    achievements.push(AchievementDefinition {
        code: "note_taker".into(),
        name: "Margin Notes".into(),
        description: "Create 25 notes".into(),
        category: AchievementCategory::Social,
        tier: AchievementTier::Common,
        xp_reward: 150,
        badge_icon: "pencil".into(),
        badge_color: "#e879f9".into(),
        sort_order: 120,
        criteria: vec![stat_gte(StatKey::NotesCreated, 25.0)],
        is_active: true,
    });

    achievements.push(AchievementDefinition {
        code: "book_club".into(),
        name: "Book Club".into(),
        description: "Connect with 5 fellow readers".into(),
        category: AchievementCategory::Social,
        tier: AchievementTier::Uncommon,
        xp_reward: 300,
        badge_icon: "people".into(),
        badge_color: "#d946ef".into(),
        sort_order: 130,
        criteria: vec![stat_gte(StatKey::FriendsCount, 5.0)],
        is_active: true,
    });

    // Retired 2025 launch promotion, kept for users who already hold it
    achievements.push(AchievementDefinition {
        code: "launch_reader".into(),
        name: "Day One Reader".into(),
        description: "Finished a book during launch week".into(),
        category: AchievementCategory::Reading,
        tier: AchievementTier::Epic,
        xp_reward: 1000,
        badge_icon: "rocket".into(),
        badge_color: "#f43f5e".into(),
        sort_order: 140,
        criteria: vec![stat_gte(StatKey::BooksCompleted, 1.0)],
        is_active: false,
    });

    Catalog::new(achievements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert!(catalog.achievements().len() >= 12);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_catalog_sorted_by_sort_order() {
        let catalog = build_default_catalog();
        let orders: Vec<i32> = catalog.achievements().iter().map(|a| a.sort_order).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted);
    }

    #[test]
    fn test_new_sorts_out_of_order_definitions() {
        let mut defs = build_default_catalog().achievements().to_vec();
        defs.reverse();
        let catalog = Catalog::new(defs);
        let orders: Vec<i32> = catalog.achievements().iter().map(|a| a.sort_order).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted);
    }

    #[test]
    fn test_get_by_code() {
        let catalog = build_default_catalog();
        assert!(catalog.get("first_book").is_some());
        assert!(catalog.get("no_such_code").is_none());
    }

    #[test]
    fn test_validate_rejects_empty_criteria() {
        let mut defs = build_default_catalog().achievements().to_vec();
        defs[0].criteria.clear();
        let catalog = Catalog::new(defs);
        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("no criteria")));
    }

    #[test]
    fn test_validate_rejects_duplicate_codes() {
        let mut defs = build_default_catalog().achievements().to_vec();
        let dup = defs[0].clone();
        defs.push(dup);
        let catalog = Catalog::new(defs);
        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("Duplicate")));
    }

    #[test]
    fn test_catalog_contains_inactive_entry() {
        let catalog = build_default_catalog();
        assert!(catalog.achievements().iter().any(|a| !a.is_active));
    }
}
