//! Core domain types for the ReadQuest achievement engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Achievement definitions (categories, tiers, criteria)
//! - Reading-statistic keys and snapshots
//! - User progression state and unlock events
//! - The engine's outcome type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

// ============================================================================
// Achievement Definition Types
// ============================================================================

/// Grouping tag on achievements, used for progress statistics
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementCategory {
    Reading,
    Streak,
    Flashcards,
    Listening,
    Social,
}

impl AchievementCategory {
    /// Wire name for this category (matches the serialized form)
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementCategory::Reading => "READING",
            AchievementCategory::Streak => "STREAK",
            AchievementCategory::Flashcards => "FLASHCARDS",
            AchievementCategory::Listening => "LISTENING",
            AchievementCategory::Social => "SOCIAL",
        }
    }
}

impl std::fmt::Display for AchievementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rarity classification of an achievement
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementTier {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// A reading statistic the stats provider can report.
///
/// The set is closed: criteria referencing a key this build does not
/// know about deserialize to `Unknown`, which never satisfies a
/// comparison. That keeps old catalogs from granting achievements
/// through stats the engine cannot interpret.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StatKey {
    BooksCompleted,
    PagesRead,
    CurrentStreak,
    LongestStreak,
    CardsReviewed,
    SessionsCompleted,
    MinutesListened,
    PodcastsFinished,
    NotesCreated,
    HighlightsCreated,
    FriendsCount,
    #[serde(other)]
    Unknown,
}

/// Comparison operator applied by a criterion
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ComparisonOp {
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "==")]
    Eq,
}

/// A single testable condition that must hold for an achievement to unlock
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Criterion {
    /// Compare a lifetime statistic against a target value
    Stat {
        stat: StatKey,
        op: ComparisonOp,
        value: f64,
    },
    /// Compare a windowed aggregate (e.g. pages read within the last
    /// N days) against a target value. The aggregate itself is
    /// computed by the stats provider; the window here only selects
    /// which aggregate to read.
    WindowedStat {
        stat: StatKey,
        op: ComparisonOp,
        value: f64,
        window_days: u32,
    },
}

/// An achievement definition from the static catalog
///
/// Definitions are created at deploy time and never mutated at runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: AchievementCategory,
    pub tier: AchievementTier,
    pub xp_reward: u32,
    pub badge_icon: String,
    pub badge_color: String,
    pub sort_order: i32,
    pub criteria: Vec<Criterion>,
    pub is_active: bool,
}

// ============================================================================
// Stats Snapshot
// ============================================================================

/// A windowed aggregate supplied by the stats provider
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WindowedStat {
    pub stat: StatKey,
    pub window_days: u32,
    pub value: f64,
}

/// Flat numeric snapshot of a user's reading statistics.
///
/// Missing entries read as `0.0`; the engine never fails on an absent
/// statistic.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct StatsSnapshot {
    #[serde(default)]
    pub totals: HashMap<StatKey, f64>,
    #[serde(default)]
    pub windowed: Vec<WindowedStat>,
}

impl StatsSnapshot {
    /// Lifetime value for a statistic, defaulting to zero when absent
    pub fn value(&self, key: StatKey) -> f64 {
        self.totals.get(&key).copied().unwrap_or(0.0)
    }

    /// Windowed aggregate for a statistic, defaulting to zero when the
    /// provider supplied no aggregate for that (stat, window) pair
    pub fn windowed_value(&self, key: StatKey, window_days: u32) -> f64 {
        self.windowed
            .iter()
            .find(|w| w.stat == key && w.window_days == window_days)
            .map(|w| w.value)
            .unwrap_or(0.0)
    }
}

// ============================================================================
// Progression State and Unlock Events
// ============================================================================

/// The immutable record that a user satisfied an achievement.
///
/// At most one event ever exists per `(user_id, code)` pair; the store
/// enforces this inside its commit critical section.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnlockEvent {
    pub id: Uuid,
    pub user_id: String,
    pub code: String,
    pub unlocked_at: DateTime<Utc>,
}

/// A user's persistent progression state.
///
/// `unlocked` maps achievement code to the instant it was unlocked;
/// its key set is the set of unlocked codes. It only ever grows, and
/// `current_xp` only ever increases.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct UserProgressionState {
    pub current_xp: i64,
    #[serde(default)]
    pub unlocked: BTreeMap<String, DateTime<Utc>>,
}

impl UserProgressionState {
    /// Whether the given achievement code is already unlocked
    pub fn is_unlocked(&self, code: &str) -> bool {
        self.unlocked.contains_key(code)
    }

    /// The set of unlocked achievement codes
    pub fn unlocked_codes(&self) -> std::collections::BTreeSet<String> {
        self.unlocked.keys().cloned().collect()
    }
}

// ============================================================================
// Engine Outcome
// ============================================================================

/// Result of one `check_and_award` invocation
#[derive(Clone, Debug)]
pub struct ProgressionOutcome {
    /// Achievements this call actually unlocked, in catalog order,
    /// paired with their unlock instants
    pub newly_unlocked: Vec<(AchievementDefinition, DateTime<Utc>)>,
    pub total_xp_awarded: u32,
    pub previous_xp: i64,
    pub new_xp: i64,
    pub previous_level: u32,
    pub new_level: u32,
    pub leveled_up: bool,
}
