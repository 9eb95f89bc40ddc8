//! Wire-shape mapping for API consumers.
//!
//! Pure boundary transforms from domain records to the camelCase JSON
//! shapes callers receive. Dates go out as ISO-8601 strings with
//! millisecond precision and a `Z` suffix.

use crate::summary::{summarize, CategorySummary};
use crate::types::{
    AchievementCategory, AchievementDefinition, AchievementTier, Criterion, ProgressionOutcome,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An achievement definition together with one user's unlock status
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementWithStatus {
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
    pub is_unlocked: bool,
    /// ISO-8601 instant with milliseconds, or null while locked
    pub unlocked_at: Option<String>,
}

/// Full achievement listing for one user
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementsListResponse {
    pub achievements: Vec<AchievementWithStatus>,
    pub total_count: usize,
    pub unlocked_count: usize,
    pub categories: Vec<CategorySummary>,
}

/// Result of one achievement check
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementsCheckResponse {
    pub newly_unlocked: Vec<AchievementWithStatus>,
    pub total_xp_awarded: u32,
    pub previous_xp: i64,
    pub new_xp: i64,
    pub previous_level: u32,
    pub new_level: u32,
    pub leveled_up: bool,
}

/// Format an instant the way the wire expects it
fn format_instant(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Map a definition plus unlock status to its wire shape
///
/// `unlocked_at` is ignored unless `is_unlocked` is true; a locked
/// achievement always serializes a null timestamp.
pub fn to_wire(
    def: &AchievementDefinition,
    is_unlocked: bool,
    unlocked_at: Option<DateTime<Utc>>,
) -> AchievementWithStatus {
    AchievementWithStatus {
        code: def.code.clone(),
        name: def.name.clone(),
        description: def.description.clone(),
        category: def.category,
        tier: def.tier,
        xp_reward: def.xp_reward,
        badge_icon: def.badge_icon.clone(),
        badge_color: def.badge_color.clone(),
        sort_order: def.sort_order,
        criteria: def.criteria.clone(),
        is_active: def.is_active,
        is_unlocked,
        unlocked_at: if is_unlocked {
            unlocked_at.map(format_instant)
        } else {
            None
        },
    }
}

/// Build the listing response for a catalog and a user's unlock map
pub fn to_list_response(
    definitions: &[AchievementDefinition],
    unlocked: &std::collections::BTreeMap<String, DateTime<Utc>>,
) -> AchievementsListResponse {
    let achievements: Vec<AchievementWithStatus> = definitions
        .iter()
        .map(|def| {
            let unlocked_at = unlocked.get(&def.code).copied();
            to_wire(def, unlocked_at.is_some(), unlocked_at)
        })
        .collect();

    let unlocked_count = achievements.iter().filter(|a| a.is_unlocked).count();
    let categories = summarize(&achievements);

    AchievementsListResponse {
        total_count: achievements.len(),
        unlocked_count,
        categories,
        achievements,
    }
}

/// Map an engine outcome to the check response
pub fn to_check_response(outcome: &ProgressionOutcome) -> AchievementsCheckResponse {
    AchievementsCheckResponse {
        newly_unlocked: outcome
            .newly_unlocked
            .iter()
            .map(|(def, at)| to_wire(def, true, Some(*at)))
            .collect(),
        total_xp_awarded: outcome.total_xp_awarded,
        previous_xp: outcome.previous_xp,
        new_xp: outcome.new_xp,
        previous_level: outcome.previous_level,
        new_level: outcome.new_level,
        leveled_up: outcome.leveled_up,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn a_definition() -> AchievementDefinition {
        build_default_catalog().get("first_book").unwrap().clone()
    }

    #[test]
    fn test_epoch_formats_with_milliseconds_and_z() {
        let def = a_definition();
        let epoch = Utc.timestamp_opt(0, 0).unwrap();

        let wire = to_wire(&def, true, Some(epoch));
        assert_eq!(
            wire.unlocked_at.as_deref(),
            Some("1970-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn test_subsecond_precision_is_kept() {
        let def = a_definition();
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();

        let wire = to_wire(&def, true, Some(at));
        assert!(wire.unlocked_at.unwrap().ends_with(".123Z"));
    }

    #[test]
    fn test_locked_has_null_timestamp_regardless_of_argument() {
        let def = a_definition();
        let epoch = Utc.timestamp_opt(0, 0).unwrap();

        let wire = to_wire(&def, false, Some(epoch));
        assert!(!wire.is_unlocked);
        assert_eq!(wire.unlocked_at, None);
    }

    #[test]
    fn test_wire_fields_are_camel_case() {
        let def = a_definition();
        let wire = to_wire(&def, false, None);
        let json = serde_json::to_value(&wire).unwrap();

        assert!(json.get("xpReward").is_some());
        assert!(json.get("badgeIcon").is_some());
        assert!(json.get("criteria").is_some());
        assert!(json.get("isActive").is_some());
        assert!(json.get("isUnlocked").is_some());
        assert!(json.get("unlockedAt").is_some());
        assert!(json.get("xp_reward").is_none());
        assert_eq!(json["category"], "READING");
    }

    #[test]
    fn test_wire_carries_every_definition_field() {
        let def = a_definition();
        let wire = to_wire(&def, false, None);

        assert_eq!(wire.code, def.code);
        assert_eq!(wire.name, def.name);
        assert_eq!(wire.description, def.description);
        assert_eq!(wire.category, def.category);
        assert_eq!(wire.tier, def.tier);
        assert_eq!(wire.xp_reward, def.xp_reward);
        assert_eq!(wire.badge_icon, def.badge_icon);
        assert_eq!(wire.badge_color, def.badge_color);
        assert_eq!(wire.sort_order, def.sort_order);
        assert_eq!(wire.criteria, def.criteria);
        assert_eq!(wire.is_active, def.is_active);
    }

    #[test]
    fn test_list_response_counts() {
        let catalog = build_default_catalog();
        let mut unlocked = BTreeMap::new();
        unlocked.insert("first_book".to_string(), Utc::now());
        unlocked.insert("week_streak".to_string(), Utc::now());

        let response = to_list_response(catalog.achievements(), &unlocked);
        assert_eq!(response.total_count, catalog.achievements().len());
        assert_eq!(response.unlocked_count, 2);
        assert!(!response.categories.is_empty());

        let first = response
            .achievements
            .iter()
            .find(|a| a.code == "first_book")
            .unwrap();
        assert!(first.is_unlocked);
        assert!(first.unlocked_at.is_some());
    }
}
