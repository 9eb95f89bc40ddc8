#![forbid(unsafe_code)]

//! Core domain model and business logic for the ReadQuest achievement
//! and progression engine.
//!
//! This crate provides:
//! - Domain types (achievements, criteria, stats, unlock events)
//! - The static achievement catalog
//! - Criterion evaluation and achievement matching
//! - XP-to-level conversion
//! - The progression ledger with at-most-once unlock semantics
//! - Persistence (state store, unlock log, CSV rollup, history)
//! - Wire-response mapping and category summaries

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod criteria;
pub mod progression;
pub mod matcher;
pub mod engine;
pub mod store;
pub mod unlock_log;
pub mod csv_rollup;
pub mod history;
pub mod stats;
pub mod summary;
pub mod response;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use config::Config;
pub use engine::check_and_award;
pub use history::load_recent_unlocks;
pub use progression::level_for_xp;
pub use response::{
    to_check_response, to_list_response, AchievementsCheckResponse, AchievementsListResponse,
    AchievementWithStatus,
};
pub use stats::load_stats_snapshot;
pub use store::{CommitReceipt, FileStore, PendingUnlock, ProgressionStore};
pub use summary::{summarize, CategorySummary};
