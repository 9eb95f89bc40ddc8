//! XP-to-level conversion.
//!
//! Levels 1-10 come from a fixed threshold table; from 15000 XP
//! onward each level is a flat 5000-XP band. The two regimes meet
//! exactly at the seam: 14999 XP is still level 10, 15000 XP is
//! level 11.

/// Minimum XP for levels 1 through 10; index i is the floor of level i+1
const LEVEL_THRESHOLDS: [i64; 10] = [0, 100, 300, 600, 1000, 1500, 2500, 4000, 6000, 10000];

/// XP at which the formula regime takes over from the table
const FORMULA_FLOOR: i64 = 15_000;

/// XP width of each level past the table
const XP_PER_LEVEL: i64 = 5_000;

/// Compute the level for a cumulative XP total
///
/// Total over all inputs: negative XP clamps to zero, so the result
/// is always >= 1. Monotone non-decreasing in `xp`.
pub fn level_for_xp(xp: i64) -> u32 {
    let xp = xp.max(0);

    if xp >= FORMULA_FLOOR {
        return 11 + ((xp - FORMULA_FLOOR) / XP_PER_LEVEL) as u32;
    }

    LEVEL_THRESHOLDS.iter().filter(|&&t| t <= xp).count() as u32
}
