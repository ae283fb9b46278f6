/// Experience points per level step.
pub const LEVEL_XP: i64 = 100;

/// Upper bound on rows a single leaderboard request may return.
pub const LEADERBOARD_MAX_LIMIT: i64 = 100;

/// `floor(xp / LEVEL_XP) + 1`; negative totals clamp to level 1.
pub fn level_for_xp(xp: i64) -> i64 {
    xp.max(0) / LEVEL_XP + 1
}

/// Integer percentage of `part / total`, rounded half up. Zero total yields 0.
pub fn rounded_percent(part: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (200 * part.max(0) + total) / (2 * total)
}
