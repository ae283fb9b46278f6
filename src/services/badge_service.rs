use crate::models::domain::Badge;

/// Badges from `catalog` the student qualifies for right now.
///
/// A badge qualifies when it is active and either its threshold is met or it
/// is the one named by the quest's own reward. Whether the student already
/// holds it is for the unlock store to decide.
pub fn eligible_badges<'a>(
    catalog: &'a [Badge],
    completed_quests: i64,
    level: i64,
    quest_badge: Option<&str>,
) -> Vec<&'a Badge> {
    catalog
        .iter()
        .filter(|badge| badge.is_active)
        .filter(|badge| {
            badge.is_satisfied(completed_quests, level) || quest_badge == Some(badge.key.as_str())
        })
        .collect()
}
