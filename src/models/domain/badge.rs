use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum BadgeType {
    /// Unlocks once the completed-quest count reaches the threshold.
    Quest,
    /// Unlocks once the student's level reaches the threshold.
    Level,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Badge {
    pub id: String,
    pub key: String, // e.g. FIRST_QUEST
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub badge_type: BadgeType,
    pub condition_value: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Badge {
    pub fn is_satisfied(&self, completed_quests: i64, level: i64) -> bool {
        match self.badge_type {
            BadgeType::Quest => completed_quests >= self.condition_value,
            BadgeType::Level => level >= self.condition_value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BadgeUnlock {
    pub student_id: String,
    pub badge_id: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Result of an insert-if-absent on the unlock store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnlockOutcome {
    Inserted,
    Existing,
}

impl UnlockOutcome {
    pub fn inserted(&self) -> bool {
        matches!(self, UnlockOutcome::Inserted)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct UnlockedBadge {
    pub key: String,
    pub title: String,
    pub icon: Option<String>,
}

impl From<&Badge> for UnlockedBadge {
    fn from(badge: &Badge) -> Self {
        UnlockedBadge {
            key: badge.key.clone(),
            title: badge.title.clone(),
            icon: badge.icon.clone(),
        }
    }
}
