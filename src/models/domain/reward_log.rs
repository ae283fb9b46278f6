use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "camelCase")]
pub enum RewardType {
    QuestStart,
    QuestCompletion,
    BadgeUnlock,
}

/// Append-only history row. Display only; the engine never reads it back
/// to make a decision.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct RewardLogEntry {
    pub id: String,
    pub student_id: String,
    #[serde(rename = "type")]
    #[graphql(name = "type")]
    pub reward_type: RewardType,
    pub title: String,
    pub points: i64,
    #[serde(default)]
    pub source_attempt_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RewardLogEntry {
    pub fn new(
        student_id: &str,
        reward_type: RewardType,
        title: impl Into<String>,
        points: i64,
        source_attempt_id: Option<&str>,
    ) -> Self {
        RewardLogEntry {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            reward_type,
            title: title.into(),
            points,
            source_attempt_id: source_attempt_id.map(str::to_string),
            created_at: Utc::now(),
        }
    }
}
