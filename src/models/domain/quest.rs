use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::quiz::Difficulty;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quest {
    pub id: String,
    pub teacher_id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub time_limit_minutes: i64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i64,
    pub quiz_id: String,
    #[serde(default)]
    pub passing_score: i64, // percentage
    #[serde(default)]
    pub rewards: QuestRewards,
    #[serde(default)]
    pub is_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_max_attempts() -> i64 {
    1
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestRewards {
    #[serde(default)]
    pub xp_points: i64,
    #[serde(default)]
    pub coins: i64,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub bonus_condition: Option<String>,
    #[serde(default)]
    pub start_bonus_xp: i64,
    #[serde(default)]
    pub start_bonus_coins: i64,
}

impl QuestRewards {
    pub fn has_start_bonus(&self) -> bool {
        self.start_bonus_xp != 0 || self.start_bonus_coins != 0
    }
}

impl Quest {
    pub fn passed(&self, score: i64) -> bool {
        score >= self.passing_score
    }
}
