use async_graphql::SimpleObject;
use serde::Serialize;

use crate::models::domain::{RewardLogEntry, StudentProgress};

/// Envelope carried by every REST response, errors included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            status_code,
            data,
            message: message.into(),
        }
    }

    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(200, data, message)
    }
}

impl ApiResponse<serde_json::Value> {
    pub fn empty(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(status_code, serde_json::json!({}), message)
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub student_id: String,
    pub name: String,
    pub xp: i64,
    pub coins: i64,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct RewardsOverview {
    pub progress: StudentProgress,
    pub rank: i64,
    pub history: Vec<RewardLogEntry>,
    pub history_total: i64,
}
