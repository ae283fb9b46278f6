use async_graphql::InputObject;
use serde::Deserialize;
use validator::Validate;

use crate::constants::progression::LEADERBOARD_MAX_LIMIT;

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, message = "questId is required"))]
    pub quest_id: String,

    #[validate(length(min = 1, message = "selectedOption is required"))]
    #[serde(default)]
    pub selected_option: String,

    /// Pointer the client believes it is answering. When present it must
    /// match the ledger, so replays of an earlier question are rejected.
    #[validate(range(min = 0))]
    #[serde(default)]
    pub question_index: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LeaderboardParams {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl LeaderboardParams {
    pub fn limit_or(&self, default_limit: i64) -> i64 {
        self.limit
            .unwrap_or(default_limit)
            .clamp(1, LEADERBOARD_MAX_LIMIT)
    }
}
