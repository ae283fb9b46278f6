use std::sync::Arc;

use crate::{
    constants::{messages, progression::LEADERBOARD_MAX_LIMIT},
    errors::{AppError, AppResult},
    models::dto::{
        request::PaginationParams,
        response::{LeaderboardEntry, RewardsOverview},
    },
    repositories::{RewardLogRepository, StudentRepository},
};

/// Read-only views over the student aggregate and reward history.
pub struct LeaderboardService {
    students: Arc<dyn StudentRepository>,
    reward_log: Arc<dyn RewardLogRepository>,
    default_limit: i64,
}

impl LeaderboardService {
    pub fn new(
        students: Arc<dyn StudentRepository>,
        reward_log: Arc<dyn RewardLogRepository>,
        default_limit: i64,
    ) -> Self {
        Self {
            students,
            reward_log,
            default_limit: default_limit.clamp(1, LEADERBOARD_MAX_LIMIT),
        }
    }

    pub async fn leaderboard(&self, limit: Option<i64>) -> AppResult<Vec<LeaderboardEntry>> {
        let limit = limit
            .unwrap_or(self.default_limit)
            .clamp(1, LEADERBOARD_MAX_LIMIT);

        let students = self.students.top_by_xp(limit).await?;
        let entries = students
            .into_iter()
            .enumerate()
            .map(|(i, student)| LeaderboardEntry {
                rank: i as i64 + 1,
                name: student.full_name(),
                student_id: student.id,
                xp: student.xp,
                coins: student.coins,
            })
            .collect();

        Ok(entries)
    }

    pub async fn rewards_overview(
        &self,
        student_id: &str,
        page: &PaginationParams,
    ) -> AppResult<RewardsOverview> {
        let progress = self
            .students
            .get_progress(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::STUDENT_NOT_FOUND.to_string()))?;

        let rank = self
            .students
            .rank_of(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::STUDENT_NOT_FOUND.to_string()))?;

        let (history, history_total) = self
            .reward_log
            .list_for_student(student_id, page.offset(), page.limit())
            .await?;

        Ok(RewardsOverview {
            progress,
            rank,
            history,
            history_total,
        })
    }
}
