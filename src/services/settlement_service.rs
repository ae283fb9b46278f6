use chrono::Utc;
use std::sync::Arc;

use crate::{
    constants::{
        messages,
        progression::{level_for_xp, rounded_percent},
    },
    errors::{AppError, AppResult},
    models::{
        domain::{
            QuestAttempt, QuestRewards, RewardDelta, RewardLogEntry, RewardType, SettlementStep,
            StudentProgress, UnlockedBadge,
        },
        dto::quest_dto::CompletionSummary,
    },
    repositories::{
        BadgeRepository, BadgeUnlockRepository, QuestAttemptRepository, QuestRepository,
        RewardLogRepository, StudentRepository,
    },
    services::badge_service::eligible_badges,
};

/// Writes a history row. History is display-only, so a failed append is
/// logged and swallowed.
pub async fn append_reward_log(reward_log: &dyn RewardLogRepository, entry: RewardLogEntry) {
    let student_id = entry.student_id.clone();
    if let Err(err) = reward_log.append(entry).await {
        log::warn!("Failed to append reward log for student {}: {}", student_id, err);
    }
}

fn step_failed<'a>(step: &'static str, attempt_id: &'a str) -> impl FnOnce(AppError) -> AppError + 'a {
    move |err| {
        log::error!("Settlement step '{}' failed for attempt {}: {}", step, attempt_id, err);
        err
    }
}

/// Grants the rewards of a completed attempt exactly once.
///
/// Steps, in order: rewards delta on the student aggregate, completed-quest
/// count, badge unlocks, completion history row, settled marker. Steps that
/// are not naturally idempotent are claimed on the attempt first, so a retry
/// after a partial failure picks up where the last run stopped.
pub struct SettlementService {
    quests: Arc<dyn QuestRepository>,
    attempts: Arc<dyn QuestAttemptRepository>,
    students: Arc<dyn StudentRepository>,
    badges: Arc<dyn BadgeRepository>,
    unlocks: Arc<dyn BadgeUnlockRepository>,
    reward_log: Arc<dyn RewardLogRepository>,
}

impl SettlementService {
    pub fn new(
        quests: Arc<dyn QuestRepository>,
        attempts: Arc<dyn QuestAttemptRepository>,
        students: Arc<dyn StudentRepository>,
        badges: Arc<dyn BadgeRepository>,
        unlocks: Arc<dyn BadgeUnlockRepository>,
        reward_log: Arc<dyn RewardLogRepository>,
    ) -> Self {
        Self {
            quests,
            attempts,
            students,
            badges,
            unlocks,
            reward_log,
        }
    }

    pub async fn settle(&self, attempt: &QuestAttempt) -> AppResult<CompletionSummary> {
        if attempt.settled_at.is_some() {
            return Err(AppError::AlreadyExists(
                messages::SETTLEMENT_ALREADY_DONE.to_string(),
            ));
        }
        if !attempt.needs_settlement() {
            return Err(AppError::NotFound(messages::SETTLEMENT_NOT_PENDING.to_string()));
        }

        let quest = self
            .quests
            .find_by_id(&attempt.quest_id)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::QUEST_NOT_FOUND.to_string()))?;
        let rewards = &quest.rewards;
        let score = attempt
            .score
            .unwrap_or_else(|| rounded_percent(attempt.correct_answers, attempt.total_questions));

        let (before, new_level) = self
            .grant_rewards(attempt, rewards)
            .await
            .map_err(step_failed("rewards", &attempt.id))?;

        let completed_quests = self
            .attempts
            .count_completed(&attempt.student_id)
            .await
            .map_err(step_failed("completed count", &attempt.id))?;

        let new_badges = self
            .unlock_badges(attempt, completed_quests, new_level, rewards.badge.as_deref())
            .await
            .map_err(step_failed("badges", &attempt.id))?;

        let log_claimed = self
            .attempts
            .claim_settlement_step(&attempt.id, SettlementStep::CompletionLog)
            .await
            .map_err(step_failed("completion log", &attempt.id))?;
        if log_claimed {
            let entry = RewardLogEntry::new(
                &attempt.student_id,
                RewardType::QuestCompletion,
                format!("Quest completed: {}", quest.title),
                rewards.xp_points,
                Some(&attempt.id),
            );
            append_reward_log(self.reward_log.as_ref(), entry).await;
        }

        self.attempts
            .mark_settled(&attempt.id, Utc::now())
            .await
            .map_err(step_failed("settled marker", &attempt.id))?;

        log::info!(
            "Settled attempt {} for student {}: score {}, +{} xp, +{} coins, level {} -> {}, {} new badge(s)",
            attempt.id,
            attempt.student_id,
            score,
            rewards.xp_points,
            rewards.coins,
            before.level,
            new_level,
            new_badges.len()
        );

        Ok(CompletionSummary {
            attempt_id: attempt.id.clone(),
            score,
            passed: quest.passed(score),
            earned_xp: rewards.xp_points,
            earned_coins: rewards.coins,
            old_level: before.level,
            new_level,
            leveled_up: new_level > before.level,
            new_badges,
        })
    }

    /// Returns the aggregate as read before the grant and the level it
    /// moves to.
    async fn grant_rewards(
        &self,
        attempt: &QuestAttempt,
        rewards: &QuestRewards,
    ) -> AppResult<(StudentProgress, i64)> {
        let before = self
            .students
            .get_progress(&attempt.student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::STUDENT_NOT_FOUND.to_string()))?;

        if !self
            .attempts
            .claim_settlement_step(&attempt.id, SettlementStep::Rewards)
            .await?
        {
            log::warn!("Rewards for attempt {} already granted, skipping", attempt.id);
            let level = before.level;
            return Ok((before, level));
        }

        let delta = RewardDelta::granting(before.xp, rewards.xp_points, rewards.coins);
        if let Err(err) = self
            .students
            .apply_reward_delta(&attempt.student_id, delta)
            .await
        {
            if let Err(release_err) = self
                .attempts
                .release_settlement_step(&attempt.id, SettlementStep::Rewards)
                .await
            {
                log::error!(
                    "Could not release rewards claim on attempt {}: {}",
                    attempt.id,
                    release_err
                );
            }
            return Err(err);
        }

        let new_level = level_for_xp(before.xp + rewards.xp_points);
        Ok((before, new_level))
    }

    async fn unlock_badges(
        &self,
        attempt: &QuestAttempt,
        completed_quests: i64,
        level: i64,
        quest_badge: Option<&str>,
    ) -> AppResult<Vec<UnlockedBadge>> {
        let catalog = self.badges.list_active().await?;
        if let Some(key) = quest_badge {
            if !catalog.iter().any(|badge| badge.key == key) {
                log::warn!("Quest {} rewards unknown badge '{}'", attempt.quest_id, key);
            }
        }

        let student_id = attempt.student_id.as_str();
        let now = Utc::now();
        let mut unlocked = Vec::new();

        for badge in eligible_badges(&catalog, completed_quests, level, quest_badge) {
            // Key first: a failure here leaves no unlock row, so the retry
            // still inserts it, logs it and reports the badge.
            self.students.add_badge(student_id, &badge.key).await?;
            let outcome = self.unlocks.upsert_if_absent(student_id, &badge.id, now).await?;
            if !outcome.inserted() {
                continue;
            }

            let entry = RewardLogEntry::new(
                student_id,
                RewardType::BadgeUnlock,
                format!("Badge unlocked: {}", badge.title),
                0,
                Some(&attempt.id),
            );
            append_reward_log(self.reward_log.as_ref(), entry).await;

            log::info!("Student {} unlocked badge {}", student_id, badge.key);
            unlocked.push(UnlockedBadge::from(badge));
        }

        Ok(unlocked)
    }
}
