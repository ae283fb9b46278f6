use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::{
    constants::messages,
    errors::{AppError, AppResult},
    models::{
        domain::{OptionLabel, Quest, QuestAttempt, Quiz, RewardDelta, RewardLogEntry, RewardType},
        dto::{
            quest_dto::{AnswerOutcome, CompletionSummary, QuestionView, StartOutcome},
            request::SubmitAnswerRequest,
        },
    },
    repositories::{
        QuestAttemptRepository, QuestRepository, QuizRepository, RewardLogRepository,
        StudentRepository,
    },
    services::settlement_service::{append_reward_log, SettlementService},
};

/// Drives a student through a quest: start, one question at a time, and the
/// hand-off to settlement when the last answer lands.
pub struct ProgressionService {
    quests: Arc<dyn QuestRepository>,
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn QuestAttemptRepository>,
    students: Arc<dyn StudentRepository>,
    reward_log: Arc<dyn RewardLogRepository>,
    settlement: Arc<SettlementService>,
}

impl ProgressionService {
    pub fn new(
        quests: Arc<dyn QuestRepository>,
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn QuestAttemptRepository>,
        students: Arc<dyn StudentRepository>,
        reward_log: Arc<dyn RewardLogRepository>,
        settlement: Arc<SettlementService>,
    ) -> Self {
        Self {
            quests,
            quizzes,
            attempts,
            students,
            reward_log,
            settlement,
        }
    }

    /// Starts the quest, or hands back the attempt already in progress.
    pub async fn start_quest(&self, student_id: &str, quest_id: &str) -> AppResult<StartOutcome> {
        let quest = self.load_quest(quest_id).await?;

        if let Some(active) = self.attempts.find_active(student_id, quest_id).await? {
            log::debug!("Student {} resumed quest {}", student_id, quest_id);
            return Ok(StartOutcome::Resumed(active));
        }

        let quiz = self.load_quiz(&quest.quiz_id).await?;
        if quiz.questions.is_empty() {
            return Err(AppError::ValidationError(
                messages::QUIZ_HAS_NO_QUESTIONS.to_string(),
            ));
        }

        let prior_attempts = self.attempts.count_attempts(student_id, quest_id).await?;
        if prior_attempts >= quest.max_attempts {
            let message = if self.attempts.has_completed(student_id, quest_id).await? {
                messages::QUEST_ALREADY_COMPLETED
            } else {
                messages::ATTEMPTS_EXHAUSTED
            };
            return Err(AppError::AttemptsExhausted(message.to_string()));
        }

        let attempt = QuestAttempt::start(
            student_id,
            quest_id,
            &quiz.id,
            quiz.question_count() as i64,
            prior_attempts + 1,
        );

        let attempt = match self.attempts.create(attempt).await {
            Ok(attempt) => attempt,
            Err(AppError::ConcurrentModification(msg)) => {
                // A parallel start won the insert; resume that one.
                return match self.attempts.find_active(student_id, quest_id).await? {
                    Some(active) => Ok(StartOutcome::Resumed(active)),
                    None => Err(AppError::ConcurrentModification(msg)),
                };
            }
            Err(err) => return Err(err),
        };

        log::info!(
            "Student {} started quest {} (attempt {} of {})",
            student_id,
            quest_id,
            attempt.attempt_number,
            quest.max_attempts
        );

        if quest.rewards.has_start_bonus() {
            self.grant_start_bonus(student_id, &quest, &attempt).await?;
        }

        Ok(StartOutcome::Started(attempt))
    }

    /// The question the in-progress attempt points at, without its answer.
    pub async fn current_question(&self, student_id: &str, quest_id: &str) -> AppResult<QuestionView> {
        let attempt = self.load_active(student_id, quest_id).await?;
        let quiz = self.load_quiz(&attempt.quiz_id).await?;

        if attempt.is_exhausted() {
            return Err(AppError::NoMoreQuestions(messages::NO_MORE_QUESTIONS.to_string()));
        }
        let question = quiz
            .question_at(attempt.current_question_index)
            .ok_or_else(|| AppError::NoMoreQuestions(messages::NO_MORE_QUESTIONS.to_string()))?;

        Ok(QuestionView::from_question(&attempt, question))
    }

    /// Grades one answer and advances the pointer. The answer that exhausts
    /// the quiz completes the attempt and triggers settlement.
    pub async fn submit_answer(
        &self,
        student_id: &str,
        request: &SubmitAnswerRequest,
    ) -> AppResult<AnswerOutcome> {
        request.validate()?;
        let selected: OptionLabel = request.selected_option.parse()?;

        let mut attempt = self.load_active(student_id, &request.quest_id).await?;
        if let Some(expected) = request.question_index {
            if expected != attempt.current_question_index {
                log::warn!(
                    "Stale answer for attempt {}: client at {}, ledger at {}",
                    attempt.id,
                    expected,
                    attempt.current_question_index
                );
                return Err(AppError::ConcurrentModification(
                    messages::STALE_SUBMISSION.to_string(),
                ));
            }
        }

        let quiz = self.load_quiz(&attempt.quiz_id).await?;
        let question = quiz
            .question_at(attempt.current_question_index)
            .ok_or_else(|| AppError::QuestionNotFound(messages::QUESTION_NOT_FOUND.to_string()))?;
        let was_correct = question.is_correct(selected);

        attempt.record_answer(was_correct);
        if !attempt.is_exhausted() {
            let saved = self.attempts.save(&attempt).await?;
            return Ok(AnswerOutcome::Advanced {
                was_correct,
                next_index: saved.current_question_index,
            });
        }

        let score = attempt.complete(Utc::now());
        // Only the writer whose save lands gets to settle.
        let completed = self.attempts.save(&attempt).await?;
        log::info!(
            "Student {} completed quest {} with score {}",
            student_id,
            completed.quest_id,
            score
        );

        // The attempt stays completed; a failed settlement surfaces as a
        // server error and can be retried.
        let summary = self.settlement.settle(&completed).await.map_err(|err| match err {
            AppError::DatabaseError(_) | AppError::InternalError(_) => err,
            other => AppError::InternalError(format!(
                "settlement of attempt {} failed: {}",
                completed.id, other
            )),
        })?;
        Ok(AnswerOutcome::Completed {
            was_correct,
            summary,
        })
    }

    /// Re-runs settlement for the newest completed attempt whose settlement
    /// stopped part way, even when later attempts exist.
    pub async fn retry_settlement(
        &self,
        student_id: &str,
        quest_id: &str,
    ) -> AppResult<CompletionSummary> {
        let attempt = self
            .attempts
            .find_unsettled(student_id, quest_id)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::SETTLEMENT_NOT_PENDING.to_string()))?;

        log::info!("Retrying settlement of attempt {}", attempt.id);
        self.settlement.settle(&attempt).await
    }

    async fn grant_start_bonus(
        &self,
        student_id: &str,
        quest: &Quest,
        attempt: &QuestAttempt,
    ) -> AppResult<()> {
        let progress = self
            .students
            .get_progress(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::STUDENT_NOT_FOUND.to_string()))?;

        let bonus = &quest.rewards;
        let delta = RewardDelta::granting(progress.xp, bonus.start_bonus_xp, bonus.start_bonus_coins);
        self.students.apply_reward_delta(student_id, delta).await?;

        let entry = RewardLogEntry::new(
            student_id,
            RewardType::QuestStart,
            format!("Quest started: {}", quest.title),
            bonus.start_bonus_xp,
            Some(&attempt.id),
        );
        append_reward_log(self.reward_log.as_ref(), entry).await;
        Ok(())
    }

    async fn load_quest(&self, quest_id: &str) -> AppResult<Quest> {
        self.quests
            .find_by_id(quest_id)
            .await?
            .filter(|quest| quest.is_published)
            .ok_or_else(|| AppError::NotFound(messages::QUEST_NOT_FOUND.to_string()))
    }

    async fn load_quiz(&self, quiz_id: &str) -> AppResult<Quiz> {
        self.quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::QUIZ_NOT_FOUND.to_string()))
    }

    async fn load_active(&self, student_id: &str, quest_id: &str) -> AppResult<QuestAttempt> {
        self.attempts
            .find_active(student_id, quest_id)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::ATTEMPT_NOT_FOUND.to_string()))
    }
}
