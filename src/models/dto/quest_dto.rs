use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    AttemptStatus, Difficulty, QuestAttempt, Question, QuestionOption, UnlockedBadge,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct AttemptDto {
    pub id: String,
    pub quest_id: String,
    pub quiz_id: String,
    pub status: AttemptStatus,
    pub current_question_index: i64,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub score: Option<i64>,
    pub attempt_number: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<QuestAttempt> for AttemptDto {
    fn from(attempt: QuestAttempt) -> Self {
        AttemptDto {
            id: attempt.id,
            quest_id: attempt.quest_id,
            quiz_id: attempt.quiz_id,
            status: attempt.status,
            current_question_index: attempt.current_question_index,
            correct_answers: attempt.correct_answers,
            total_questions: attempt.total_questions,
            score: attempt.score,
            attempt_number: attempt.attempt_number,
            started_at: attempt.started_at,
            completed_at: attempt.completed_at,
        }
    }
}

/// Result of a quest start: a fresh attempt or the one already running.
#[derive(Debug, Clone)]
pub enum StartOutcome {
    Started(QuestAttempt),
    Resumed(QuestAttempt),
}

impl StartOutcome {
    pub fn attempt(&self) -> &QuestAttempt {
        match self {
            StartOutcome::Started(attempt) | StartOutcome::Resumed(attempt) => attempt,
        }
    }

    pub fn into_attempt(self) -> QuestAttempt {
        match self {
            StartOutcome::Started(attempt) | StartOutcome::Resumed(attempt) => attempt,
        }
    }

    pub fn is_resumed(&self) -> bool {
        matches!(self, StartOutcome::Resumed(_))
    }
}

/// A question as the student sees it. Built field by field from the
/// authored question, so the answer key has nowhere to go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub quest_id: String,
    pub question_index: i64,
    pub total_questions: i64,
    pub progress: i64,
    pub question: String,
    pub options: Vec<QuestionOption>,
    pub difficulty: Difficulty,
}

impl QuestionView {
    pub fn from_question(attempt: &QuestAttempt, question: &Question) -> Self {
        QuestionView {
            quest_id: attempt.quest_id.clone(),
            question_index: attempt.current_question_index,
            total_questions: attempt.total_questions,
            progress: attempt.progress_percent(),
            question: question.question.clone(),
            options: question.options.clone(),
            difficulty: question.difficulty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub attempt_id: String,
    pub score: i64,
    pub passed: bool,
    pub earned_xp: i64,
    pub earned_coins: i64,
    pub old_level: i64,
    pub new_level: i64,
    pub leveled_up: bool,
    pub new_badges: Vec<UnlockedBadge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Advanced { was_correct: bool, next_index: i64 },
    Completed { was_correct: bool, summary: CompletionSummary },
}

/// Flat wire shape of an answer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub completed: bool,
    pub was_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_index: Option<i64>,
    #[serde(flatten)]
    pub summary: Option<CompletionSummary>,
}

impl From<AnswerOutcome> for SubmitAnswerResponse {
    fn from(outcome: AnswerOutcome) -> Self {
        match outcome {
            AnswerOutcome::Advanced { was_correct, next_index } => SubmitAnswerResponse {
                completed: false,
                was_correct,
                next_index: Some(next_index),
                summary: None,
            },
            AnswerOutcome::Completed { was_correct, summary } => SubmitAnswerResponse {
                completed: true,
                was_correct,
                next_index: None,
                summary: Some(summary),
            },
        }
    }
}
