use async_graphql::Enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::progression::rounded_percent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "camelCase")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Failed,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "inProgress",
            AttemptStatus::Completed => "completed",
            AttemptStatus::Failed => "failed",
        }
    }
}

/// Settlement side effects that must not repeat. Each is claimed on the
/// attempt before it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SettlementStep {
    Rewards,
    CompletionLog,
}

impl SettlementStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStep::Rewards => "rewards",
            SettlementStep::CompletionLog => "completionLog",
        }
    }
}

/// One student's run through a quest's quiz (a Progress Ledger row).
///
/// `version` is bumped by every successful save; writers must present the
/// version they read.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestAttempt {
    pub id: String,
    pub student_id: String,
    pub quest_id: String,
    pub quiz_id: String,
    pub status: AttemptStatus,
    pub current_question_index: i64,
    pub correct_answers: i64,
    pub total_questions: i64,
    #[serde(default)]
    pub score: Option<i64>,
    pub attempt_number: i64,
    pub version: i64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub settlement_steps: Vec<SettlementStep>,
    #[serde(default)]
    pub settled_at: Option<DateTime<Utc>>,
}

impl QuestAttempt {
    pub fn start(
        student_id: &str,
        quest_id: &str,
        quiz_id: &str,
        total_questions: i64,
        attempt_number: i64,
    ) -> Self {
        QuestAttempt {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            quest_id: quest_id.to_string(),
            quiz_id: quiz_id.to_string(),
            status: AttemptStatus::InProgress,
            current_question_index: 0,
            correct_answers: 0,
            total_questions,
            score: None,
            attempt_number,
            version: 0,
            started_at: Utc::now(),
            completed_at: None,
            settlement_steps: Vec::new(),
            settled_at: None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == AttemptStatus::InProgress
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_question_index >= self.total_questions
    }

    pub fn progress_percent(&self) -> i64 {
        rounded_percent(self.current_question_index, self.total_questions)
    }

    /// Records one graded answer. Index and tally move together.
    pub fn record_answer(&mut self, correct: bool) {
        if correct {
            self.correct_answers += 1;
        }
        self.current_question_index += 1;
    }

    /// Terminal transition; returns the final score.
    pub fn complete(&mut self, now: DateTime<Utc>) -> i64 {
        let score = rounded_percent(self.correct_answers, self.total_questions);
        self.score = Some(score);
        self.status = AttemptStatus::Completed;
        self.completed_at = Some(now);
        score
    }

    pub fn needs_settlement(&self) -> bool {
        self.status == AttemptStatus::Completed && self.settled_at.is_none()
    }
}
