use crate::models::domain::{
    Badge, BadgeType, Difficulty, OptionLabel, Quest, QuestAttempt, QuestRewards, Question,
    QuestionOption, Quiz,
};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub const STUDENT_ID: &str = "student-1";
    pub const QUEST_ID: &str = "quest-1";
    pub const QUIZ_ID: &str = "quiz-1";

    /// Published quest worth 50 xp and 10 coins, one attempt allowed.
    pub fn test_quest() -> Quest {
        Quest {
            id: QUEST_ID.to_string(),
            teacher_id: "teacher-1".to_string(),
            title: "Fractions".to_string(),
            description: "Halves, thirds and quarters".to_string(),
            difficulty: Difficulty::Easy,
            time_limit_minutes: 15,
            max_attempts: 1,
            quiz_id: QUIZ_ID.to_string(),
            passing_score: 60,
            rewards: QuestRewards {
                xp_points: 50,
                coins: 10,
                ..Default::default()
            },
            is_published: true,
            created_at: None,
        }
    }

    /// Quiz whose questions cycle through answer keys A, B, C, D.
    pub fn test_quiz(question_count: usize) -> Quiz {
        let questions = (0..question_count)
            .map(|i| test_question(i, OptionLabel::ALL[i % OptionLabel::ALL.len()]))
            .collect();

        Quiz {
            id: QUIZ_ID.to_string(),
            teacher_id: "teacher-1".to_string(),
            quest_id: QUEST_ID.to_string(),
            lesson_id: None,
            title: "Fractions quiz".to_string(),
            questions,
            is_published: true,
            created_at: None,
        }
    }

    pub fn test_question(index: usize, correct_answer: OptionLabel) -> Question {
        Question {
            question: format!("Question {}", index + 1),
            options: OptionLabel::ALL
                .into_iter()
                .map(|label| QuestionOption {
                    label,
                    text: format!("Option {}", label),
                })
                .collect(),
            correct_answer,
            difficulty: Difficulty::Easy,
        }
    }

    pub fn in_progress_attempt(total_questions: i64) -> QuestAttempt {
        QuestAttempt::start(STUDENT_ID, QUEST_ID, QUIZ_ID, total_questions, 1)
    }

    /// Attempt that answered `correct` of `total` right and was completed
    /// but not settled.
    pub fn completed_attempt(correct: i64, total: i64) -> QuestAttempt {
        let mut attempt = in_progress_attempt(total);
        for i in 0..total {
            attempt.record_answer(i < correct);
        }
        attempt.complete(chrono::Utc::now());
        attempt.version = total + 1;
        attempt
    }

    pub fn test_badge(key: &str, badge_type: BadgeType, condition_value: i64) -> Badge {
        Badge {
            id: format!("badge-{}", key.to_lowercase()),
            key: key.to_string(),
            title: key.replace('_', " "),
            description: String::new(),
            icon: None,
            badge_type,
            condition_value,
            is_active: true,
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_quiz_cycles_answer_keys() {
        let quiz = test_quiz(5);
        let keys: Vec<_> = quiz.questions.iter().map(|q| q.correct_answer.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "C", "D", "A"]);
    }

    #[test]
    fn test_fixtures_completed_attempt_is_scored() {
        let attempt = completed_attempt(3, 4);
        assert_eq!(attempt.score, Some(75));
        assert!(attempt.needs_settlement());
    }
}
