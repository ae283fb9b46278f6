use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Ordered multiple-choice quiz. Question order is the index the attempt
/// pointer walks.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub teacher_id: String,
    pub quest_id: String,
    #[serde(default)]
    pub lesson_id: Option<String>,
    pub title: String,
    pub questions: Vec<Question>,
    #[serde(default = "default_published")]
    pub is_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_published() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<QuestionOption>,
    pub correct_answer: OptionLabel,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct QuestionOption {
    pub label: OptionLabel,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, Enum)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Labels match exactly as authored; "a" is not "A".
impl FromStr for OptionLabel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        OptionLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == value)
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "selectedOption must be one of A, B, C, D (got '{}')",
                    value
                ))
            })
    }
}

impl Question {
    pub fn is_correct(&self, selected: OptionLabel) -> bool {
        self.correct_answer == selected
    }
}

impl Quiz {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn question_at(&self, index: i64) -> Option<&Question> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.questions.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: OptionLabel) -> Question {
        Question {
            question: "2 + 2 = ?".to_string(),
            options: vec![
                QuestionOption { label: OptionLabel::A, text: "3".to_string() },
                QuestionOption { label: OptionLabel::B, text: "4".to_string() },
                QuestionOption { label: OptionLabel::C, text: "5".to_string() },
                QuestionOption { label: OptionLabel::D, text: "22".to_string() },
            ],
            correct_answer: correct,
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn option_label_parses_exact_labels() {
        assert_eq!("A".parse::<OptionLabel>().unwrap(), OptionLabel::A);
        assert_eq!("D".parse::<OptionLabel>().unwrap(), OptionLabel::D);
    }

    #[test]
    fn option_label_is_case_sensitive() {
        assert!(matches!(
            "b".parse::<OptionLabel>(),
            Err(AppError::ValidationError(_))
        ));
        assert!("E".parse::<OptionLabel>().is_err());
        assert!("".parse::<OptionLabel>().is_err());
    }

    #[test]
    fn grading_matches_only_the_authored_label() {
        let q = question(OptionLabel::B);
        assert!(q.is_correct(OptionLabel::B));
        assert!(!q.is_correct(OptionLabel::A));
    }

    #[test]
    fn question_at_rejects_out_of_range_and_negative_indexes() {
        let quiz = Quiz {
            id: "quiz-1".to_string(),
            teacher_id: "teacher-1".to_string(),
            quest_id: "quest-1".to_string(),
            lesson_id: None,
            title: "Arithmetic".to_string(),
            questions: vec![question(OptionLabel::B)],
            is_published: true,
            created_at: None,
        };

        assert!(quiz.question_at(0).is_some());
        assert!(quiz.question_at(1).is_none());
        assert!(quiz.question_at(-1).is_none());
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&Difficulty::Medium).expect("serialize");
        assert_eq!(json, "\"medium\"");
    }
}
