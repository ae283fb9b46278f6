use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::progression::level_for_xp;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub xp: i64,
    #[serde(default = "default_level")]
    pub level: i64,
    #[serde(default)]
    pub coins: i64,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_level() -> i64 {
    1
}

fn default_active() -> bool {
    true
}

impl Student {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Student {
            id: Uuid::new_v4().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            xp: 0,
            level: 1,
            coins: 0,
            badges: Vec::new(),
            is_active: true,
            created_at: Some(Utc::now()),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn progress(&self) -> StudentProgress {
        StudentProgress {
            xp: self.xp,
            coins: self.coins,
            level: self.level,
            badges: self.badges.clone(),
        }
    }
}

/// The gamification slice of a student document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct StudentProgress {
    pub xp: i64,
    pub coins: i64,
    pub level: i64,
    pub badges: Vec<String>,
}

/// Increment applied atomically to the aggregate. `set_level` is a plain
/// overwrite (last write wins).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewardDelta {
    pub xp_delta: i64,
    pub coin_delta: i64,
    pub set_level: Option<i64>,
}

impl RewardDelta {
    /// Delta that adds `xp` and `coins` on top of `current_xp`, with the
    /// level recomputed from the sum.
    pub fn granting(current_xp: i64, xp: i64, coins: i64) -> Self {
        RewardDelta {
            xp_delta: xp,
            coin_delta: coins,
            set_level: Some(level_for_xp(current_xp + xp)),
        }
    }
}

#[cfg(test)]
impl Student {
    pub fn test_student(id: &str, xp: i64) -> Self {
        let mut student = Student::new("Test", "Student", &format!("{}@example.com", id));
        student.id = id.to_string();
        student.xp = xp;
        student.level = level_for_xp(xp);
        student
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_student_has_empty_progress() {
        let student = Student::new("Ada", "Lovelace", "ada@example.com");

        assert_eq!(student.progress(), StudentProgress { level: 1, ..Default::default() });
        assert_eq!(student.full_name(), "Ada Lovelace");
        assert!(student.is_active);
    }

    #[test]
    fn granting_recomputes_level_from_new_total() {
        let delta = RewardDelta::granting(180, 70, 5);

        assert_eq!(delta.xp_delta, 70);
        assert_eq!(delta.coin_delta, 5);
        assert_eq!(delta.set_level, Some(3));
    }

    #[test]
    fn legacy_document_without_progress_fields_deserializes() {
        let json = r#"{
            "id": "s-1",
            "first_name": "Grace",
            "last_name": "Hopper",
            "email": "grace@example.com"
        }"#;

        let student: Student = serde_json::from_str(json).expect("student should deserialize");
        assert_eq!(student.xp, 0);
        assert_eq!(student.level, 1);
        assert!(student.badges.is_empty());
        assert!(student.is_active);
    }
}
