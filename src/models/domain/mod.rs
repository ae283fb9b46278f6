pub mod badge;
pub mod quest;
pub mod quest_attempt;
pub mod quiz;
pub mod reward_log;
pub mod student;
pub mod subscription;
pub use badge::{Badge, BadgeType, BadgeUnlock, UnlockOutcome, UnlockedBadge};
pub use quest::{Quest, QuestRewards};
pub use quest_attempt::{AttemptStatus, QuestAttempt, SettlementStep};
pub use quiz::{Difficulty, OptionLabel, Question, QuestionOption, Quiz};
pub use reward_log::{RewardLogEntry, RewardType};
pub use student::{RewardDelta, Student, StudentProgress};
pub use subscription::Subscription;
