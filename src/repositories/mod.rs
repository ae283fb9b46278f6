pub mod badge_repository;
pub mod quest_attempt_repository;
pub mod quest_repository;
pub mod quiz_repository;
pub mod reward_log_repository;
pub mod student_repository;
pub mod subscription_repository;

pub use badge_repository::{
    BadgeRepository, BadgeUnlockRepository, MongoBadgeRepository, MongoBadgeUnlockRepository,
};
pub use quest_attempt_repository::{MongoQuestAttemptRepository, QuestAttemptRepository};
pub use quest_repository::{MongoQuestRepository, QuestRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
pub use reward_log_repository::{MongoRewardLogRepository, RewardLogRepository};
pub use student_repository::{MongoStudentRepository, StudentRepository};
pub use subscription_repository::{MongoSubscriptionRepository, SubscriptionRepository};
