pub mod badge_service;
pub mod leaderboard_service;
pub mod progression_service;
pub mod settlement_service;
pub mod subscription_service;

pub use leaderboard_service::LeaderboardService;
pub use progression_service::ProgressionService;
pub use settlement_service::SettlementService;
pub use subscription_service::SubscriptionService;
