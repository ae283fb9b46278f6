use std::sync::Arc;

use crate::{
    config::Config,
    db::{Database, HealthCheck},
    errors::AppResult,
    repositories::{
        BadgeRepository, BadgeUnlockRepository, MongoBadgeRepository, MongoBadgeUnlockRepository,
        MongoQuestAttemptRepository, MongoQuestRepository, MongoQuizRepository,
        MongoRewardLogRepository, MongoStudentRepository, MongoSubscriptionRepository,
        QuestAttemptRepository, QuestRepository, QuizRepository, RewardLogRepository,
        StudentRepository, SubscriptionRepository,
    },
    services::{LeaderboardService, ProgressionService, SettlementService, SubscriptionService},
};

/// Every store the services need, behind their traits.
#[derive(Clone)]
pub struct Repositories {
    pub quests: Arc<dyn QuestRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub attempts: Arc<dyn QuestAttemptRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub badges: Arc<dyn BadgeRepository>,
    pub unlocks: Arc<dyn BadgeUnlockRepository>,
    pub reward_log: Arc<dyn RewardLogRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub progression_service: Arc<ProgressionService>,
    pub leaderboard_service: Arc<LeaderboardService>,
    pub subscription_service: Arc<SubscriptionService>,
    pub health: Arc<dyn HealthCheck>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quests = Arc::new(MongoQuestRepository::new(&db));
        quests.ensure_indexes().await?;
        let quizzes = Arc::new(MongoQuizRepository::new(&db));
        quizzes.ensure_indexes().await?;
        let attempts = Arc::new(MongoQuestAttemptRepository::new(&db));
        attempts.ensure_indexes().await?;
        let students = Arc::new(MongoStudentRepository::new(&db));
        students.ensure_indexes().await?;
        let badges = Arc::new(MongoBadgeRepository::new(&db));
        badges.ensure_indexes().await?;
        let unlocks = Arc::new(MongoBadgeUnlockRepository::new(&db));
        unlocks.ensure_indexes().await?;
        let reward_log = Arc::new(MongoRewardLogRepository::new(&db));
        reward_log.ensure_indexes().await?;
        let subscriptions = Arc::new(MongoSubscriptionRepository::new(&db));
        subscriptions.ensure_indexes().await?;

        let repositories = Repositories {
            quests,
            quizzes,
            attempts,
            students,
            badges,
            unlocks,
            reward_log,
            subscriptions,
        };

        Ok(Self::from_repositories(config, repositories, Arc::new(db)))
    }

    pub fn from_repositories(
        config: Config,
        repositories: Repositories,
        health: Arc<dyn HealthCheck>,
    ) -> Self {
        let Repositories {
            quests,
            quizzes,
            attempts,
            students,
            badges,
            unlocks,
            reward_log,
            subscriptions,
        } = repositories;

        let settlement = Arc::new(SettlementService::new(
            quests.clone(),
            attempts.clone(),
            students.clone(),
            badges,
            unlocks,
            reward_log.clone(),
        ));
        let progression_service = Arc::new(ProgressionService::new(
            quests,
            quizzes,
            attempts,
            students.clone(),
            reward_log.clone(),
            settlement,
        ));
        let leaderboard_service = Arc::new(LeaderboardService::new(
            students,
            reward_log,
            config.leaderboard_default_limit,
        ));
        let subscription_service = Arc::new(SubscriptionService::new(
            subscriptions,
            config.subscription_gate_enabled,
        ));

        Self {
            progression_service,
            leaderboard_service,
            subscription_service,
            health,
            config: Arc::new(config),
        }
    }
}
