#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use questline_server::{
    app_state::{AppState, Repositories},
    auth::{JwtService, UserRole},
    config::Config,
    constants::{messages, progression::level_for_xp},
    db::HealthCheck,
    errors::{AppError, AppResult},
    models::domain::{
        subscription::{SubscriptionPlan, SubscriptionStatus},
        AttemptStatus, Badge, BadgeType, BadgeUnlock, Difficulty, OptionLabel, Quest,
        QuestAttempt, QuestRewards, Question, QuestionOption, Quiz, RewardDelta, RewardLogEntry,
        SettlementStep, Student, StudentProgress, Subscription, UnlockOutcome,
    },
    repositories::{
        BadgeRepository, BadgeUnlockRepository, QuestAttemptRepository, QuestRepository,
        QuizRepository, RewardLogRepository, StudentRepository, SubscriptionRepository,
    },
};

pub const STUDENT_ID: &str = "student-1";
pub const QUEST_ID: &str = "quest-1";
pub const QUIZ_ID: &str = "quiz-1";

// ---------------------------------------------------------------------------
// In-memory stores
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryQuestRepository {
    quests: RwLock<HashMap<String, Quest>>,
}

#[async_trait]
impl QuestRepository for InMemoryQuestRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quest>> {
        Ok(self.quests.read().await.get(id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: RwLock<HashMap<String, Quiz>>,
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        Ok(self.quizzes.read().await.get(id).cloned())
    }
}

/// Mirrors the Mongo store: one in-progress row per pair, CAS on version,
/// claimable settlement steps.
#[derive(Default)]
pub struct InMemoryQuestAttemptRepository {
    attempts: RwLock<HashMap<String, QuestAttempt>>,
}

impl InMemoryQuestAttemptRepository {
    pub async fn all_for(&self, student_id: &str, quest_id: &str) -> Vec<QuestAttempt> {
        let mut rows: Vec<_> = self
            .attempts
            .read()
            .await
            .values()
            .filter(|a| a.student_id == student_id && a.quest_id == quest_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.attempt_number);
        rows
    }

    pub async fn get(&self, id: &str) -> Option<QuestAttempt> {
        self.attempts.read().await.get(id).cloned()
    }
}

#[async_trait]
impl QuestAttemptRepository for InMemoryQuestAttemptRepository {
    async fn find_active(
        &self,
        student_id: &str,
        quest_id: &str,
    ) -> AppResult<Option<QuestAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .find(|a| {
                a.student_id == student_id
                    && a.quest_id == quest_id
                    && a.status == AttemptStatus::InProgress
            })
            .cloned())
    }

    async fn find_unsettled(
        &self,
        student_id: &str,
        quest_id: &str,
    ) -> AppResult<Option<QuestAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .filter(|a| a.student_id == student_id && a.quest_id == quest_id)
            .filter(|a| a.status == AttemptStatus::Completed && a.settled_at.is_none())
            .max_by_key(|a| a.attempt_number)
            .cloned())
    }

    async fn count_attempts(&self, student_id: &str, quest_id: &str) -> AppResult<i64> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .filter(|a| a.student_id == student_id && a.quest_id == quest_id)
            .count() as i64)
    }

    async fn has_completed(&self, student_id: &str, quest_id: &str) -> AppResult<bool> {
        let attempts = self.attempts.read().await;
        Ok(attempts.values().any(|a| {
            a.student_id == student_id
                && a.quest_id == quest_id
                && a.status == AttemptStatus::Completed
        }))
    }

    async fn count_completed(&self, student_id: &str) -> AppResult<i64> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .filter(|a| a.student_id == student_id && a.status == AttemptStatus::Completed)
            .count() as i64)
    }

    async fn create(&self, attempt: QuestAttempt) -> AppResult<QuestAttempt> {
        let mut attempts = self.attempts.write().await;
        let duplicate = attempts.values().any(|a| {
            a.student_id == attempt.student_id
                && a.quest_id == attempt.quest_id
                && a.status == AttemptStatus::InProgress
        });
        if duplicate {
            return Err(AppError::ConcurrentModification(
                messages::ATTEMPT_MODIFIED.to_string(),
            ));
        }
        attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn save(&self, attempt: &QuestAttempt) -> AppResult<QuestAttempt> {
        let mut attempts = self.attempts.write().await;
        let stored = attempts
            .get(&attempt.id)
            .filter(|stored| stored.version == attempt.version)
            .ok_or_else(|| {
                AppError::ConcurrentModification(messages::ATTEMPT_MODIFIED.to_string())
            })?;

        let mut next = attempt.clone();
        next.version = stored.version + 1;
        attempts.insert(next.id.clone(), next.clone());
        Ok(next)
    }

    async fn claim_settlement_step(
        &self,
        attempt_id: &str,
        step: SettlementStep,
    ) -> AppResult<bool> {
        let mut attempts = self.attempts.write().await;
        let Some(attempt) = attempts.get_mut(attempt_id) else {
            return Ok(false);
        };
        if attempt.settlement_steps.contains(&step) {
            return Ok(false);
        }
        attempt.settlement_steps.push(step);
        Ok(true)
    }

    async fn release_settlement_step(
        &self,
        attempt_id: &str,
        step: SettlementStep,
    ) -> AppResult<()> {
        let mut attempts = self.attempts.write().await;
        if let Some(attempt) = attempts.get_mut(attempt_id) {
            attempt.settlement_steps.retain(|s| *s != step);
        }
        Ok(())
    }

    async fn mark_settled(&self, attempt_id: &str, settled_at: DateTime<Utc>) -> AppResult<bool> {
        let mut attempts = self.attempts.write().await;
        match attempts.get_mut(attempt_id) {
            Some(attempt) if attempt.settled_at.is_none() => {
                attempt.settled_at = Some(settled_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryStudentRepository {
    students: RwLock<HashMap<String, Student>>,
    fail_next_delta: AtomicBool,
    fail_next_badge: AtomicBool,
}

impl InMemoryStudentRepository {
    /// Makes the next `add_badge` fail with a storage error.
    pub fn fail_next_badge(&self) {
        self.fail_next_badge.store(true, Ordering::SeqCst);
    }

    /// Makes the next `apply_reward_delta` fail with a storage error.
    pub fn fail_next_delta(&self) {
        self.fail_next_delta.store(true, Ordering::SeqCst);
    }

    pub async fn get(&self, id: &str) -> Option<Student> {
        self.students.read().await.get(id).cloned()
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Student>> {
        Ok(self.students.read().await.get(id).cloned())
    }

    async fn get_progress(&self, student_id: &str) -> AppResult<Option<StudentProgress>> {
        Ok(self
            .students
            .read()
            .await
            .get(student_id)
            .map(Student::progress))
    }

    async fn apply_reward_delta(
        &self,
        student_id: &str,
        delta: RewardDelta,
    ) -> AppResult<StudentProgress> {
        if self.fail_next_delta.swap(false, Ordering::SeqCst) {
            return Err(AppError::DatabaseError("connection reset".to_string()));
        }

        let mut students = self.students.write().await;
        let student = students
            .get_mut(student_id)
            .ok_or_else(|| AppError::NotFound(messages::STUDENT_NOT_FOUND.to_string()))?;
        student.xp += delta.xp_delta;
        student.coins += delta.coin_delta;
        if let Some(level) = delta.set_level {
            student.level = level;
        }
        Ok(student.progress())
    }

    async fn add_badge(&self, student_id: &str, badge_key: &str) -> AppResult<()> {
        if self.fail_next_badge.swap(false, Ordering::SeqCst) {
            return Err(AppError::DatabaseError("connection reset".to_string()));
        }
        let mut students = self.students.write().await;
        let student = students
            .get_mut(student_id)
            .ok_or_else(|| AppError::NotFound(messages::STUDENT_NOT_FOUND.to_string()))?;
        if !student.badges.iter().any(|b| b == badge_key) {
            student.badges.push(badge_key.to_string());
        }
        Ok(())
    }

    async fn top_by_xp(&self, limit: i64) -> AppResult<Vec<Student>> {
        let students = self.students.read().await;
        let mut ranked: Vec<_> = students.values().filter(|s| s.is_active).cloned().collect();
        ranked.sort_by(|a, b| {
            b.xp.cmp(&a.xp)
                .then(b.coins.cmp(&a.coins))
                .then(a.id.cmp(&b.id))
        });
        ranked.truncate(limit.max(0) as usize);
        Ok(ranked)
    }

    async fn rank_of(&self, student_id: &str) -> AppResult<Option<i64>> {
        let students = self.students.read().await;
        let Some(student) = students.get(student_id) else {
            return Ok(None);
        };
        let ahead = students
            .values()
            .filter(|s| s.is_active)
            .filter(|s| {
                s.xp > student.xp
                    || (s.xp == student.xp && s.coins > student.coins)
                    || (s.xp == student.xp && s.coins == student.coins && s.id < student.id)
            })
            .count();
        Ok(Some(ahead as i64 + 1))
    }
}

#[derive(Default)]
pub struct InMemoryBadgeRepository {
    badges: RwLock<Vec<Badge>>,
}

#[async_trait]
impl BadgeRepository for InMemoryBadgeRepository {
    async fn list_active(&self) -> AppResult<Vec<Badge>> {
        Ok(self
            .badges
            .read()
            .await
            .iter()
            .filter(|b| b.is_active)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryBadgeUnlockRepository {
    unlocks: RwLock<Vec<BadgeUnlock>>,
}

#[async_trait]
impl BadgeUnlockRepository for InMemoryBadgeUnlockRepository {
    async fn upsert_if_absent(
        &self,
        student_id: &str,
        badge_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> AppResult<UnlockOutcome> {
        let mut unlocks = self.unlocks.write().await;
        if unlocks
            .iter()
            .any(|u| u.student_id == student_id && u.badge_id == badge_id)
        {
            return Ok(UnlockOutcome::Existing);
        }
        unlocks.push(BadgeUnlock {
            student_id: student_id.to_string(),
            badge_id: badge_id.to_string(),
            unlocked_at,
        });
        Ok(UnlockOutcome::Inserted)
    }

    async fn list_for_student(&self, student_id: &str) -> AppResult<Vec<BadgeUnlock>> {
        Ok(self
            .unlocks
            .read()
            .await
            .iter()
            .filter(|u| u.student_id == student_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryRewardLogRepository {
    entries: RwLock<Vec<RewardLogEntry>>,
    failing: AtomicBool,
}

impl InMemoryRewardLogRepository {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn entries_for(&self, student_id: &str) -> Vec<RewardLogEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RewardLogRepository for InMemoryRewardLogRepository {
    async fn append(&self, entry: RewardLogEntry) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("reward log unavailable".to_string()));
        }
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn list_for_student(
        &self,
        student_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<RewardLogEntry>, i64)> {
        let mut items = self.entries_for(student_id).await;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = items.len() as i64;
        let page = items
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }
}

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: RwLock<HashMap<String, Subscription>>,
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_active(&self, user_id: &str) -> AppResult<Option<Subscription>> {
        Ok(self
            .subscriptions
            .read()
            .await
            .get(user_id)
            .filter(|s| s.status == SubscriptionStatus::Active)
            .cloned())
    }
}

pub struct StubHealth {
    pub healthy: bool,
}

#[async_trait]
impl HealthCheck for StubHealth {
    async fn ping(&self) -> AppResult<()> {
        if self.healthy {
            Ok(())
        } else {
            Err(AppError::DatabaseError("no reachable servers".to_string()))
        }
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Stores {
    pub quests: Arc<InMemoryQuestRepository>,
    pub quizzes: Arc<InMemoryQuizRepository>,
    pub attempts: Arc<InMemoryQuestAttemptRepository>,
    pub students: Arc<InMemoryStudentRepository>,
    pub badges: Arc<InMemoryBadgeRepository>,
    pub unlocks: Arc<InMemoryBadgeUnlockRepository>,
    pub reward_log: Arc<InMemoryRewardLogRepository>,
    pub subscriptions: Arc<InMemorySubscriptionRepository>,
}

impl Stores {
    /// Stores seeded with the default quest, a four-question quiz, one
    /// subscribed student at 60 xp and the FIRST_QUEST badge.
    pub async fn seeded() -> Self {
        let stores = Stores::default();
        stores.add_quest(test_quest()).await;
        stores.add_quiz(test_quiz(QUIZ_ID, 4)).await;
        stores.add_student(test_student(STUDENT_ID, 60)).await;
        stores.add_subscription(STUDENT_ID).await;
        stores
            .add_badge(test_badge("FIRST_QUEST", BadgeType::Quest, 1))
            .await;
        stores
    }

    pub async fn add_quest(&self, quest: Quest) {
        self.quests.quests.write().await.insert(quest.id.clone(), quest);
    }

    pub async fn add_quiz(&self, quiz: Quiz) {
        self.quizzes.quizzes.write().await.insert(quiz.id.clone(), quiz);
    }

    pub async fn add_student(&self, student: Student) {
        self.students
            .students
            .write()
            .await
            .insert(student.id.clone(), student);
    }

    pub async fn add_badge(&self, badge: Badge) {
        self.badges.badges.write().await.push(badge);
    }

    pub async fn add_subscription(&self, user_id: &str) {
        let subscription = Subscription {
            user_id: user_id.to_string(),
            plan: SubscriptionPlan::Pro,
            status: SubscriptionStatus::Active,
            start_date: Some(Utc::now() - Duration::days(1)),
            end_date: Some(Utc::now() + Duration::days(30)),
            cancel_at_period_end: false,
        };
        self.subscriptions
            .subscriptions
            .write()
            .await
            .insert(user_id.to_string(), subscription);
    }

    pub async fn unlocks_for(&self, student_id: &str) -> usize {
        self.unlocks
            .list_for_student(student_id)
            .await
            .map(|rows| rows.len())
            .unwrap_or_default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            quests: self.quests.clone(),
            quizzes: self.quizzes.clone(),
            attempts: self.attempts.clone(),
            students: self.students.clone(),
            badges: self.badges.clone(),
            unlocks: self.unlocks.clone(),
            reward_log: self.reward_log.clone(),
            subscriptions: self.subscriptions.clone(),
        }
    }

    pub fn state(&self) -> AppState {
        self.state_with(Config::test_config(), true)
    }

    pub fn state_with(&self, config: Config, healthy: bool) -> AppState {
        AppState::from_repositories(
            config,
            self.repositories(),
            Arc::new(StubHealth { healthy }),
        )
    }
}

pub fn jwt_service() -> JwtService {
    JwtService::new(&Config::test_config().jwt_secret, 1)
}

pub fn bearer(user_id: &str, role: UserRole) -> String {
    let token = jwt_service()
        .create_token(user_id, &format!("{}@example.com", user_id), role)
        .expect("token");
    format!("Bearer {}", token)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

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

/// Quiz whose answer keys cycle A, B, C, D.
pub fn test_quiz(id: &str, question_count: usize) -> Quiz {
    Quiz {
        id: id.to_string(),
        teacher_id: "teacher-1".to_string(),
        quest_id: QUEST_ID.to_string(),
        lesson_id: None,
        title: "Fractions quiz".to_string(),
        questions: (0..question_count).map(test_question).collect(),
        is_published: true,
        created_at: None,
    }
}

pub fn answer_key(index: usize) -> OptionLabel {
    OptionLabel::ALL[index % OptionLabel::ALL.len()]
}

/// Any label other than the key for `index`.
pub fn wrong_answer(index: usize) -> OptionLabel {
    OptionLabel::ALL[(index + 1) % OptionLabel::ALL.len()]
}

fn test_question(index: usize) -> Question {
    Question {
        question: format!("Question {}", index + 1),
        options: OptionLabel::ALL
            .into_iter()
            .map(|label| QuestionOption {
                label,
                text: format!("Option {}", label),
            })
            .collect(),
        correct_answer: answer_key(index),
        difficulty: Difficulty::Medium,
    }
}

pub fn test_student(id: &str, xp: i64) -> Student {
    let mut student = Student::new("Test", id, &format!("{}@example.com", id));
    student.id = id.to_string();
    student.xp = xp;
    student.level = level_for_xp(xp);
    student
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
