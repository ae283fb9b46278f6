use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    constants::messages,
    db::{is_duplicate_key, Database, QUEST_ATTEMPTS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::{AttemptStatus, QuestAttempt, SettlementStep},
};

/// The Progress Ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestAttemptRepository: Send + Sync {
    /// The in-progress attempt for the pair, if any.
    async fn find_active(&self, student_id: &str, quest_id: &str)
        -> AppResult<Option<QuestAttempt>>;

    /// Newest completed attempt for the pair that has not been settled.
    async fn find_unsettled(&self, student_id: &str, quest_id: &str)
        -> AppResult<Option<QuestAttempt>>;

    /// All attempts for the pair, terminal ones included.
    async fn count_attempts(&self, student_id: &str, quest_id: &str) -> AppResult<i64>;

    /// Whether the student has finished the quest at least once.
    async fn has_completed(&self, student_id: &str, quest_id: &str) -> AppResult<bool>;

    /// Completed attempts for the student across every quest.
    async fn count_completed(&self, student_id: &str) -> AppResult<i64>;

    /// Inserts a new attempt. A second in-progress attempt for the same pair
    /// is rejected with `ConcurrentModification`.
    async fn create(&self, attempt: QuestAttempt) -> AppResult<QuestAttempt>;

    /// Compare-and-swap on `(id, version)`. Returns the stored attempt with
    /// its version bumped; a stale version yields `ConcurrentModification`.
    async fn save(&self, attempt: &QuestAttempt) -> AppResult<QuestAttempt>;

    /// Records `step` on the attempt unless it is already there. True means
    /// this caller owns the step and must perform it.
    async fn claim_settlement_step(&self, attempt_id: &str, step: SettlementStep)
        -> AppResult<bool>;

    /// Gives a claimed step back after its side effect failed, so a retry
    /// can run it again.
    async fn release_settlement_step(&self, attempt_id: &str, step: SettlementStep)
        -> AppResult<()>;

    /// Marks settlement done. Idempotent: a second call changes nothing and
    /// returns false.
    async fn mark_settled(&self, attempt_id: &str, settled_at: DateTime<Utc>) -> AppResult<bool>;
}

pub struct MongoQuestAttemptRepository {
    collection: Collection<QuestAttempt>,
}

impl MongoQuestAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(QUEST_ATTEMPTS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for student_quests collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        // At most one in-progress attempt per (student, quest).
        let active_pair_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "quest_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(
                        doc! { "status": AttemptStatus::InProgress.as_str() },
                    )
                    .name("student_quest_active_unique".to_string())
                    .build(),
            )
            .build();

        let student_status_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("student_status".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(active_pair_index).await?;
        self.collection.create_index(student_status_index).await?;

        log::info!("Successfully created indexes for student_quests collection");
        Ok(())
    }
}

#[async_trait]
impl QuestAttemptRepository for MongoQuestAttemptRepository {
    async fn find_active(
        &self,
        student_id: &str,
        quest_id: &str,
    ) -> AppResult<Option<QuestAttempt>> {
        let attempt = self
            .collection
            .find_one(doc! {
                "student_id": student_id,
                "quest_id": quest_id,
                "status": AttemptStatus::InProgress.as_str(),
            })
            .await?;
        Ok(attempt)
    }

    async fn find_unsettled(
        &self,
        student_id: &str,
        quest_id: &str,
    ) -> AppResult<Option<QuestAttempt>> {
        // `settled_at: null` also matches documents without the field.
        let attempt = self
            .collection
            .find_one(doc! {
                "student_id": student_id,
                "quest_id": quest_id,
                "status": AttemptStatus::Completed.as_str(),
                "settled_at": null,
            })
            .sort(doc! { "attempt_number": -1 })
            .await?;
        Ok(attempt)
    }

    async fn count_attempts(&self, student_id: &str, quest_id: &str) -> AppResult<i64> {
        let count = self
            .collection
            .count_documents(doc! {
                "student_id": student_id,
                "quest_id": quest_id,
            })
            .await?;
        Ok(count as i64)
    }

    async fn has_completed(&self, student_id: &str, quest_id: &str) -> AppResult<bool> {
        let count = self
            .collection
            .count_documents(doc! {
                "student_id": student_id,
                "quest_id": quest_id,
                "status": AttemptStatus::Completed.as_str(),
            })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    async fn count_completed(&self, student_id: &str) -> AppResult<i64> {
        let count = self
            .collection
            .count_documents(doc! {
                "student_id": student_id,
                "status": AttemptStatus::Completed.as_str(),
            })
            .await?;
        Ok(count as i64)
    }

    async fn create(&self, attempt: QuestAttempt) -> AppResult<QuestAttempt> {
        match self.collection.insert_one(&attempt).await {
            Ok(_) => Ok(attempt),
            Err(err) if is_duplicate_key(&err) => {
                log::warn!(
                    "Duplicate in-progress attempt for student {} on quest {}",
                    attempt.student_id,
                    attempt.quest_id
                );
                Err(AppError::ConcurrentModification(
                    messages::ATTEMPT_MODIFIED.to_string(),
                ))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, attempt: &QuestAttempt) -> AppResult<QuestAttempt> {
        let mut next = attempt.clone();
        next.version += 1;

        let result = self
            .collection
            .replace_one(
                doc! { "id": &attempt.id, "version": attempt.version },
                &next,
            )
            .await?;

        if result.matched_count == 0 {
            log::warn!(
                "Version conflict saving attempt {} at version {}",
                attempt.id,
                attempt.version
            );
            return Err(AppError::ConcurrentModification(
                messages::ATTEMPT_MODIFIED.to_string(),
            ));
        }

        Ok(next)
    }

    async fn claim_settlement_step(
        &self,
        attempt_id: &str,
        step: SettlementStep,
    ) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "id": attempt_id, "settlement_steps": { "$ne": step.as_str() } },
                doc! { "$push": { "settlement_steps": step.as_str() } },
            )
            .await?;
        Ok(result.modified_count == 1)
    }

    async fn release_settlement_step(
        &self,
        attempt_id: &str,
        step: SettlementStep,
    ) -> AppResult<()> {
        self.collection
            .update_one(
                doc! { "id": attempt_id },
                doc! { "$pull": { "settlement_steps": step.as_str() } },
            )
            .await?;
        Ok(())
    }

    async fn mark_settled(&self, attempt_id: &str, settled_at: DateTime<Utc>) -> AppResult<bool> {
        let settled_at = mongodb::bson::to_bson(&settled_at)?;
        let result = self
            .collection
            .update_one(
                doc! { "id": attempt_id, "settled_at": null },
                doc! { "$set": { "settled_at": settled_at } },
            )
            .await?;
        Ok(result.modified_count == 1)
    }
}
