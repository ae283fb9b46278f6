use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, REWARD_LOGS_COLLECTION},
    errors::AppResult,
    models::domain::RewardLogEntry,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardLogRepository: Send + Sync {
    async fn append(&self, entry: RewardLogEntry) -> AppResult<()>;

    /// Newest first, with the total count for the student.
    async fn list_for_student(
        &self,
        student_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<RewardLogEntry>, i64)>;
}

pub struct MongoRewardLogRepository {
    collection: Collection<RewardLogEntry>,
}

impl MongoRewardLogRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(REWARD_LOGS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for reward_logs collection");

        let student_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("student_created".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(student_index).await?;

        log::info!("Successfully created indexes for reward_logs collection");
        Ok(())
    }
}

#[async_trait]
impl RewardLogRepository for MongoRewardLogRepository {
    async fn append(&self, entry: RewardLogEntry) -> AppResult<()> {
        self.collection.insert_one(&entry).await?;
        Ok(())
    }

    async fn list_for_student(
        &self,
        student_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<RewardLogEntry>, i64)> {
        let filter = doc! { "student_id": student_id };

        let total = self.collection.count_documents(filter.clone()).await?;

        let entries = self
            .collection
            .find(filter)
            .skip(offset as u64)
            .limit(limit)
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;

        Ok((entries, total as i64))
    }
}
