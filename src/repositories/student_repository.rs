use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    constants::messages,
    db::{Database, STUDENTS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::{RewardDelta, Student, StudentProgress},
};

/// Student aggregate store: the xp / coins / level / badges slice.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Student>>;

    async fn get_progress(&self, student_id: &str) -> AppResult<Option<StudentProgress>>;

    /// Adds the deltas with `$inc` and overwrites the level when given.
    /// Returns the aggregate after the update.
    async fn apply_reward_delta(
        &self,
        student_id: &str,
        delta: RewardDelta,
    ) -> AppResult<StudentProgress>;

    /// Set-add of a badge key on the student document.
    async fn add_badge(&self, student_id: &str, badge_key: &str) -> AppResult<()>;

    /// Active students by xp then coins, both descending, then id ascending.
    async fn top_by_xp(&self, limit: i64) -> AppResult<Vec<Student>>;

    /// 1-based position of the student in the `top_by_xp` ordering. Ties on
    /// xp and coins are split by id, so every position is distinct.
    async fn rank_of(&self, student_id: &str) -> AppResult<Option<i64>>;
}

pub struct MongoStudentRepository {
    collection: Collection<Student>,
}

impl MongoStudentRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(STUDENTS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for students collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let leaderboard_index = IndexModel::builder()
            .keys(doc! { "is_active": 1, "xp": -1, "coins": -1, "id": 1 })
            .options(
                IndexOptions::builder()
                    .name("leaderboard".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(leaderboard_index).await?;

        log::info!("Successfully created indexes for students collection");
        Ok(())
    }
}

#[async_trait]
impl StudentRepository for MongoStudentRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Student>> {
        let student = self.collection.find_one(doc! { "id": id }).await?;
        Ok(student)
    }

    async fn get_progress(&self, student_id: &str) -> AppResult<Option<StudentProgress>> {
        let student = self.find_by_id(student_id).await?;
        Ok(student.map(|s| s.progress()))
    }

    async fn apply_reward_delta(
        &self,
        student_id: &str,
        delta: RewardDelta,
    ) -> AppResult<StudentProgress> {
        let mut update = doc! {
            "$inc": { "xp": delta.xp_delta, "coins": delta.coin_delta }
        };
        if let Some(level) = delta.set_level {
            update.insert("$set", doc! { "level": level });
        }

        let student = self
            .collection
            .find_one_and_update(doc! { "id": student_id }, update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::STUDENT_NOT_FOUND.to_string()))?;

        Ok(student.progress())
    }

    async fn add_badge(&self, student_id: &str, badge_key: &str) -> AppResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "id": student_id },
                doc! { "$addToSet": { "badges": badge_key } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(messages::STUDENT_NOT_FOUND.to_string()));
        }
        Ok(())
    }

    async fn top_by_xp(&self, limit: i64) -> AppResult<Vec<Student>> {
        let students = self
            .collection
            .find(doc! { "is_active": true })
            .sort(doc! { "xp": -1, "coins": -1, "id": 1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(students)
    }

    async fn rank_of(&self, student_id: &str) -> AppResult<Option<i64>> {
        let Some(student) = self.find_by_id(student_id).await? else {
            return Ok(None);
        };

        let ahead = self
            .collection
            .count_documents(doc! {
                "is_active": true,
                "$or": [
                    { "xp": { "$gt": student.xp } },
                    { "xp": student.xp, "coins": { "$gt": student.coins } },
                    { "xp": student.xp, "coins": student.coins, "id": { "$lt": student.id.as_str() } },
                ],
            })
            .await?;

        Ok(Some(ahead as i64 + 1))
    }
}
