use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_document},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::{is_duplicate_key, Database, BADGES_COLLECTION, BADGE_UNLOCKS_COLLECTION},
    errors::AppResult,
    models::domain::{Badge, BadgeUnlock, UnlockOutcome},
};

/// Static catalog of unlockable badges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeRepository: Send + Sync {
    async fn list_active(&self) -> AppResult<Vec<Badge>>;
}

/// Per-student unlock records, unique on (student, badge).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeUnlockRepository: Send + Sync {
    /// Insert-only-on-absent. Reports whether this call created the row.
    async fn upsert_if_absent(
        &self,
        student_id: &str,
        badge_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> AppResult<UnlockOutcome>;

    async fn list_for_student(&self, student_id: &str) -> AppResult<Vec<BadgeUnlock>>;
}

pub struct MongoBadgeRepository {
    collection: Collection<Badge>,
}

impl MongoBadgeRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(BADGES_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for badges collection");

        let key_index = IndexModel::builder()
            .keys(doc! { "key": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("key_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(key_index).await?;

        log::info!("Successfully created indexes for badges collection");
        Ok(())
    }
}

#[async_trait]
impl BadgeRepository for MongoBadgeRepository {
    async fn list_active(&self) -> AppResult<Vec<Badge>> {
        let badges = self
            .collection
            .find(doc! { "is_active": true })
            .await?
            .try_collect()
            .await?;
        Ok(badges)
    }
}

pub struct MongoBadgeUnlockRepository {
    collection: Collection<BadgeUnlock>,
}

impl MongoBadgeUnlockRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(BADGE_UNLOCKS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for student_badges collection");

        let pair_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "badge_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("student_badge_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(pair_index).await?;

        log::info!("Successfully created indexes for student_badges collection");
        Ok(())
    }
}

#[async_trait]
impl BadgeUnlockRepository for MongoBadgeUnlockRepository {
    async fn upsert_if_absent(
        &self,
        student_id: &str,
        badge_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> AppResult<UnlockOutcome> {
        let unlock = BadgeUnlock {
            student_id: student_id.to_string(),
            badge_id: badge_id.to_string(),
            unlocked_at,
        };
        let on_insert = to_document(&unlock)?;

        let result = self
            .collection
            .update_one(
                doc! { "student_id": student_id, "badge_id": badge_id },
                doc! { "$setOnInsert": on_insert },
            )
            .upsert(true)
            .await;

        match result {
            Ok(update) if update.upserted_id.is_some() => Ok(UnlockOutcome::Inserted),
            Ok(_) => Ok(UnlockOutcome::Existing),
            // Two upserts raced on the unique index; the other one inserted.
            Err(err) if is_duplicate_key(&err) => Ok(UnlockOutcome::Existing),
            Err(err) => Err(err.into()),
        }
    }

    async fn list_for_student(&self, student_id: &str) -> AppResult<Vec<BadgeUnlock>> {
        let unlocks = self
            .collection
            .find(doc! { "student_id": student_id })
            .sort(doc! { "unlocked_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(unlocks)
    }
}
