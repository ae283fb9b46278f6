use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, QUESTS_COLLECTION},
    errors::AppResult,
    models::domain::Quest,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quest>>;
}

pub struct MongoQuestRepository {
    collection: Collection<Quest>,
}

impl MongoQuestRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(QUESTS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quests collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;

        log::info!("Successfully created indexes for quests collection");
        Ok(())
    }
}

#[async_trait]
impl QuestRepository for MongoQuestRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quest>> {
        let quest = self.collection.find_one(doc! { "id": id }).await?;
        Ok(quest)
    }
}
