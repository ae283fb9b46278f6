use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, SUBSCRIPTIONS_COLLECTION},
    errors::AppResult,
    models::domain::Subscription,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// The user's subscription when its status is `active`. Expiry is the
    /// caller's concern.
    async fn find_active(&self, user_id: &str) -> AppResult<Option<Subscription>>;
}

pub struct MongoSubscriptionRepository {
    collection: Collection<Subscription>,
}

impl MongoSubscriptionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(SUBSCRIPTIONS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let options = IndexOptions::builder()
            .unique(true)
            .name("user_id_unique".to_string())
            .build();
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(options)
            .build();

        self.collection.create_index(model).await?;
        log::info!("Created unique index on user_subscriptions.user_id");

        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for MongoSubscriptionRepository {
    async fn find_active(&self, user_id: &str) -> AppResult<Option<Subscription>> {
        let subscription = self
            .collection
            .find_one(doc! { "user_id": user_id, "status": "active" })
            .await?;
        Ok(subscription)
    }
}
