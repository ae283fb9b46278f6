use chrono::Utc;
use std::sync::Arc;

use crate::{
    constants::messages,
    errors::{AppError, AppResult},
    repositories::SubscriptionRepository,
};

/// Gate in front of the quest endpoints. Disabled gates let everyone in.
pub struct SubscriptionService {
    repository: Arc<dyn SubscriptionRepository>,
    enabled: bool,
}

impl SubscriptionService {
    pub fn new(repository: Arc<dyn SubscriptionRepository>, enabled: bool) -> Self {
        Self { repository, enabled }
    }

    pub async fn ensure_active(&self, user_id: &str) -> AppResult<()> {
        if !self.enabled {
            return Ok(());
        }

        let subscription = self
            .repository
            .find_active(user_id)
            .await?
            .ok_or_else(|| AppError::Forbidden(messages::SUBSCRIPTION_REQUIRED.to_string()))?;

        if subscription.is_expired_at(Utc::now()) {
            log::debug!("Subscription for {} expired at {:?}", user_id, subscription.end_date);
            return Err(AppError::Forbidden(messages::SUBSCRIPTION_EXPIRED.to_string()));
        }

        Ok(())
    }
}
