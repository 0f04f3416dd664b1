use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::aggregation;
use crate::models::subscription::{
    CreateSubscriptionRequest, OccurrenceProjection, Subscription, UpdateSubscriptionRequest,
};
use crate::repositories::{RepositoryError, SubscriptionRepository};

/// Subscription service errors
#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("Invalid amount: amount must be positive")]
    InvalidAmount,

    #[error("Either an end date or a repeat count must be provided")]
    MissingTermination,

    #[error("Subscription not found")]
    SubscriptionNotFound,

    #[error("Unauthorized to access this subscription")]
    Unauthorized,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for SubscriptionError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => SubscriptionError::SubscriptionNotFound,
            RepositoryError::DatabaseError(msg) => SubscriptionError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => SubscriptionError::DatabaseError(msg),
        }
    }
}

/// Trait defining subscription service operations
#[async_trait]
pub trait SubscriptionService: Send + Sync {
    /// Create a new subscription
    async fn create_subscription(
        &self,
        user_id: Uuid,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError>;

    /// All subscriptions for a user
    async fn list_subscriptions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Subscription>, SubscriptionError>;

    /// Full-field update, keyed by id in the request body
    async fn update_subscription(
        &self,
        user_id: Uuid,
        request: UpdateSubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError>;

    /// Occurrence schedule of one subscription as of today
    async fn project_occurrences(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
    ) -> Result<OccurrenceProjection, SubscriptionError>;
}

/// Implementation of SubscriptionService
pub struct SubscriptionServiceImpl {
    subscription_repository: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionServiceImpl {
    pub fn new(subscription_repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self {
            subscription_repository,
        }
    }

    /// Fetch a subscription and verify the caller owns it
    async fn owned_subscription(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
    ) -> Result<Subscription, SubscriptionError> {
        let subscription = self
            .subscription_repository
            .find_by_id(subscription_id)
            .await?
            .ok_or(SubscriptionError::SubscriptionNotFound)?;

        if subscription.user_id != user_id {
            return Err(SubscriptionError::Unauthorized);
        }
        Ok(subscription)
    }
}

#[async_trait]
impl SubscriptionService for SubscriptionServiceImpl {
    async fn create_subscription(
        &self,
        user_id: Uuid,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError> {
        if request.amount <= Decimal::ZERO {
            return Err(SubscriptionError::InvalidAmount);
        }

        // The subscription must be bounded one way or the other; both
        // bounds together are tolerated and the earlier one wins
        if request.end_date.is_none() && request.repeat_count.is_none() {
            return Err(SubscriptionError::MissingTermination);
        }

        let subscription = Subscription {
            id: Uuid::new_v4(),
            user_id,
            name: request.name,
            amount: request.amount,
            category: request.category,
            frequency: request.frequency,
            start_date: request.start_date,
            end_date: request.end_date,
            repeat_count: request.repeat_count,
            is_active: true,
            created_at: Utc::now(),
        };

        Ok(self.subscription_repository.create(subscription).await?)
    }

    async fn list_subscriptions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Subscription>, SubscriptionError> {
        Ok(self.subscription_repository.find_by_user(user_id).await?)
    }

    async fn update_subscription(
        &self,
        user_id: Uuid,
        request: UpdateSubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError> {
        if request.amount <= Decimal::ZERO {
            return Err(SubscriptionError::InvalidAmount);
        }

        let existing = self.owned_subscription(user_id, request.id).await?;

        // end_date/repeat_count fall back to the stored values when the
        // edit form omits them; dropping both bounds is not allowed
        let end_date = request.end_date.or(existing.end_date);
        let repeat_count = request.repeat_count.or(existing.repeat_count);
        if end_date.is_none() && repeat_count.is_none() {
            return Err(SubscriptionError::MissingTermination);
        }

        let updated = Subscription {
            id: existing.id,
            user_id: existing.user_id,
            name: request.name,
            amount: request.amount,
            category: existing.category,
            frequency: existing.frequency,
            start_date: existing.start_date,
            end_date,
            repeat_count,
            is_active: request.is_active,
            created_at: existing.created_at,
        };

        Ok(self.subscription_repository.update(updated).await?)
    }

    async fn project_occurrences(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
    ) -> Result<OccurrenceProjection, SubscriptionError> {
        let subscription = self.owned_subscription(user_id, subscription_id).await?;
        Ok(aggregation::project_occurrences(
            &subscription,
            Utc::now().date_naive(),
        ))
    }
}
