use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::subscription::Subscription;
use crate::repositories::RepositoryError;

/// Trait defining subscription repository operations
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Create a new subscription
    async fn create(&self, subscription: Subscription) -> Result<Subscription, RepositoryError>;

    /// All subscriptions for a user, newest first
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, RepositoryError>;

    /// Find a subscription by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>, RepositoryError>;

    /// Persist a full-field update
    async fn update(&self, subscription: Subscription) -> Result<Subscription, RepositoryError>;
}

/// PostgreSQL implementation of SubscriptionRepository
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn create(&self, subscription: Subscription) -> Result<Subscription, RepositoryError> {
        sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (
                id, user_id, name, amount, category, frequency,
                start_date, end_date, repeat_count, is_active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, user_id, name, amount, category, frequency,
                      start_date, end_date, repeat_count, is_active, created_at
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.user_id)
        .bind(&subscription.name)
        .bind(subscription.amount)
        .bind(&subscription.category)
        .bind(subscription.frequency)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.repeat_count)
        .bind(subscription.is_active)
        .bind(subscription.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, RepositoryError> {
        sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, user_id, name, amount, category, frequency,
                   start_date, end_date, repeat_count, is_active, created_at
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>, RepositoryError> {
        sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, user_id, name, amount, category, frequency,
                   start_date, end_date, repeat_count, is_active, created_at
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn update(&self, subscription: Subscription) -> Result<Subscription, RepositoryError> {
        sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions
            SET name = $2,
                amount = $3,
                is_active = $4,
                end_date = $5,
                repeat_count = $6
            WHERE id = $1
            RETURNING id, user_id, name, amount, category, frequency,
                      start_date, end_date, repeat_count, is_active, created_at
            "#,
        )
        .bind(subscription.id)
        .bind(&subscription.name)
        .bind(subscription.amount)
        .bind(subscription.is_active)
        .bind(subscription.end_date)
        .bind(subscription.repeat_count)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?
        .ok_or(RepositoryError::NotFound)
    }
}
