use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ledger::IncomeEntry;
use crate::repositories::RepositoryError;

/// Trait defining income repository operations
#[async_trait]
pub trait IncomeRepository: Send + Sync {
    /// Create a new income entry
    async fn create(&self, entry: IncomeEntry) -> Result<IncomeEntry, RepositoryError>;

    /// All income entries for a user, newest first
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<IncomeEntry>, RepositoryError>;

    /// Income entries for a user with creation date in [start, end)
    async fn find_by_user_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<IncomeEntry>, RepositoryError>;

    /// Atomically add `delta` to the entry for (user, category).
    /// The read-modify-write happens inside the database; concurrent
    /// updates to the same key serialize on the row lock.
    async fn add_amount(
        &self,
        user_id: Uuid,
        category: &str,
        delta: Decimal,
    ) -> Result<IncomeEntry, RepositoryError>;
}

/// PostgreSQL implementation of IncomeRepository
pub struct PostgresIncomeRepository {
    pool: PgPool,
}

impl PostgresIncomeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IncomeRepository for PostgresIncomeRepository {
    async fn create(&self, entry: IncomeEntry) -> Result<IncomeEntry, RepositoryError> {
        let result = sqlx::query_as::<_, IncomeEntry>(
            r#"
            INSERT INTO incomes (id, user_id, category, emoji, amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, category, emoji, amount, created_at
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.category)
        .bind(&entry.emoji)
        .bind(entry.amount)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(entry) => Ok(entry),
            Err(sqlx::Error::Database(db_err)) => {
                // One accumulating entry per (user, category)
                if db_err.is_unique_violation() {
                    Err(RepositoryError::ConstraintViolation(
                        "Income category already exists".to_string(),
                    ))
                } else {
                    Err(RepositoryError::DatabaseError(db_err.to_string()))
                }
            }
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<IncomeEntry>, RepositoryError> {
        sqlx::query_as::<_, IncomeEntry>(
            r#"
            SELECT id, user_id, category, emoji, amount, created_at
            FROM incomes
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_by_user_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<IncomeEntry>, RepositoryError> {
        sqlx::query_as::<_, IncomeEntry>(
            r#"
            SELECT id, user_id, category, emoji, amount, created_at
            FROM incomes
            WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn add_amount(
        &self,
        user_id: Uuid,
        category: &str,
        delta: Decimal,
    ) -> Result<IncomeEntry, RepositoryError> {
        let result = sqlx::query_as::<_, IncomeEntry>(
            r#"
            UPDATE incomes
            SET amount = amount + $3
            WHERE user_id = $1 AND category = $2
            RETURNING id, user_id, category, emoji, amount, created_at
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(entry)) => Ok(entry),
            Ok(None) => Err(RepositoryError::NotFound),
            Err(sqlx::Error::Database(db_err)) => {
                // A negative delta drove the amount below zero
                if db_err.is_check_violation() {
                    Err(RepositoryError::ConstraintViolation(
                        "Amount cannot go below zero".to_string(),
                    ))
                } else {
                    Err(RepositoryError::DatabaseError(db_err.to_string()))
                }
            }
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }
}
