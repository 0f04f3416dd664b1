use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ledger::ExpenseEntry;
use crate::repositories::RepositoryError;

/// Trait defining expense repository operations
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Create a new expense entry
    async fn create(&self, entry: ExpenseEntry) -> Result<ExpenseEntry, RepositoryError>;

    /// All expense entries for a user, newest first
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<ExpenseEntry>, RepositoryError>;

    /// Expense entries for a user with creation date in [start, end)
    async fn find_by_user_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ExpenseEntry>, RepositoryError>;

    /// Atomically add `delta` to the manual entry for (user, category).
    /// Subscription-attributed rows are never touched by additive updates.
    async fn add_amount(
        &self,
        user_id: Uuid,
        category: &str,
        delta: Decimal,
    ) -> Result<ExpenseEntry, RepositoryError>;
}

/// PostgreSQL implementation of ExpenseRepository
pub struct PostgresExpenseRepository {
    pool: PgPool,
}

impl PostgresExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseRepository for PostgresExpenseRepository {
    async fn create(&self, entry: ExpenseEntry) -> Result<ExpenseEntry, RepositoryError> {
        let result = sqlx::query_as::<_, ExpenseEntry>(
            r#"
            INSERT INTO expenses (id, user_id, category, emoji, amount, subscription_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, category, emoji, amount, subscription_id, created_at
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.category)
        .bind(&entry.emoji)
        .bind(entry.amount)
        .bind(entry.subscription_id)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(entry) => Ok(entry),
            Err(sqlx::Error::Database(db_err)) => {
                // One manual accumulating entry per (user, category)
                if db_err.is_unique_violation() {
                    Err(RepositoryError::ConstraintViolation(
                        "Expense category already exists".to_string(),
                    ))
                } else if db_err.is_foreign_key_violation() {
                    Err(RepositoryError::ConstraintViolation(
                        "Referenced subscription does not exist".to_string(),
                    ))
                } else {
                    Err(RepositoryError::DatabaseError(db_err.to_string()))
                }
            }
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<ExpenseEntry>, RepositoryError> {
        sqlx::query_as::<_, ExpenseEntry>(
            r#"
            SELECT id, user_id, category, emoji, amount, subscription_id, created_at
            FROM expenses
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
    ) -> Result<Vec<ExpenseEntry>, RepositoryError> {
        sqlx::query_as::<_, ExpenseEntry>(
            r#"
            SELECT id, user_id, category, emoji, amount, subscription_id, created_at
            FROM expenses
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
    ) -> Result<ExpenseEntry, RepositoryError> {
        let result = sqlx::query_as::<_, ExpenseEntry>(
            r#"
            UPDATE expenses
            SET amount = amount + $3
            WHERE user_id = $1 AND category = $2 AND subscription_id IS NULL
            RETURNING id, user_id, category, emoji, amount, subscription_id, created_at
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
