use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::budget::Budget;
use crate::repositories::RepositoryError;

/// Trait defining budget repository operations
#[async_trait]
pub trait BudgetRepository: Send + Sync {
    /// Create a new budget allocation
    async fn create(&self, budget: Budget) -> Result<Budget, RepositoryError>;

    /// All budgets for a user, largest allocation first
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Budget>, RepositoryError>;

    /// Atomically add `delta` to the allocation for (user, category)
    async fn add_amount(
        &self,
        user_id: Uuid,
        category: &str,
        delta: Decimal,
    ) -> Result<Budget, RepositoryError>;
}

/// PostgreSQL implementation of BudgetRepository
pub struct PostgresBudgetRepository {
    pool: PgPool,
}

impl PostgresBudgetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BudgetRepository for PostgresBudgetRepository {
    async fn create(&self, budget: Budget) -> Result<Budget, RepositoryError> {
        let result = sqlx::query_as::<_, Budget>(
            r#"
            INSERT INTO budgets (id, user_id, category, emoji, total_amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, category, emoji, total_amount, created_at
            "#,
        )
        .bind(budget.id)
        .bind(budget.user_id)
        .bind(&budget.category)
        .bind(&budget.emoji)
        .bind(budget.total_amount)
        .bind(budget.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(budget) => Ok(budget),
            Err(sqlx::Error::Database(db_err)) => {
                // One budget per (user, category)
                if db_err.is_unique_violation() {
                    Err(RepositoryError::ConstraintViolation(
                        "Budget category already exists".to_string(),
                    ))
                } else {
                    Err(RepositoryError::DatabaseError(db_err.to_string()))
                }
            }
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Budget>, RepositoryError> {
        sqlx::query_as::<_, Budget>(
            r#"
            SELECT id, user_id, category, emoji, total_amount, created_at
            FROM budgets
            WHERE user_id = $1
            ORDER BY total_amount DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn add_amount(
        &self,
        user_id: Uuid,
        category: &str,
        delta: Decimal,
    ) -> Result<Budget, RepositoryError> {
        let result = sqlx::query_as::<_, Budget>(
            r#"
            UPDATE budgets
            SET total_amount = total_amount + $3
            WHERE user_id = $1 AND category = $2
            RETURNING id, user_id, category, emoji, total_amount, created_at
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(budget)) => Ok(budget),
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
