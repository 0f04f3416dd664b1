use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{CreateUserRequest, GoalSnapshot, User};
use crate::repositories::RepositoryError;

/// Trait defining user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(
        &self,
        user: CreateUserRequest,
        password_hash: String,
        avatar: String,
    ) -> Result<User, RepositoryError>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// Update the user's income/savings goals; None keeps the stored value
    async fn update_goals(
        &self,
        id: Uuid,
        income_goal: Option<Decimal>,
        savings_goal: Option<Decimal>,
    ) -> Result<User, RepositoryError>;

    /// Record the goals in force for a given month, replacing any earlier
    /// snapshot for that month
    async fn upsert_goal_snapshot(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
        income_goal: Option<Decimal>,
        savings_goal: Option<Decimal>,
    ) -> Result<(), RepositoryError>;

    /// Goals that were in force for a given month, if a snapshot exists
    async fn find_goal_snapshot(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Option<GoalSnapshot>, RepositoryError>;
}

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(
        &self,
        user: CreateUserRequest,
        password_hash: String,
        avatar: String,
    ) -> Result<User, RepositoryError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, avatar, income_goal, savings_goal)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, password_hash, avatar, income_goal, savings_goal, join_date
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&password_hash)
        .bind(&avatar)
        .bind(user.income_goal)
        .bind(user.savings_goal)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) => {
                // Unique constraint violation means a duplicate email
                if db_err.is_unique_violation() {
                    Err(RepositoryError::ConstraintViolation(
                        "Email already exists".to_string(),
                    ))
                } else {
                    Err(RepositoryError::DatabaseError(db_err.to_string()))
                }
            }
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, avatar, income_goal, savings_goal, join_date
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, avatar, income_goal, savings_goal, join_date
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn update_goals(
        &self,
        id: Uuid,
        income_goal: Option<Decimal>,
        savings_goal: Option<Decimal>,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET income_goal = COALESCE($2, income_goal),
                savings_goal = COALESCE($3, savings_goal)
            WHERE id = $1
            RETURNING id, name, email, password_hash, avatar, income_goal, savings_goal, join_date
            "#,
        )
        .bind(id)
        .bind(income_goal)
        .bind(savings_goal)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?
        .ok_or(RepositoryError::NotFound)
    }

    async fn upsert_goal_snapshot(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
        income_goal: Option<Decimal>,
        savings_goal: Option<Decimal>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO goal_snapshots (user_id, year, month, income_goal, savings_goal)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, year, month)
            DO UPDATE SET income_goal = EXCLUDED.income_goal,
                          savings_goal = EXCLUDED.savings_goal
            "#,
        )
        .bind(user_id)
        .bind(year)
        .bind(month as i32)
        .bind(income_goal)
        .bind(savings_goal)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_goal_snapshot(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Option<GoalSnapshot>, RepositoryError> {
        sqlx::query_as::<_, GoalSnapshot>(
            r#"
            SELECT income_goal, savings_goal
            FROM goal_snapshots
            WHERE user_id = $1 AND year = $2 AND month = $3
            "#,
        )
        .bind(user_id)
        .bind(year)
        .bind(month as i32)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }
}
