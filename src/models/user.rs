use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_non_negative_amount;

/// User entity representing a registered user in the system
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Single-character avatar fallback shown by the dashboard
    pub avatar: String,
    /// Monthly income target; None until the user sets one
    pub income_goal: Option<Decimal>,
    /// Monthly savings target; None until the user sets one
    pub savings_goal: Option<Decimal>,
    pub join_date: DateTime<Utc>,
}

/// Goals that were in force for a specific reporting month. Written when
/// goals change so past-period reports are not rewritten by later edits.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct GoalSnapshot {
    pub income_goal: Option<Decimal>,
    pub savings_goal: Option<Decimal>,
}

/// Public profile shape returned by GET /auth/profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub join_date: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            join_date: user.join_date,
        }
    }
}

/// Request payload for user registration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "John Doe",
    "email": "john.doe@example.com",
    "password": "securepassword123",
    "income_goal": 50000,
    "savings_goal": 20000
}))]
pub struct CreateUserRequest {
    #[validate(length(
        min = 3,
        max = 100,
        message = "Name must be between 3 and 100 characters"
    ))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(custom(function = "validate_non_negative_amount"))]
    pub income_goal: Option<Decimal>,

    #[validate(custom(function = "validate_non_negative_amount"))]
    pub savings_goal: Option<Decimal>,
}

/// Request payload for updating income/savings goals
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "income_goal": 60000,
    "savings_goal": 25000
}))]
pub struct UpdateGoalsRequest {
    #[validate(custom(function = "validate_non_negative_amount"))]
    pub income_goal: Option<Decimal>,

    #[validate(custom(function = "validate_non_negative_amount"))]
    pub savings_goal: Option<Decimal>,
}
