use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_positive_amount;

/// Budget entity: one allocation per (user, category)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub emoji: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Budget as returned to the dashboard, with the derived spend figures.
/// `remaining` is always `total_amount - spent`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BudgetView {
    pub id: Uuid,
    pub category: String,
    pub emoji: String,
    pub total_amount: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// Unclamped percentage so the dashboard can flag overspending
    pub percent_used: i64,
}

/// Request payload for creating a new budget
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "budget_category": "Food",
    "budget_emoji": "🍔",
    "budget_amount": 500
}))]
pub struct CreateBudgetRequest {
    #[validate(length(min = 1, message = "Category is required"))]
    pub budget_category: String,

    pub budget_emoji: String,

    #[validate(custom(function = "validate_positive_amount"))]
    #[schema(minimum = 0.01, example = 500)]
    pub budget_amount: Decimal,
}
