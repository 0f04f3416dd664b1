use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_positive_amount;

/// Income entry: one accumulating row per (user, category)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct IncomeEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub emoji: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Expense entry. Manual entries accumulate per (user, category);
/// subscription-attributed entries carry the originating subscription id
/// and may appear any number of times.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ExpenseEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub emoji: String,
    pub amount: Decimal,
    /// Weak back-reference to the subscription this entry was recorded from
    pub subscription_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a new income entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "income_category": "Salary",
    "income_emoji": "💼",
    "income_amount": 3000
}))]
pub struct CreateIncomeRequest {
    #[validate(length(min = 1, message = "Category is required"))]
    pub income_category: String,

    pub income_emoji: String,

    #[validate(custom(function = "validate_positive_amount"))]
    #[schema(minimum = 0.01, example = 3000)]
    pub income_amount: Decimal,
}

/// Request payload for creating a new expense entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "expense_category": "Food",
    "expense_emoji": "🍔",
    "expense_amount": 450
}))]
pub struct CreateExpenseRequest {
    #[validate(length(min = 1, message = "Category is required"))]
    pub expense_category: String,

    pub expense_emoji: String,

    #[validate(custom(function = "validate_positive_amount"))]
    #[schema(minimum = 0.01, example = 450)]
    pub expense_amount: Decimal,

    /// Present when the expense is recorded from a subscription
    pub subscription_id: Option<Uuid>,
}

/// Additive update: the delta is added to the stored amount for the
/// (user, category) pair. Negative deltas act as corrections.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "amount_to_add": 250
}))]
pub struct AdditiveUpdateRequest {
    pub amount_to_add: Decimal,
}
