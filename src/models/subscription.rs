use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_positive_amount;

/// Billing cadence for a subscription
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Subscription entity. Termination is bounded by `end_date`,
/// `repeat_count`, or both; whichever bound is hit first wins.
/// `is_active` changes only by explicit user toggle.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub category: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub repeat_count: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a subscription. At least one of
/// `end_date` / `repeat_count` must be supplied.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Netflix Premium",
    "amount": 649,
    "category": "Entertainment",
    "frequency": "monthly",
    "start_date": "2025-01-01",
    "repeat_count": 12
}))]
pub struct CreateSubscriptionRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(custom(function = "validate_positive_amount"))]
    #[schema(minimum = 0.01, example = 649)]
    pub amount: Decimal,

    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,

    pub frequency: Frequency,

    #[schema(format = "date", example = "2025-01-01")]
    pub start_date: NaiveDate,

    #[schema(format = "date", example = "2025-12-31")]
    pub end_date: Option<NaiveDate>,

    #[validate(range(min = 1, message = "Repeat count must be at least 1"))]
    pub repeat_count: Option<i32>,
}

/// Full-field update, keyed by id in the body (the dashboard's edit form
/// sends the whole record back)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "id": "550e8400-e29b-41d4-a716-446655440000",
    "name": "Netflix Premium",
    "amount": 699,
    "is_active": false
}))]
pub struct UpdateSubscriptionRequest {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,

    pub is_active: bool,

    pub end_date: Option<NaiveDate>,

    #[validate(range(min = 1, message = "Repeat count must be at least 1"))]
    pub repeat_count: Option<i32>,
}

/// Read-only projection of a subscription's occurrence schedule
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[schema(example = json!({
    "occurrences": 3,
    "next_due_date": "2025-04-01"
}))]
pub struct OccurrenceProjection {
    /// Occurrences that have come due on or before the as-of date
    pub occurrences: u32,
    /// Next due date, None once the subscription has run out
    pub next_due_date: Option<NaiveDate>,
}
