use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::handlers::{validation_error_response, ErrorResponse};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::dashboard::{CategoryBreakdown, RecentExpense};
use crate::models::ledger::{
    AdditiveUpdateRequest, CreateExpenseRequest, CreateIncomeRequest, ExpenseEntry, IncomeEntry,
};
use crate::services::ledger_service::{LedgerError, LedgerService};

/// Convert LedgerError to HTTP response
impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let (status, error_type, detail) = match self {
            LedgerError::InvalidAmount => (
                StatusCode::BAD_REQUEST,
                "invalid_amount",
                "Amount must be positive",
            ),
            LedgerError::DuplicateCategory => (
                StatusCode::CONFLICT,
                "duplicate_category",
                "An entry for this category already exists",
            ),
            LedgerError::CategoryNotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "No entry exists for this category",
            ),
            LedgerError::NegativeBalance => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Update would drive the amount below zero",
            ),
            LedgerError::SubscriptionNotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "Referenced subscription not found",
            ),
            LedgerError::Unauthorized => (
                StatusCode::FORBIDDEN,
                "unauthorized",
                "Unauthorized to access this entry",
            ),
            LedgerError::DatabaseError(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                msg.as_str(),
            ),
        };

        let error_response = ErrorResponse::new(error_type, detail);
        (status, Json(error_response)).into_response()
    }
}

/// Handler for creating an income entry
#[utoipa::path(
    post,
    path = "/api/create_income",
    request_body = CreateIncomeRequest,
    responses(
        (status = 201, description = "Income successfully created", body = IncomeEntry),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Category already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "ledger"
)]
pub async fn create_income_handler(
    State(ledger_service): State<Arc<dyn LedgerService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateIncomeRequest>,
) -> Result<(StatusCode, Json<IncomeEntry>), Response> {
    // Validate request body
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match ledger_service.create_income(auth_user.user_id, request).await {
        Ok(entry) => Ok((StatusCode::CREATED, Json(entry))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for listing income entries
#[utoipa::path(
    get,
    path = "/api/incomes",
    responses(
        (status = 200, description = "List of income entries", body = Vec<IncomeEntry>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "ledger"
)]
pub async fn list_incomes_handler(
    State(ledger_service): State<Arc<dyn LedgerService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<IncomeEntry>>, Response> {
    match ledger_service.list_incomes(auth_user.user_id).await {
        Ok(entries) => Ok(Json(entries)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the additive income update
///
/// Adds `amount_to_add` to the income entry for the given category.
/// Creation must precede any additive update.
#[utoipa::path(
    put,
    path = "/api/update_income/{category}",
    params(
        ("category" = String, Path, description = "Income category, matched exactly")
    ),
    request_body = AdditiveUpdateRequest,
    responses(
        (status = 200, description = "Income successfully updated", body = IncomeEntry),
        (status = 400, description = "Update would drive the amount below zero", body = ErrorResponse),
        (status = 404, description = "No entry for this category", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "ledger"
)]
pub async fn update_income_handler(
    State(ledger_service): State<Arc<dyn LedgerService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(category): Path<String>,
    Json(request): Json<AdditiveUpdateRequest>,
) -> Result<Json<IncomeEntry>, Response> {
    match ledger_service
        .add_income_amount(auth_user.user_id, &category, request.amount_to_add)
        .await
    {
        Ok(entry) => Ok(Json(entry)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for creating an expense entry
#[utoipa::path(
    post,
    path = "/api/create_expense",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense successfully created", body = ExpenseEntry),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Referenced subscription not found", body = ErrorResponse),
        (status = 409, description = "Category already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "ledger"
)]
pub async fn create_expense_handler(
    State(ledger_service): State<Arc<dyn LedgerService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseEntry>), Response> {
    // Validate request body
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match ledger_service
        .create_expense(auth_user.user_id, request)
        .await
    {
        Ok(entry) => Ok((StatusCode::CREATED, Json(entry))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for listing expense entries
#[utoipa::path(
    get,
    path = "/api/expenses",
    responses(
        (status = 200, description = "List of expense entries", body = Vec<ExpenseEntry>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "ledger"
)]
pub async fn list_expenses_handler(
    State(ledger_service): State<Arc<dyn LedgerService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<ExpenseEntry>>, Response> {
    match ledger_service.list_expenses(auth_user.user_id).await {
        Ok(entries) => Ok(Json(entries)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the additive expense update
#[utoipa::path(
    put,
    path = "/api/update_expense/{category}",
    params(
        ("category" = String, Path, description = "Expense category, matched exactly")
    ),
    request_body = AdditiveUpdateRequest,
    responses(
        (status = 200, description = "Expense successfully updated", body = ExpenseEntry),
        (status = 400, description = "Update would drive the amount below zero", body = ErrorResponse),
        (status = 404, description = "No entry for this category", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "ledger"
)]
pub async fn update_expense_handler(
    State(ledger_service): State<Arc<dyn LedgerService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(category): Path<String>,
    Json(request): Json<AdditiveUpdateRequest>,
) -> Result<Json<ExpenseEntry>, Response> {
    match ledger_service
        .add_expense_amount(auth_user.user_id, &category, request.amount_to_add)
        .await
    {
        Ok(entry) => Ok(Json(entry)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the per-category expense breakdown
#[utoipa::path(
    get,
    path = "/api/expenses/breakdown",
    responses(
        (status = 200, description = "Current-month expenses grouped by category", body = Vec<CategoryBreakdown>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "ledger"
)]
pub async fn expense_breakdown_handler(
    State(ledger_service): State<Arc<dyn LedgerService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<CategoryBreakdown>>, Response> {
    match ledger_service.expense_breakdown(auth_user.user_id).await {
        Ok(breakdown) => Ok(Json(breakdown)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the recent-activity table
#[utoipa::path(
    get,
    path = "/api/dashboard/recent_expenses",
    responses(
        (status = 200, description = "Most recent expenses, newest first", body = Vec<RecentExpense>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "dashboard"
)]
pub async fn recent_expenses_handler(
    State(ledger_service): State<Arc<dyn LedgerService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<RecentExpense>>, Response> {
    match ledger_service.recent_expenses(auth_user.user_id).await {
        Ok(rows) => Ok(Json(rows)),
        Err(e) => Err(e.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    // Service-level mock: handlers only translate between HTTP and the
    // service trait, so a canned service is enough here
    struct CannedLedgerService {
        fail_with: Option<fn() -> LedgerError>,
    }

    impl CannedLedgerService {
        fn ok() -> Self {
            Self { fail_with: None }
        }

        fn failing(error: fn() -> LedgerError) -> Self {
            Self {
                fail_with: Some(error),
            }
        }

        fn entry(user_id: Uuid, category: &str, amount: Decimal) -> IncomeEntry {
            IncomeEntry {
                id: Uuid::new_v4(),
                user_id,
                category: category.to_string(),
                emoji: "💰".to_string(),
                amount,
                created_at: chrono::Utc::now(),
            }
        }
    }

    #[async_trait]
    impl LedgerService for CannedLedgerService {
        async fn create_income(
            &self,
            user_id: Uuid,
            request: CreateIncomeRequest,
        ) -> Result<IncomeEntry, LedgerError> {
            if let Some(error) = self.fail_with {
                return Err(error());
            }
            Ok(Self::entry(
                user_id,
                &request.income_category,
                request.income_amount,
            ))
        }

        async fn list_incomes(&self, _user_id: Uuid) -> Result<Vec<IncomeEntry>, LedgerError> {
            Ok(Vec::new())
        }

        async fn add_income_amount(
            &self,
            user_id: Uuid,
            category: &str,
            delta: Decimal,
        ) -> Result<IncomeEntry, LedgerError> {
            if let Some(error) = self.fail_with {
                return Err(error());
            }
            Ok(Self::entry(user_id, category, delta))
        }

        async fn create_expense(
            &self,
            _user_id: Uuid,
            _request: CreateExpenseRequest,
        ) -> Result<ExpenseEntry, LedgerError> {
            Err(LedgerError::DatabaseError("unused".to_string()))
        }

        async fn list_expenses(&self, _user_id: Uuid) -> Result<Vec<ExpenseEntry>, LedgerError> {
            Ok(Vec::new())
        }

        async fn add_expense_amount(
            &self,
            _user_id: Uuid,
            _category: &str,
            _delta: Decimal,
        ) -> Result<ExpenseEntry, LedgerError> {
            Err(LedgerError::CategoryNotFound)
        }

        async fn expense_breakdown(
            &self,
            _user_id: Uuid,
        ) -> Result<Vec<CategoryBreakdown>, LedgerError> {
            Ok(Vec::new())
        }

        async fn recent_expenses(
            &self,
            _user_id: Uuid,
        ) -> Result<Vec<RecentExpense>, LedgerError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_create_income_handler_success() {
        let service: Arc<dyn LedgerService> = Arc::new(CannedLedgerService::ok());
        let user_id = Uuid::new_v4();

        let result = create_income_handler(
            State(service),
            Extension(AuthenticatedUser { user_id }),
            Json(CreateIncomeRequest {
                income_category: "Salary".to_string(),
                income_emoji: "💼".to_string(),
                income_amount: Decimal::from_str("3000").unwrap(),
            }),
        )
        .await;

        assert!(result.is_ok());
        let (status, Json(entry)) = result.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry.user_id, user_id);
    }

    #[tokio::test]
    async fn test_create_income_handler_validation_error() {
        let service: Arc<dyn LedgerService> = Arc::new(CannedLedgerService::ok());

        let result = create_income_handler(
            State(service),
            Extension(AuthenticatedUser {
                user_id: Uuid::new_v4(),
            }),
            Json(CreateIncomeRequest {
                income_category: "Salary".to_string(),
                income_emoji: "💼".to_string(),
                income_amount: Decimal::from_str("-10").unwrap(),
            }),
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_income_handler_not_found_status() {
        let service: Arc<dyn LedgerService> =
            Arc::new(CannedLedgerService::failing(|| LedgerError::CategoryNotFound));

        let result = update_income_handler(
            State(service),
            Extension(AuthenticatedUser {
                user_id: Uuid::new_v4(),
            }),
            Path("Salary".to_string()),
            Json(AdditiveUpdateRequest {
                amount_to_add: Decimal::from_str("20").unwrap(),
            }),
        )
        .await;

        assert!(result.is_err());
        let response = result.err().unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ledger_error_into_response() {
        assert_eq!(
            LedgerError::InvalidAmount.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LedgerError::DuplicateCategory.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            LedgerError::CategoryNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LedgerError::NegativeBalance.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LedgerError::Unauthorized.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            LedgerError::DatabaseError("down".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
