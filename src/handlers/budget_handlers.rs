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
use crate::models::budget::{Budget, BudgetView, CreateBudgetRequest};
use crate::models::ledger::AdditiveUpdateRequest;
use crate::services::budget_service::{BudgetError, BudgetService};

/// Convert BudgetError to HTTP response
impl IntoResponse for BudgetError {
    fn into_response(self) -> Response {
        let (status, error_type, detail) = match self {
            BudgetError::InvalidAmount => (
                StatusCode::BAD_REQUEST,
                "invalid_amount",
                "Amount must be positive",
            ),
            BudgetError::DuplicateCategory => (
                StatusCode::CONFLICT,
                "duplicate_category",
                "A budget for this category already exists",
            ),
            BudgetError::CategoryNotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "No budget exists for this category",
            ),
            BudgetError::NegativeBalance => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Update would drive the amount below zero",
            ),
            BudgetError::DatabaseError(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                msg.as_str(),
            ),
        };

        let error_response = ErrorResponse::new(error_type, detail);
        (status, Json(error_response)).into_response()
    }
}

/// Handler for creating a budget
#[utoipa::path(
    post,
    path = "/api/create_budget",
    request_body = CreateBudgetRequest,
    responses(
        (status = 201, description = "Budget successfully created", body = Budget),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Category already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "budgets"
)]
pub async fn create_budget_handler(
    State(budget_service): State<Arc<dyn BudgetService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<Budget>), Response> {
    // Validate request body
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match budget_service.create_budget(auth_user.user_id, request).await {
        Ok(budget) => Ok((StatusCode::CREATED, Json(budget))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for listing budgets with derived spend figures
#[utoipa::path(
    get,
    path = "/api/budgets",
    responses(
        (status = 200, description = "Budgets with spent/remaining figures", body = Vec<BudgetView>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "budgets"
)]
pub async fn list_budgets_handler(
    State(budget_service): State<Arc<dyn BudgetService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<BudgetView>>, Response> {
    match budget_service.list_budgets(auth_user.user_id).await {
        Ok(views) => Ok(Json(views)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the additive budget update
#[utoipa::path(
    put,
    path = "/api/update_budget/{category}",
    params(
        ("category" = String, Path, description = "Budget category, matched exactly")
    ),
    request_body = AdditiveUpdateRequest,
    responses(
        (status = 200, description = "Budget successfully updated", body = Budget),
        (status = 400, description = "Update would drive the amount below zero", body = ErrorResponse),
        (status = 404, description = "No budget for this category", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "budgets"
)]
pub async fn update_budget_handler(
    State(budget_service): State<Arc<dyn BudgetService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(category): Path<String>,
    Json(request): Json<AdditiveUpdateRequest>,
) -> Result<Json<Budget>, Response> {
    match budget_service
        .add_budget_amount(auth_user.user_id, &category, request.amount_to_add)
        .await
    {
        Ok(budget) => Ok(Json(budget)),
        Err(e) => Err(e.into_response()),
    }
}
