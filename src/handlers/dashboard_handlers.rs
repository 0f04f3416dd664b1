use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::handlers::ErrorResponse;
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::dashboard::{
    DashboardGraph, MonthlyPoint, PastReport, PeriodSummary, SavingsGoalView,
};
use crate::services::dashboard_service::{DashboardError, DashboardService};

/// Convert DashboardError to HTTP response
impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, error_type, detail) = match self {
            DashboardError::InvalidPeriod(ref period) => (
                StatusCode::BAD_REQUEST,
                "invalid_period",
                format!("'{}' is not a valid reporting period", period),
            ),
            DashboardError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "User not found".to_string(),
            ),
            DashboardError::DatabaseError(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                msg.clone(),
            ),
        };

        let error_response = ErrorResponse::new(error_type, &detail);
        (status, Json(error_response)).into_response()
    }
}

/// Query parameters for the past-reports endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct PastReportQuery {
    /// English month name, e.g. "January"
    pub month: String,
    pub year: i32,
}

/// Handler for the current-month headline figures
#[utoipa::path(
    get,
    path = "/api/dashboard/financialData",
    responses(
        (status = 200, description = "Current-month summary", body = PeriodSummary),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "dashboard"
)]
pub async fn financial_data_handler(
    State(dashboard_service): State<Arc<dyn DashboardService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<PeriodSummary>, Response> {
    match dashboard_service.financial_data(auth_user.user_id).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the current-month chart payloads
///
/// Returns the two tagged graph payloads in one array; the client selects
/// by the `type` discriminator.
#[utoipa::path(
    get,
    path = "/api/dashboard/graphs",
    responses(
        (status = 200, description = "Tagged graph payloads", body = Vec<DashboardGraph>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "dashboard"
)]
pub async fn graphs_handler(
    State(dashboard_service): State<Arc<dyn DashboardService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<DashboardGraph>>, Response> {
    match dashboard_service.graphs(auth_user.user_id).await {
        Ok(graphs) => Ok(Json(graphs)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for historical reports
#[utoipa::path(
    get,
    path = "/api/dashboard/past-reports/",
    params(PastReportQuery),
    responses(
        (status = 200, description = "Report for the requested month", body = PastReport),
        (status = 400, description = "Invalid period", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "dashboard"
)]
pub async fn past_report_handler(
    State(dashboard_service): State<Arc<dyn DashboardService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<PastReportQuery>,
) -> Result<Json<PastReport>, Response> {
    match dashboard_service
        .past_report(auth_user.user_id, &query.month, query.year)
        .await
    {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the trailing income-vs-expenses trend
#[utoipa::path(
    get,
    path = "/api/dashboard/trends",
    responses(
        (status = 200, description = "Per-month totals, chronological", body = Vec<MonthlyPoint>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "dashboard"
)]
pub async fn trends_handler(
    State(dashboard_service): State<Arc<dyn DashboardService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<MonthlyPoint>>, Response> {
    match dashboard_service.trends(auth_user.user_id).await {
        Ok(series) => Ok(Json(series)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the savings-goal gauge
#[utoipa::path(
    get,
    path = "/api/dashboard/savings_goal",
    responses(
        (status = 200, description = "Savings progress", body = SavingsGoalView),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "dashboard"
)]
pub async fn savings_goal_handler(
    State(dashboard_service): State<Arc<dyn DashboardService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<SavingsGoalView>, Response> {
    match dashboard_service.savings_goal(auth_user.user_id).await {
        Ok(view) => Ok(Json(view)),
        Err(e) => Err(e.into_response()),
    }
}
