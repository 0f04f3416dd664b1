pub mod auth_handlers;
pub mod budget_handlers;
pub mod dashboard_handlers;
pub mod ledger_handlers;
pub mod subscription_handlers;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Error response structure. `error` is a stable machine tag; `detail` is
/// the human-readable message the dashboard surfaces in toasts.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(error: &str, detail: &str) -> Self {
        Self {
            error: error.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// Flatten validator errors into a 400 response
pub(crate) fn validation_error_response(validation_errors: ValidationErrors) -> Response {
    let error_message = validation_errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ");

    let error_response = ErrorResponse::new("validation_error", &error_message);
    (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
}
