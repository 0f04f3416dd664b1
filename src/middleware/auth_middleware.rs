use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::services::auth_service::AuthService;

/// Extension type to store authenticated user ID in request
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Auth middleware that validates JWT bearer tokens and adds user_id to
/// request extensions. The credential travels with the request; nothing is
/// read from ambient state.
pub async fn auth_middleware(
    State(auth_service): State<Arc<dyn AuthService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthMiddlewareError> {
    // Extract Authorization header
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthMiddlewareError::MissingToken)?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthMiddlewareError::InvalidTokenFormat)?;

    // Validate token and extract user_id
    let user_id = auth_service
        .validate_token(token)
        .await
        .map_err(|e| match e {
            crate::services::auth_service::AuthError::TokenExpired => {
                AuthMiddlewareError::TokenExpired
            }
            _ => AuthMiddlewareError::InvalidToken,
        })?;

    // Add user_id to request extensions
    request.extensions_mut().insert(AuthenticatedUser { user_id });

    // Continue to next handler
    Ok(next.run(request).await)
}

/// Auth middleware errors
#[derive(Debug)]
pub enum AuthMiddlewareError {
    MissingToken,
    InvalidTokenFormat,
    InvalidToken,
    TokenExpired,
}

impl IntoResponse for AuthMiddlewareError {
    fn into_response(self) -> Response {
        let (error, detail) = match self {
            AuthMiddlewareError::MissingToken => {
                ("unauthenticated", "Missing authorization token")
            }
            AuthMiddlewareError::InvalidTokenFormat => (
                "unauthenticated",
                "Invalid authorization header format. Expected: Bearer <token>",
            ),
            AuthMiddlewareError::InvalidToken => {
                ("unauthenticated", "Invalid or malformed token")
            }
            AuthMiddlewareError::TokenExpired => ("unauthenticated", "Token has expired"),
        };

        let body = Json(json!({
            "error": error,
            "detail": detail,
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
