use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::handlers::{validation_error_response, ErrorResponse};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::auth::{AuthToken, LoginRequest};
use crate::models::user::{CreateUserRequest, UpdateGoalsRequest, User, UserProfile};
use crate::services::auth_service::{AuthError, AuthService};

/// Convert AuthError to HTTP response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_type, detail) = match self {
            AuthError::DuplicateEmail => (
                StatusCode::CONFLICT,
                "duplicate_email",
                "Email already exists",
            ),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "Invalid authentication token",
            ),
            AuthError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "Authentication token has expired",
            ),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "not_found", "User not found"),
            AuthError::DatabaseError(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                msg.as_str(),
            ),
        };

        let error_response = ErrorResponse::new(error_type, detail);
        (status, Json(error_response)).into_response()
    }
}

/// Handler for user registration
///
/// Creates a new user account with the provided credentials.
#[utoipa::path(
    post,
    path = "/auth/sign_up",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User successfully registered", body = User),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn sign_up_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), Response> {
    // Validate request body
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    // Call auth service to register user
    match auth_service.register(request).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(user))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for user login
///
/// Authenticates a user and returns a JWT token.
#[utoipa::path(
    post,
    path = "/auth/log_in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthToken),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn log_in_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthToken>, Response> {
    // Call auth service to login user
    match auth_service.login(request).await {
        Ok(token) => Ok(Json(token)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for fetching the authenticated user's profile
#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "auth"
)]
pub async fn profile_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<UserProfile>, Response> {
    match auth_service.profile(auth_user.user_id).await {
        Ok(profile) => Ok(Json(profile)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for updating income/savings goals
///
/// Updates the authenticated user's goals and records a snapshot for the
/// current month so past reports stay stable.
#[utoipa::path(
    put,
    path = "/auth/goals",
    request_body = UpdateGoalsRequest,
    responses(
        (status = 200, description = "Goals updated", body = UserProfile),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "auth"
)]
pub async fn update_goals_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateGoalsRequest>,
) -> Result<Json<UserProfile>, Response> {
    // Validate request body
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match auth_service.update_goals(auth_user.user_id, request).await {
        Ok(profile) => Ok(Json(profile)),
        Err(e) => Err(e.into_response()),
    }
}
