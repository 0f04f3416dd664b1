use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::{validation_error_response, ErrorResponse};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::subscription::{
    CreateSubscriptionRequest, OccurrenceProjection, Subscription, UpdateSubscriptionRequest,
};
use crate::services::subscription_service::{SubscriptionError, SubscriptionService};

/// Convert SubscriptionError to HTTP response
impl IntoResponse for SubscriptionError {
    fn into_response(self) -> Response {
        let (status, error_type, detail) = match self {
            SubscriptionError::InvalidAmount => (
                StatusCode::BAD_REQUEST,
                "invalid_amount",
                "Amount must be positive",
            ),
            SubscriptionError::MissingTermination => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Please provide either an end date or number of times for the subscription",
            ),
            SubscriptionError::SubscriptionNotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "Subscription not found",
            ),
            SubscriptionError::Unauthorized => (
                StatusCode::FORBIDDEN,
                "unauthorized",
                "Unauthorized to access this subscription",
            ),
            SubscriptionError::DatabaseError(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                msg.as_str(),
            ),
        };

        let error_response = ErrorResponse::new(error_type, detail);
        (status, Json(error_response)).into_response()
    }
}

/// Handler for creating a subscription
///
/// At least one of end_date / repeat_count must be supplied.
#[utoipa::path(
    post,
    path = "/api/create_subscription",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription successfully created", body = Subscription),
        (status = 400, description = "Validation error (missing termination rule)", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "subscriptions"
)]
pub async fn create_subscription_handler(
    State(subscription_service): State<Arc<dyn SubscriptionService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<Subscription>), Response> {
    // Validate request body
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match subscription_service
        .create_subscription(auth_user.user_id, request)
        .await
    {
        Ok(subscription) => Ok((StatusCode::CREATED, Json(subscription))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for listing subscriptions
#[utoipa::path(
    get,
    path = "/api/subscriptions",
    responses(
        (status = 200, description = "List of subscriptions", body = Vec<Subscription>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "subscriptions"
)]
pub async fn list_subscriptions_handler(
    State(subscription_service): State<Arc<dyn SubscriptionService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Subscription>>, Response> {
    match subscription_service
        .list_subscriptions(auth_user.user_id)
        .await
    {
        Ok(subscriptions) => Ok(Json(subscriptions)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for updating a subscription
///
/// Full-field update keyed by id in the request body.
#[utoipa::path(
    put,
    path = "/api/update_subscription",
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription successfully updated", body = Subscription),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "User doesn't own the subscription", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "subscriptions"
)]
pub async fn update_subscription_handler(
    State(subscription_service): State<Arc<dyn SubscriptionService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateSubscriptionRequest>,
) -> Result<Json<Subscription>, Response> {
    // Validate request body
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match subscription_service
        .update_subscription(auth_user.user_id, request)
        .await
    {
        Ok(subscription) => Ok(Json(subscription)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the occurrence projection of one subscription
#[utoipa::path(
    get,
    path = "/api/subscriptions/{id}/projection",
    params(
        ("id" = Uuid, Path, description = "Subscription ID")
    ),
    responses(
        (status = 200, description = "Occurrences elapsed and next due date", body = OccurrenceProjection),
        (status = 403, description = "User doesn't own the subscription", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "subscriptions"
)]
pub async fn subscription_projection_handler(
    State(subscription_service): State<Arc<dyn SubscriptionService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(subscription_id): Path<Uuid>,
) -> Result<Json<OccurrenceProjection>, Response> {
    match subscription_service
        .project_occurrences(auth_user.user_id, subscription_id)
        .await
    {
        Ok(projection) => Ok(Json(projection)),
        Err(e) => Err(e.into_response()),
    }
}
