//! Borrow request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::request::{
        BorrowRequest, CreateRequest, RequestFilter, RequestQuery, ReviewAction, TransitionOutcome,
    },
    AppState,
};

use super::AuthenticatedUser;

/// List all requests (managers)
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<BorrowRequest>),
        (status = 403, description = "Manager role required")
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<Vec<BorrowRequest>>> {
    identity.require_manager()?;
    let filter = RequestFilter {
        user_id: None,
        equipment_id: query.equipment_id,
        status: query.status,
    };
    let requests = state.services.requests.list(&filter).await?;
    Ok(Json(requests))
}

/// Submit a borrow request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request submitted", body = BorrowRequest),
        (status = 400, description = "Invalid window or not enough units available"),
        (status = 409, description = "A request for this window already exists")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(data): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<BorrowRequest>)> {
    let request = state.services.requests.submit(&identity, data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// The caller's own requests
#[utoipa::path(
    get,
    path = "/requests/mine",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "Caller's requests", body = Vec<BorrowRequest>)
    )
)]
pub async fn my_requests(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<Vec<BorrowRequest>>> {
    let requests = state
        .services
        .requests
        .list_for_user(identity.user_id, query.status)
        .await?;
    Ok(Json(requests))
}

/// Review queue
#[utoipa::path(
    get,
    path = "/requests/pending",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending requests", body = Vec<BorrowRequest>),
        (status = 403, description = "Manager role required")
    )
)]
pub async fn pending_requests(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRequest>>> {
    identity.require_manager()?;
    let requests = state.services.requests.list_pending().await?;
    Ok(Json(requests))
}

/// Get a request. Employees only see their own.
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request", body = BorrowRequest),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRequest>> {
    let request = state.services.requests.get(&identity, id).await?;
    Ok(Json(request))
}

/// Cancel one of the caller's pending requests
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Cancelled request", body = BorrowRequest),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Request is no longer pending")
    )
)]
pub async fn cancel_request(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRequest>> {
    let request = state.services.requests.cancel(&identity, id).await?;
    Ok(Json(request))
}

/// Approve a pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Outcome; applied is false when the request was not pending", body = TransitionOutcome),
        (status = 403, description = "Manager role required")
    )
)]
pub async fn approve_request(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TransitionOutcome>> {
    identity.require_manager()?;
    Ok(Json(state.services.requests.approve(id).await?))
}

/// Reject a pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/reject",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Outcome; applied is false when the request was not pending", body = TransitionOutcome),
        (status = 403, description = "Manager role required")
    )
)]
pub async fn reject_request(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TransitionOutcome>> {
    identity.require_manager()?;
    Ok(Json(state.services.requests.reject(id).await?))
}

/// Hand out an approved request
#[utoipa::path(
    post,
    path = "/requests/{id}/in-use",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Outcome", body = TransitionOutcome),
        (status = 403, description = "Manager role required")
    )
)]
pub async fn mark_in_use(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TransitionOutcome>> {
    identity.require_manager()?;
    Ok(Json(state.services.requests.mark_in_use(id).await?))
}

/// Take back borrowed units
#[utoipa::path(
    post,
    path = "/requests/{id}/return",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Outcome", body = TransitionOutcome),
        (status = 403, description = "Manager role required")
    )
)]
pub async fn mark_returned(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TransitionOutcome>> {
    identity.require_manager()?;
    Ok(Json(state.services.requests.mark_returned(id).await?))
}

/// Approve or reject from the review queue
#[utoipa::path(
    post,
    path = "/requests/review",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = ReviewAction,
    responses(
        (status = 200, description = "Outcome", body = TransitionOutcome),
        (status = 403, description = "Manager role required")
    )
)]
pub async fn review_request(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(action): Json<ReviewAction>,
) -> AppResult<Json<TransitionOutcome>> {
    identity.require_manager()?;
    Ok(Json(state.services.requests.review(&action).await?))
}
