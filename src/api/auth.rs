//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::user::{RegisterUser, Role, User},
    services::users::Session,
    AppState,
};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Issued token with where the client should land next
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT access token
    pub token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    pub user: User,
    pub role: Role,
    /// Dashboard path for the user's role
    pub redirect_to: String,
}

impl From<Session> for LoginResponse {
    fn from(session: Session) -> Self {
        LoginResponse {
            token: session.token,
            token_type: "Bearer".to_string(),
            redirect_to: session.role.landing_path().to_string(),
            role: session.role,
            user: session.user,
        }
    }
}

/// Current user information
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub user: User,
    pub role: Role,
    pub groups: Vec<String>,
    pub redirect_to: String,
}

/// Register a new employee account and log it in
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created", body = LoginResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(data): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<LoginResponse>)> {
    let session = state.services.users.register(data).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Authenticate user and get JWT token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    request.validate()?;
    let session = state
        .services
        .users
        .authenticate(&request.username, &request.password)
        .await?;
    Ok(Json(session.into()))
}

/// Get current user information
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user info", body = UserInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<Json<UserInfo>> {
    let user = state.services.users.get(identity.user_id).await?;
    Ok(Json(UserInfo {
        user,
        redirect_to: identity.role.landing_path().to_string(),
        role: identity.role,
        groups: identity.groups,
    }))
}
