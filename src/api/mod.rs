//! API handlers for EquipSense REST endpoints

pub mod auth;
pub mod dashboard;
pub mod equipment;
pub mod health;
pub mod openapi;
pub mod requests;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::Identity, AppState};

/// Extractor for the acting user, resolved from the bearer token.
///
/// The role is derived from the user's current groups on every request.
pub struct AuthenticatedUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Authentication("Missing or invalid bearer token".to_string()))?;

        let identity = state.services.users.identify(bearer.token()).await?;
        Ok(AuthenticatedUser(identity))
    }
}

/// Build the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Equipment
        .route("/equipment", get(equipment::list_equipment).post(equipment::create_equipment))
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        .route("/equipment/:id/availability", get(equipment::get_availability))
        .route("/categories", get(equipment::list_categories).post(equipment::create_category))
        // Requests
        .route("/requests", get(requests::list_requests).post(requests::create_request))
        .route("/requests/mine", get(requests::my_requests))
        .route("/requests/pending", get(requests::pending_requests))
        .route("/requests/review", post(requests::review_request))
        .route(
            "/requests/:id",
            get(requests::get_request).delete(requests::cancel_request),
        )
        .route("/requests/:id/approve", post(requests::approve_request))
        .route("/requests/:id/reject", post(requests::reject_request))
        .route("/requests/:id/in-use", post(requests::mark_in_use))
        .route("/requests/:id/return", post(requests::mark_returned))
        // Dashboards
        .route("/dashboard", get(dashboard::landing))
        .route("/dashboard/admin", get(dashboard::admin_dashboard))
        .route("/dashboard/manager", get(dashboard::manager_dashboard))
        .route("/dashboard/employee", get(dashboard::employee_dashboard))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/managers", post(users::create_manager))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
