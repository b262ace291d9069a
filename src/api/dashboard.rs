//! Role dashboards

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::Role,
    services::dashboard::{AdminDashboard, EmployeeDashboard, ManagerDashboard},
    AppState,
};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct Landing {
    pub role: Role,
    pub redirect_to: String,
}

/// Where the caller belongs after login
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Landing path for the caller's role", body = Landing)
    )
)]
pub async fn landing(AuthenticatedUser(identity): AuthenticatedUser) -> Json<Landing> {
    Json(Landing {
        role: identity.role,
        redirect_to: identity.role.landing_path().to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/dashboard/admin",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Administrator dashboard", body = AdminDashboard),
        (status = 403, description = "Administrator role required")
    )
)]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<Json<AdminDashboard>> {
    identity.require_admin()?;
    Ok(Json(state.services.dashboard.admin().await?))
}

#[utoipa::path(
    get,
    path = "/dashboard/manager",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Manager dashboard", body = ManagerDashboard),
        (status = 403, description = "Manager role required")
    )
)]
pub async fn manager_dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<Json<ManagerDashboard>> {
    identity.require_manager()?;
    Ok(Json(state.services.dashboard.manager().await?))
}

#[utoipa::path(
    get,
    path = "/dashboard/employee",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's own requests", body = EmployeeDashboard)
    )
)]
pub async fn employee_dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<Json<EmployeeDashboard>> {
    Ok(Json(state.services.dashboard.employee(identity.user_id).await?))
}
