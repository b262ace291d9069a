//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, dashboard, equipment, health, requests, users};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EquipSense API",
        version = "1.0.0",
        description = "Equipment checkout and inventory tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::get_availability,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::list_categories,
        equipment::create_category,
        // Requests
        requests::list_requests,
        requests::create_request,
        requests::my_requests,
        requests::pending_requests,
        requests::get_request,
        requests::cancel_request,
        requests::approve_request,
        requests::reject_request,
        requests::mark_in_use,
        requests::mark_returned,
        requests::review_request,
        // Dashboards
        dashboard::landing,
        dashboard::admin_dashboard,
        dashboard::manager_dashboard,
        dashboard::employee_dashboard,
        // Users
        users::list_users,
        users::get_user,
        users::create_manager,
        users::update_user,
        users::delete_user,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Equipment
            crate::models::enums::EquipmentStatus,
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentWithAvailability,
            crate::models::equipment::EquipmentDetail,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::Category,
            crate::models::equipment::CreateCategory,
            // Requests
            crate::models::enums::RequestStatus,
            crate::models::request::BorrowRequest,
            crate::models::request::CreateRequest,
            crate::models::request::TransitionOutcome,
            crate::models::request::ReviewKind,
            crate::models::request::ReviewAction,
            crate::models::request::Availability,
            // Dashboards
            dashboard::Landing,
            crate::services::dashboard::AdminDashboard,
            crate::services::dashboard::ManagerDashboard,
            crate::services::dashboard::EmployeeDashboard,
            // Users
            crate::models::user::Role,
            crate::models::user::User,
            crate::models::user::RegisterUser,
            crate::models::user::CreateManager,
            crate::models::user::UpdateUser,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "equipment", description = "Equipment registry and categories"),
        (name = "requests", description = "Borrow requests and their review"),
        (name = "dashboard", description = "Role dashboards"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
