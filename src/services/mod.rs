//! Business logic services

pub mod availability;
pub mod dashboard;
pub mod equipment;
pub mod requests;
pub mod users;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Store};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub requests: requests::RequestsService,
    pub users: users::UsersService,
    pub dashboard: dashboard::DashboardService,
    store: Arc<dyn Store>,
}

impl Services {
    /// Create all services on top of the given store
    pub fn new(store: Arc<dyn Store>, auth_config: AuthConfig) -> Self {
        let availability = availability::AvailabilityService::new(store.clone());
        Self {
            equipment: equipment::EquipmentService::new(store.clone(), availability.clone()),
            requests: requests::RequestsService::new(store.clone(), availability),
            users: users::UsersService::new(store.clone(), auth_config),
            dashboard: dashboard::DashboardService::new(store.clone()),
            store,
        }
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> crate::AppResult<()> {
        self.store.ping().await
    }
}
