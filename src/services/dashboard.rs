//! Role-specific dashboard summaries

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        request::{BorrowRequest, RequestFilter},
        user::{User, MANAGER_GROUP},
        RequestStatus,
    },
    repository::Store,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub equipment_count: i64,
    pub user_count: i64,
    pub pending_requests_count: i64,
    pub managers: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ManagerDashboard {
    pub pending_count: i64,
    pub approved_count: i64,
    pub pending_requests: Vec<BorrowRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeDashboard {
    /// Number of the caller's requests per status
    pub counts: BTreeMap<String, usize>,
    pub requests: Vec<BorrowRequest>,
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn Store>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn admin(&self) -> AppResult<AdminDashboard> {
        Ok(AdminDashboard {
            equipment_count: self.store.equipment_count().await?,
            user_count: self.store.user_count().await?,
            pending_requests_count: self.store.request_count_by_status(RequestStatus::Pending).await?,
            managers: self.store.user_list_in_group(MANAGER_GROUP).await?,
        })
    }

    pub async fn manager(&self) -> AppResult<ManagerDashboard> {
        let pending_requests = self
            .store
            .request_list(&RequestFilter {
                status: Some(RequestStatus::Pending),
                ..Default::default()
            })
            .await?;
        Ok(ManagerDashboard {
            pending_count: pending_requests.len() as i64,
            approved_count: self.store.request_count_by_status(RequestStatus::Approved).await?,
            pending_requests,
        })
    }

    pub async fn employee(&self, user_id: i32) -> AppResult<EmployeeDashboard> {
        let requests = self
            .store
            .request_list(&RequestFilter {
                user_id: Some(user_id),
                ..Default::default()
            })
            .await?;
        let mut counts = BTreeMap::new();
        for request in &requests {
            *counts.entry(request.status.to_string()).or_insert(0) += 1;
        }
        Ok(EmployeeDashboard { counts, requests })
    }
}
