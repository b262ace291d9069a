//! Borrow request model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::RequestStatus;

/// Borrow request record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequest {
    pub id: i32,
    pub user_id: i32,
    pub equipment_id: i32,
    pub quantity: i32,
    /// Inclusive start of the borrow window
    pub start_dt: DateTime<Utc>,
    /// Exclusive end of the borrow window
    pub end_dt: DateTime<Utc>,
    pub status: RequestStatus,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_quantity() -> i32 {
    1
}

/// Submit a borrow request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    pub equipment_id: i32,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub start_dt: DateTime<Utc>,
    pub end_dt: DateTime<Utc>,
    pub comment: Option<String>,
}

/// Request row to insert, owned by `user_id`, always created pending
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    pub user_id: i32,
    pub equipment_id: i32,
    pub quantity: i32,
    pub start_dt: DateTime<Utc>,
    pub end_dt: DateTime<Utc>,
    pub comment: Option<String>,
}

/// Filter for request listings. Results are newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFilter {
    pub user_id: Option<i32>,
    pub equipment_id: Option<i32>,
    pub status: Option<RequestStatus>,
}

impl RequestFilter {
    pub fn matches(&self, request: &BorrowRequest) -> bool {
        self.user_id.map_or(true, |id| id == request.user_id)
            && self.equipment_id.map_or(true, |id| id == request.equipment_id)
            && self.status.map_or(true, |s| s == request.status)
    }
}

/// Request list query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
    pub equipment_id: Option<i32>,
}

/// Result of a manager action on a request.
///
/// Acting on a request that is no longer in the expected state is not an
/// error: nothing changes and `applied` is false with a warning message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransitionOutcome {
    pub applied: bool,
    pub message: String,
    pub request: BorrowRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewKind {
    Approve,
    Reject,
}

/// Approve or reject a pending request from the review queue
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReviewAction {
    pub action: ReviewKind,
    pub id: i32,
}

/// Availability snapshot for one equipment item
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Availability {
    pub equipment_id: i32,
    pub quantity_total: i32,
    pub quantity_reserved: i64,
    pub quantity_available: i64,
    /// Quantity that was asked about, if any
    pub requested: Option<i32>,
    /// Whether `requested` units could be borrowed right now
    pub sufficient: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    pub quantity: Option<i32>,
}
