//! Borrow request workflow

use std::sync::Arc;

use validator::Validate;

use super::availability::{check_availability, AvailabilityService};
use crate::{
    error::{AppError, AppResult},
    models::{
        request::{
            BorrowRequest, CreateRequest, NewRequest, RequestFilter, ReviewAction, ReviewKind,
            TransitionOutcome,
        },
        Identity, RequestStatus,
    },
    repository::Store,
};

#[derive(Clone)]
pub struct RequestsService {
    store: Arc<dyn Store>,
    availability: AvailabilityService,
}

impl RequestsService {
    pub fn new(store: Arc<dyn Store>, availability: AvailabilityService) -> Self {
        Self { store, availability }
    }

    /// Submit a new pending request on behalf of `requester`.
    ///
    /// Rejected when the window is empty or reversed, or when more units are
    /// asked for than are currently free.
    pub async fn submit(&self, requester: &Identity, data: CreateRequest) -> AppResult<BorrowRequest> {
        data.validate()?;
        if data.start_dt >= data.end_dt {
            return Err(AppError::Validation("Start must be earlier than end".to_string()));
        }

        let equipment = self.store.equipment_get(data.equipment_id).await?;
        let available = self.availability.available(&equipment).await?;
        if !check_availability(available, data.quantity) {
            return Err(AppError::Validation(format!(
                "Not enough equipment available. Available: {}",
                available
            )));
        }

        let request = self
            .store
            .request_insert(&NewRequest {
                user_id: requester.user_id,
                equipment_id: data.equipment_id,
                quantity: data.quantity,
                start_dt: data.start_dt,
                end_dt: data.end_dt,
                comment: data.comment,
            })
            .await?;

        tracing::info!(
            request_id = request.id,
            equipment_id = request.equipment_id,
            quantity = request.quantity,
            user_id = requester.user_id,
            "Borrow request submitted"
        );
        Ok(request)
    }

    /// Cancel (delete) the requester's own pending request
    pub async fn cancel(&self, requester: &Identity, id: i32) -> AppResult<BorrowRequest> {
        let request = self.store.request_get(id).await?;
        if request.user_id != requester.user_id {
            return Err(AppError::NotFound(format!("Request {} not found", id)));
        }
        if request.status != RequestStatus::Pending {
            return Err(AppError::BusinessRule(
                "Only pending requests can be cancelled".to_string(),
            ));
        }
        if !self.store.request_delete_pending(id, requester.user_id).await? {
            // Resolved by a manager between the read and the delete
            return Err(AppError::BusinessRule(
                "Only pending requests can be cancelled".to_string(),
            ));
        }

        tracing::info!(request_id = id, user_id = requester.user_id, "Borrow request cancelled");
        Ok(request)
    }

    /// Move a pending request to approved.
    ///
    /// Availability is not re-checked here: the status flips as-is.
    pub async fn approve(&self, id: i32) -> AppResult<TransitionOutcome> {
        self.transition(id, RequestStatus::Approved).await
    }

    pub async fn reject(&self, id: i32) -> AppResult<TransitionOutcome> {
        self.transition(id, RequestStatus::Rejected).await
    }

    pub async fn mark_in_use(&self, id: i32) -> AppResult<TransitionOutcome> {
        self.transition(id, RequestStatus::InUse).await
    }

    pub async fn mark_returned(&self, id: i32) -> AppResult<TransitionOutcome> {
        self.transition(id, RequestStatus::Returned).await
    }

    /// Approve or reject from the review queue
    pub async fn review(&self, action: &ReviewAction) -> AppResult<TransitionOutcome> {
        match action.action {
            ReviewKind::Approve => self.approve(action.id).await,
            ReviewKind::Reject => self.reject(action.id).await,
        }
    }

    async fn transition(&self, id: i32, target: RequestStatus) -> AppResult<TransitionOutcome> {
        let request = self.store.request_get(id).await?;

        if !request.status.can_transition_to(target) {
            tracing::warn!(
                request_id = id,
                from = %request.status,
                to = %target,
                "Ignoring transition from unexpected state"
            );
            return Ok(TransitionOutcome {
                applied: false,
                message: warning_message(target).to_string(),
                request,
            });
        }

        let updated = self.store.request_set_status(id, target).await?;
        tracing::info!(request_id = id, from = %request.status, to = %target, "Request status changed");

        Ok(TransitionOutcome {
            applied: true,
            message: success_message(id, target),
            request: updated,
        })
    }

    /// Fetch one request. Managers see everything, others only their own.
    pub async fn get(&self, viewer: &Identity, id: i32) -> AppResult<BorrowRequest> {
        let request = self.store.request_get(id).await?;
        if !viewer.is_manager() && request.user_id != viewer.user_id {
            return Err(AppError::Authorization(
                "Not allowed to view this request".to_string(),
            ));
        }
        Ok(request)
    }

    pub async fn list(&self, filter: &RequestFilter) -> AppResult<Vec<BorrowRequest>> {
        self.store.request_list(filter).await
    }

    pub async fn list_pending(&self) -> AppResult<Vec<BorrowRequest>> {
        self.list(&RequestFilter {
            status: Some(RequestStatus::Pending),
            ..Default::default()
        })
        .await
    }

    pub async fn list_for_user(&self, user_id: i32, status: Option<RequestStatus>) -> AppResult<Vec<BorrowRequest>> {
        self.list(&RequestFilter {
            user_id: Some(user_id),
            status,
            ..Default::default()
        })
        .await
    }
}

fn success_message(id: i32, target: RequestStatus) -> String {
    match target {
        RequestStatus::Approved => format!("Request #{} approved.", id),
        RequestStatus::Rejected => format!("Request #{} rejected.", id),
        RequestStatus::InUse => format!("Request #{} marked as in use.", id),
        RequestStatus::Returned => format!("Request #{} marked as returned.", id),
        RequestStatus::Pending => format!("Request #{} is pending.", id),
    }
}

fn warning_message(target: RequestStatus) -> &'static str {
    match target {
        RequestStatus::Approved => "Only pending requests can be approved.",
        RequestStatus::Rejected => "Only pending requests can be rejected.",
        RequestStatus::InUse => "Only approved requests can be marked as in use.",
        RequestStatus::Returned => "Only approved or in-use requests can be marked as returned.",
        RequestStatus::Pending => "Requests cannot be moved back to pending.",
    }
}
