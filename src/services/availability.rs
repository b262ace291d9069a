//! Availability accounting.
//!
//! An item's free quantity is its total minus the units held by approved and
//! in-use requests. The sum spans every such request regardless of its time
//! window, and nothing is cached: each call re-reads the aggregate.

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        equipment::{Equipment, EquipmentWithAvailability},
        request::Availability,
    },
    repository::Store,
};

/// `total - reserved`. Negative when more units were approved than owned.
pub fn available_quantity(total: i32, reserved: i64) -> i64 {
    i64::from(total) - reserved
}

/// Sum of quantities of the requests that hold stock. The database computes
/// the same aggregate in SQL; this is the in-memory counterpart.
#[cfg(test)]
pub(crate) fn reserved_quantity<'a, I>(requests: I) -> i64
where
    I: IntoIterator<Item = &'a crate::models::request::BorrowRequest>,
{
    requests
        .into_iter()
        .filter(|r| r.status.reserves_stock())
        .map(|r| i64::from(r.quantity))
        .sum()
}

/// Whether `requested` units fit into `available`
pub fn check_availability(available: i64, requested: i32) -> bool {
    i64::from(requested) <= available
}

#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn Store>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Current free quantity of an item
    pub async fn available(&self, equipment: &Equipment) -> AppResult<i64> {
        let reserved = self.store.reserved_quantity(equipment.id).await?;
        Ok(available_quantity(equipment.quantity_total, reserved))
    }

    /// Whether `requested` units of `equipment` can be borrowed right now
    pub async fn check(&self, equipment: &Equipment, requested: i32) -> AppResult<bool> {
        Ok(check_availability(self.available(equipment).await?, requested))
    }

    pub async fn with_availability(&self, equipment: Equipment) -> AppResult<EquipmentWithAvailability> {
        let quantity_available = self.available(&equipment).await?;
        Ok(EquipmentWithAvailability {
            equipment,
            quantity_available,
        })
    }

    /// Full breakdown for an item, optionally judged against a requested quantity
    pub async fn snapshot(&self, equipment: &Equipment, requested: Option<i32>) -> AppResult<Availability> {
        let reserved = self.store.reserved_quantity(equipment.id).await?;
        let available = available_quantity(equipment.quantity_total, reserved);
        Ok(Availability {
            equipment_id: equipment.id,
            quantity_total: equipment.quantity_total,
            quantity_reserved: reserved,
            quantity_available: available,
            requested,
            sufficient: requested.map(|q| check_availability(available, q)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::RequestStatus, test_utils};

    #[test]
    fn test_available_quantity() {
        assert_eq!(available_quantity(10, 0), 10);
        assert_eq!(available_quantity(10, 6), 4);
        assert_eq!(available_quantity(10, 11), -1);
    }

    #[test]
    fn test_check_availability() {
        assert!(check_availability(4, 4));
        assert!(check_availability(4, 1));
        assert!(!check_availability(4, 5));
        assert!(!check_availability(-1, 1));
    }

    #[test]
    fn test_reserved_counts_only_approved_and_in_use() {
        let requests = vec![
            test_utils::request(1, 2, RequestStatus::Pending),
            test_utils::request(2, 3, RequestStatus::Approved),
            test_utils::request(3, 4, RequestStatus::InUse),
            test_utils::request(4, 5, RequestStatus::Rejected),
            test_utils::request(5, 6, RequestStatus::Returned),
        ];
        assert_eq!(reserved_quantity(&requests), 7);
    }

    #[test]
    fn test_reserved_ignores_time_windows() {
        // Two approved requests with disjoint windows still add up
        let mut early = test_utils::request(1, 3, RequestStatus::Approved);
        let mut late = test_utils::request(2, 3, RequestStatus::Approved);
        early.end_dt = early.start_dt + chrono::Duration::hours(1);
        late.start_dt = early.end_dt + chrono::Duration::days(30);
        late.end_dt = late.start_dt + chrono::Duration::hours(1);
        assert_eq!(reserved_quantity([&early, &late]), 6);
    }

    #[tokio::test]
    async fn test_snapshot_uses_store_aggregate() {
        let mut store = crate::repository::MockStore::new();
        store
            .expect_reserved_quantity()
            .withf(|id| *id == 42)
            .times(1)
            .returning(|_| Ok(7));
        let service = AvailabilityService::new(Arc::new(store));

        let equipment = test_utils::equipment(42, 10);
        let snapshot = service.snapshot(&equipment, Some(4)).await.unwrap();
        assert_eq!(snapshot.quantity_reserved, 7);
        assert_eq!(snapshot.quantity_available, 3);
        assert_eq!(snapshot.sufficient, Some(false));
    }
}
