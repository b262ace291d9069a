//! Equipment registry service

use std::sync::Arc;

use super::availability::AvailabilityService;
use crate::{
    error::AppResult,
    models::{
        equipment::{
            Category, CreateCategory, CreateEquipment, EquipmentDetail, EquipmentQuery,
            EquipmentWithAvailability, UpdateEquipment,
        },
        request::{Availability, RequestFilter},
    },
    repository::Store,
};

#[derive(Clone)]
pub struct EquipmentService {
    store: Arc<dyn Store>,
    availability: AvailabilityService,
}

impl EquipmentService {
    pub fn new(store: Arc<dyn Store>, availability: AvailabilityService) -> Self {
        Self { store, availability }
    }

    /// List equipment with live availability
    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<Vec<EquipmentWithAvailability>> {
        let ordering = query.ordering()?;
        let items = self.store.equipment_list(query, ordering).await?;
        let mut result = Vec::with_capacity(items.len());
        for item in items {
            result.push(self.availability.with_availability(item).await?);
        }
        Ok(result)
    }

    pub async fn get(&self, id: i32) -> AppResult<EquipmentWithAvailability> {
        let equipment = self.store.equipment_get(id).await?;
        self.availability.with_availability(equipment).await
    }

    /// Item detail with the viewer's own requests on it
    pub async fn detail(&self, id: i32, viewer_id: i32) -> AppResult<EquipmentDetail> {
        let equipment = self.get(id).await?;
        let my_requests = self
            .store
            .request_list(&RequestFilter {
                user_id: Some(viewer_id),
                equipment_id: Some(id),
                status: None,
            })
            .await?;
        Ok(EquipmentDetail {
            equipment,
            my_requests,
        })
    }

    pub async fn availability(&self, id: i32, requested: Option<i32>) -> AppResult<Availability> {
        let equipment = self.store.equipment_get(id).await?;
        self.availability.snapshot(&equipment, requested).await
    }

    pub async fn create(&self, data: &CreateEquipment) -> AppResult<EquipmentWithAvailability> {
        let equipment = self.store.equipment_create(data).await?;
        tracing::info!(equipment_id = equipment.id, serial = %equipment.serial_number, "Equipment created");
        self.availability.with_availability(equipment).await
    }

    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<EquipmentWithAvailability> {
        let equipment = self.store.equipment_update(id, data).await?;
        self.availability.with_availability(equipment).await
    }

    /// Delete an item; refused while any request references it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.store.equipment_delete(id).await?;
        tracing::info!(equipment_id = id, "Equipment deleted");
        Ok(())
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.store.categories_list().await
    }

    pub async fn create_category(&self, data: &CreateCategory) -> AppResult<Category> {
        self.store.category_create(data).await
    }
}
