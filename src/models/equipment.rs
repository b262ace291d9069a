//! Equipment model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{enums::EquipmentStatus, request::BorrowRequest};
use crate::error::AppError;

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    /// Unique serial number
    pub serial_number: String,
    pub name: String,
    pub model: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub location: Option<String>,
    /// Number of owned units
    pub quantity_total: i32,
    pub status: EquipmentStatus,
    pub warranty_until: Option<NaiveDate>,
    pub last_maintenance: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Equipment together with its live availability
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentWithAvailability {
    #[serde(flatten)]
    pub equipment: Equipment,
    /// `quantity_total` minus units held by approved and in-use requests
    pub quantity_available: i64,
}

/// Equipment detail page: the item plus the caller's own requests on it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentDetail {
    #[serde(flatten)]
    pub equipment: EquipmentWithAvailability,
    pub my_requests: Vec<BorrowRequest>,
}

/// Equipment category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

fn default_quantity_total() -> i32 {
    1
}

/// Create equipment request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 100, message = "Serial number must be 1-100 characters"))]
    pub serial_number: String,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub model: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub location: Option<String>,
    #[serde(default = "default_quantity_total")]
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity_total: i32,
    pub status: Option<EquipmentStatus>,
    pub warranty_until: Option<NaiveDate>,
    pub last_maintenance: Option<NaiveDate>,
}

/// Update equipment request; absent fields are left untouched.
///
/// Nullable columns take an explicit `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 100, message = "Serial number must be 1-100 characters"))]
    pub serial_number: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub model: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>, nullable)]
    pub category_id: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub location: Option<Option<String>>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity_total: Option<i32>,
    pub status: Option<EquipmentStatus>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = Date, nullable)]
    pub warranty_until: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = Date, nullable)]
    pub last_maintenance: Option<Option<NaiveDate>>,
}

/// Equipment list query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentQuery {
    /// Case-insensitive match on name, model or serial number
    pub search: Option<String>,
    pub category_id: Option<i32>,
    pub status: Option<EquipmentStatus>,
    /// One of name, quantity_total, created_at; prefix with '-' for descending
    pub ordering: Option<String>,
}

/// Sort order for equipment listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EquipmentOrdering {
    #[default]
    NameAsc,
    NameDesc,
    QuantityAsc,
    QuantityDesc,
    CreatedAsc,
    CreatedDesc,
}

impl EquipmentOrdering {
    pub fn sql(&self) -> &'static str {
        match self {
            EquipmentOrdering::NameAsc => "name ASC, id ASC",
            EquipmentOrdering::NameDesc => "name DESC, id DESC",
            EquipmentOrdering::QuantityAsc => "quantity_total ASC, id ASC",
            EquipmentOrdering::QuantityDesc => "quantity_total DESC, id DESC",
            EquipmentOrdering::CreatedAsc => "created_at ASC, id ASC",
            EquipmentOrdering::CreatedDesc => "created_at DESC, id DESC",
        }
    }
}

impl std::str::FromStr for EquipmentOrdering {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(EquipmentOrdering::NameAsc),
            "-name" => Ok(EquipmentOrdering::NameDesc),
            "quantity_total" => Ok(EquipmentOrdering::QuantityAsc),
            "-quantity_total" => Ok(EquipmentOrdering::QuantityDesc),
            "created_at" => Ok(EquipmentOrdering::CreatedAsc),
            "-created_at" => Ok(EquipmentOrdering::CreatedDesc),
            other => Err(AppError::Validation(format!("Unknown ordering: {}", other))),
        }
    }
}

impl EquipmentQuery {
    pub fn ordering(&self) -> Result<EquipmentOrdering, AppError> {
        match self.ordering.as_deref() {
            None | Some("") => Ok(EquipmentOrdering::default()),
            Some(s) => s.parse(),
        }
    }

    /// Whether `equipment` passes the search/category/status filters
    pub fn matches(&self, equipment: &Equipment) -> bool {
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            let hit = equipment.name.to_lowercase().contains(&needle)
                || equipment.serial_number.to_lowercase().contains(&needle)
                || equipment
                    .model
                    .as_ref()
                    .map(|m| m.to_lowercase().contains(&needle))
                    .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        if self.category_id.is_some() && self.category_id != equipment.category_id {
            return false;
        }
        if self.status.is_some() && self.status != Some(equipment.status) {
            return false;
        }
        true
    }
}
