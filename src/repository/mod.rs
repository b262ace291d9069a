//! Repository layer for database operations

pub mod equipment;
pub mod requests;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        equipment::{
            Category, CreateCategory, CreateEquipment, Equipment, EquipmentOrdering,
            EquipmentQuery, UpdateEquipment,
        },
        request::{BorrowRequest, NewRequest, RequestFilter},
        user::{NewUser, UpdateUser, User},
        RequestStatus,
    },
};

pub(crate) const DUPLICATE_SERIAL: &str = "Equipment with this serial number already exists";
pub(crate) const DUPLICATE_CATEGORY: &str = "Category already exists";
pub(crate) const UNKNOWN_CATEGORY: &str = "Category does not exist";
pub(crate) const EQUIPMENT_IN_USE: &str =
    "Equipment is referenced by existing requests and cannot be deleted";
pub(crate) const DUPLICATE_REQUEST: &str =
    "A request for this equipment with the same start and end already exists";
pub(crate) const DUPLICATE_USERNAME: &str = "Username already exists";

/// Persistence operations used by the services.
///
/// `Repository` implements it over PostgreSQL. Every method is a single
/// read or write; nothing here wraps several calls in a transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> AppResult<()>;

    // Equipment
    async fn equipment_list(
        &self,
        query: &EquipmentQuery,
        ordering: EquipmentOrdering,
    ) -> AppResult<Vec<Equipment>>;
    async fn equipment_get(&self, id: i32) -> AppResult<Equipment>;
    async fn equipment_create(&self, data: &CreateEquipment) -> AppResult<Equipment>;
    async fn equipment_update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment>;
    async fn equipment_delete(&self, id: i32) -> AppResult<()>;
    async fn equipment_count(&self) -> AppResult<i64>;
    async fn categories_list(&self) -> AppResult<Vec<Category>>;
    async fn category_create(&self, data: &CreateCategory) -> AppResult<Category>;

    // Requests
    /// Sum of quantities of approved and in-use requests on an item
    async fn reserved_quantity(&self, equipment_id: i32) -> AppResult<i64>;
    async fn request_insert(&self, data: &NewRequest) -> AppResult<BorrowRequest>;
    async fn request_get(&self, id: i32) -> AppResult<BorrowRequest>;
    async fn request_list(&self, filter: &RequestFilter) -> AppResult<Vec<BorrowRequest>>;
    async fn request_set_status(&self, id: i32, status: RequestStatus) -> AppResult<BorrowRequest>;
    /// Delete a request only if it belongs to `user_id` and is still pending.
    /// Returns whether a row was removed.
    async fn request_delete_pending(&self, id: i32, user_id: i32) -> AppResult<bool>;
    async fn request_count_by_status(&self, status: RequestStatus) -> AppResult<i64>;

    // Users
    async fn user_get(&self, id: i32) -> AppResult<User>;
    async fn user_get_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn user_groups(&self, user_id: i32) -> AppResult<Vec<String>>;
    /// Insert a user and add it to `group`
    async fn user_create(&self, data: &NewUser, group: &str) -> AppResult<User>;
    async fn user_list(&self) -> AppResult<Vec<User>>;
    async fn user_list_in_group(&self, group: &str) -> AppResult<Vec<User>>;
    async fn user_update(&self, id: i32, data: &UpdateUser) -> AppResult<User>;
    async fn user_delete(&self, id: i32) -> AppResult<()>;
    async fn user_count(&self) -> AppResult<i64>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub equipment: equipment::EquipmentRepository,
    pub requests: requests::RequestsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl Store for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn equipment_list(
        &self,
        query: &EquipmentQuery,
        ordering: EquipmentOrdering,
    ) -> AppResult<Vec<Equipment>> {
        self.equipment.list(query, ordering).await
    }

    async fn equipment_get(&self, id: i32) -> AppResult<Equipment> {
        self.equipment.get_by_id(id).await
    }

    async fn equipment_create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        self.equipment.create(data).await
    }

    async fn equipment_update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        self.equipment.update(id, data).await
    }

    async fn equipment_delete(&self, id: i32) -> AppResult<()> {
        self.equipment.delete(id).await
    }

    async fn equipment_count(&self) -> AppResult<i64> {
        self.equipment.count().await
    }

    async fn categories_list(&self) -> AppResult<Vec<Category>> {
        self.equipment.list_categories().await
    }

    async fn category_create(&self, data: &CreateCategory) -> AppResult<Category> {
        self.equipment.create_category(data).await
    }

    async fn reserved_quantity(&self, equipment_id: i32) -> AppResult<i64> {
        self.requests.reserved_quantity(equipment_id).await
    }

    async fn request_insert(&self, data: &NewRequest) -> AppResult<BorrowRequest> {
        self.requests.insert(data).await
    }

    async fn request_get(&self, id: i32) -> AppResult<BorrowRequest> {
        self.requests.get_by_id(id).await
    }

    async fn request_list(&self, filter: &RequestFilter) -> AppResult<Vec<BorrowRequest>> {
        self.requests.list(filter).await
    }

    async fn request_set_status(&self, id: i32, status: RequestStatus) -> AppResult<BorrowRequest> {
        self.requests.set_status(id, status).await
    }

    async fn request_delete_pending(&self, id: i32, user_id: i32) -> AppResult<bool> {
        self.requests.delete_pending(id, user_id).await
    }

    async fn request_count_by_status(&self, status: RequestStatus) -> AppResult<i64> {
        self.requests.count_by_status(status).await
    }

    async fn user_get(&self, id: i32) -> AppResult<User> {
        self.users.get_by_id(id).await
    }

    async fn user_get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.users.get_by_username(username).await
    }

    async fn user_groups(&self, user_id: i32) -> AppResult<Vec<String>> {
        self.users.groups(user_id).await
    }

    async fn user_create(&self, data: &NewUser, group: &str) -> AppResult<User> {
        self.users.create(data, group).await
    }

    async fn user_list(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }

    async fn user_list_in_group(&self, group: &str) -> AppResult<Vec<User>> {
        self.users.list_in_group(group).await
    }

    async fn user_update(&self, id: i32, data: &UpdateUser) -> AppResult<User> {
        self.users.update(id, data).await
    }

    async fn user_delete(&self, id: i32) -> AppResult<()> {
        self.users.delete(id).await
    }

    async fn user_count(&self) -> AppResult<i64> {
        self.users.count().await
    }
}
