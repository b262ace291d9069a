//! Shared test utilities: an in-memory `Store` and fixtures.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use crate::{
    config::{AppConfig, AuthConfig},
    error::{AppError, AppResult},
    models::{
        equipment::{
            Category, CreateCategory, CreateEquipment, Equipment, EquipmentOrdering,
            EquipmentQuery, EquipmentWithAvailability, UpdateEquipment,
        },
        request::{BorrowRequest, CreateRequest, NewRequest, RequestFilter},
        user::{
            Identity, NewUser, Role, UpdateUser, User, ADMINISTRATOR_GROUP, EMPLOYEE_GROUP,
            MANAGER_GROUP,
        },
        EquipmentStatus, RequestStatus,
    },
    repository::{
        Store, DUPLICATE_CATEGORY, DUPLICATE_REQUEST, DUPLICATE_SERIAL, DUPLICATE_USERNAME,
        EQUIPMENT_IN_USE, UNKNOWN_CATEGORY,
    },
    services::{availability, Services},
    AppState,
};

#[derive(Default)]
struct MemoryData {
    next_id: i32,
    equipment: Vec<Equipment>,
    categories: Vec<Category>,
    requests: Vec<BorrowRequest>,
    users: Vec<User>,
    memberships: Vec<(i32, String)>,
}

impl MemoryData {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn check_category(&self, category_id: Option<i32>) -> AppResult<()> {
        match category_id {
            Some(id) if !self.categories.iter().any(|c| c.id == id) => {
                Err(AppError::Conflict(UNKNOWN_CATEGORY.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// `Store` backed by vectors behind a mutex, enforcing the same constraints
/// as the SQL schema.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn add_to_group(&self, user_id: i32, group: &str) {
        let mut data = self.data.lock().unwrap();
        data.memberships.push((user_id, group.to_string()));
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn equipment_list(
        &self,
        query: &EquipmentQuery,
        ordering: EquipmentOrdering,
    ) -> AppResult<Vec<Equipment>> {
        let data = self.data.lock().unwrap();
        let mut items: Vec<Equipment> =
            data.equipment.iter().filter(|e| query.matches(e)).cloned().collect();
        match ordering {
            EquipmentOrdering::NameAsc => items.sort_by(|a, b| a.name.cmp(&b.name)),
            EquipmentOrdering::NameDesc => items.sort_by(|a, b| b.name.cmp(&a.name)),
            EquipmentOrdering::QuantityAsc => items.sort_by_key(|e| e.quantity_total),
            EquipmentOrdering::QuantityDesc => {
                items.sort_by(|a, b| b.quantity_total.cmp(&a.quantity_total))
            }
            EquipmentOrdering::CreatedAsc => items.sort_by_key(|e| (e.created_at, e.id)),
            EquipmentOrdering::CreatedDesc => {
                items.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)))
            }
        }
        Ok(items)
    }

    async fn equipment_get(&self, id: i32) -> AppResult<Equipment> {
        let data = self.data.lock().unwrap();
        data.equipment
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    async fn equipment_create(&self, input: &CreateEquipment) -> AppResult<Equipment> {
        let mut data = self.data.lock().unwrap();
        if data.equipment.iter().any(|e| e.serial_number == input.serial_number) {
            return Err(AppError::Conflict(DUPLICATE_SERIAL.to_string()));
        }
        data.check_category(input.category_id)?;
        let now = Utc::now();
        let equipment = Equipment {
            id: data.next_id(),
            serial_number: input.serial_number.clone(),
            name: input.name.clone(),
            model: input.model.clone(),
            description: input.description.clone(),
            category_id: input.category_id,
            location: input.location.clone(),
            quantity_total: input.quantity_total,
            status: input.status.unwrap_or_default(),
            warranty_until: input.warranty_until,
            last_maintenance: input.last_maintenance,
            created_at: now,
            updated_at: now,
        };
        data.equipment.push(equipment.clone());
        Ok(equipment)
    }

    async fn equipment_update(&self, id: i32, input: &UpdateEquipment) -> AppResult<Equipment> {
        let mut data = self.data.lock().unwrap();
        if let Some(ref serial) = input.serial_number {
            if data.equipment.iter().any(|e| e.id != id && &e.serial_number == serial) {
                return Err(AppError::Conflict(DUPLICATE_SERIAL.to_string()));
            }
        }
        if let Some(category_id) = input.category_id {
            data.check_category(category_id)?;
        }
        let equipment = data
            .equipment
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;

        if let Some(ref v) = input.serial_number {
            equipment.serial_number = v.clone();
        }
        if let Some(ref v) = input.name {
            equipment.name = v.clone();
        }
        if let Some(ref v) = input.model {
            equipment.model = v.clone();
        }
        if let Some(ref v) = input.description {
            equipment.description = v.clone();
        }
        if let Some(v) = input.category_id {
            equipment.category_id = v;
        }
        if let Some(ref v) = input.location {
            equipment.location = v.clone();
        }
        if let Some(v) = input.quantity_total {
            equipment.quantity_total = v;
        }
        if let Some(v) = input.status {
            equipment.status = v;
        }
        if let Some(v) = input.warranty_until {
            equipment.warranty_until = v;
        }
        if let Some(v) = input.last_maintenance {
            equipment.last_maintenance = v;
        }
        equipment.updated_at = Utc::now();
        Ok(equipment.clone())
    }

    async fn equipment_delete(&self, id: i32) -> AppResult<()> {
        let mut data = self.data.lock().unwrap();
        if data.requests.iter().any(|r| r.equipment_id == id) {
            return Err(AppError::Conflict(EQUIPMENT_IN_USE.to_string()));
        }
        let before = data.equipment.len();
        data.equipment.retain(|e| e.id != id);
        if data.equipment.len() == before {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    async fn equipment_count(&self) -> AppResult<i64> {
        Ok(self.data.lock().unwrap().equipment.len() as i64)
    }

    async fn categories_list(&self) -> AppResult<Vec<Category>> {
        let mut categories = self.data.lock().unwrap().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn category_create(&self, input: &CreateCategory) -> AppResult<Category> {
        let mut data = self.data.lock().unwrap();
        if data.categories.iter().any(|c| c.name == input.name) {
            return Err(AppError::Conflict(DUPLICATE_CATEGORY.to_string()));
        }
        let category = Category {
            id: data.next_id(),
            name: input.name.clone(),
        };
        data.categories.push(category.clone());
        Ok(category)
    }

    async fn reserved_quantity(&self, equipment_id: i32) -> AppResult<i64> {
        let data = self.data.lock().unwrap();
        Ok(availability::reserved_quantity(
            data.requests.iter().filter(|r| r.equipment_id == equipment_id),
        ))
    }

    async fn request_insert(&self, input: &NewRequest) -> AppResult<BorrowRequest> {
        let mut data = self.data.lock().unwrap();
        let duplicate = data.requests.iter().any(|r| {
            r.equipment_id == input.equipment_id
                && r.start_dt == input.start_dt
                && r.end_dt == input.end_dt
        });
        if duplicate {
            return Err(AppError::Conflict(DUPLICATE_REQUEST.to_string()));
        }
        let now = Utc::now();
        let request = BorrowRequest {
            id: data.next_id(),
            user_id: input.user_id,
            equipment_id: input.equipment_id,
            quantity: input.quantity,
            start_dt: input.start_dt,
            end_dt: input.end_dt,
            status: RequestStatus::Pending,
            comment: input.comment.clone(),
            created_at: now,
            updated_at: now,
        };
        data.requests.push(request.clone());
        Ok(request)
    }

    async fn request_get(&self, id: i32) -> AppResult<BorrowRequest> {
        let data = self.data.lock().unwrap();
        data.requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    async fn request_list(&self, filter: &RequestFilter) -> AppResult<Vec<BorrowRequest>> {
        let data = self.data.lock().unwrap();
        let mut requests: Vec<BorrowRequest> =
            data.requests.iter().filter(|r| filter.matches(r)).cloned().collect();
        requests.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(requests)
    }

    async fn request_set_status(&self, id: i32, status: RequestStatus) -> AppResult<BorrowRequest> {
        let mut data = self.data.lock().unwrap();
        let request = data
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))?;
        request.status = status;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    async fn request_delete_pending(&self, id: i32, user_id: i32) -> AppResult<bool> {
        let mut data = self.data.lock().unwrap();
        let before = data.requests.len();
        data.requests.retain(|r| {
            !(r.id == id && r.user_id == user_id && r.status == RequestStatus::Pending)
        });
        Ok(data.requests.len() < before)
    }

    async fn request_count_by_status(&self, status: RequestStatus) -> AppResult<i64> {
        let data = self.data.lock().unwrap();
        Ok(data.requests.iter().filter(|r| r.status == status).count() as i64)
    }

    async fn user_get(&self, id: i32) -> AppResult<User> {
        let data = self.data.lock().unwrap();
        data.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    async fn user_get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn user_groups(&self, user_id: i32) -> AppResult<Vec<String>> {
        let data = self.data.lock().unwrap();
        let mut groups: Vec<String> = data
            .memberships
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, g)| g.clone())
            .collect();
        groups.sort();
        Ok(groups)
    }

    async fn user_create(&self, input: &NewUser, group: &str) -> AppResult<User> {
        let mut data = self.data.lock().unwrap();
        if data.users.iter().any(|u| u.username.eq_ignore_ascii_case(&input.username)) {
            return Err(AppError::Conflict(DUPLICATE_USERNAME.to_string()));
        }
        let user = User {
            id: data.next_id(),
            username: input.username.clone(),
            password: input.password_hash.clone(),
            email: input.email.clone(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            is_superuser: false,
            is_active: true,
            date_joined: Utc::now(),
        };
        data.users.push(user.clone());
        data.memberships.push((user.id, group.to_string()));
        Ok(user)
    }

    async fn user_list(&self) -> AppResult<Vec<User>> {
        let mut users = self.data.lock().unwrap().users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn user_list_in_group(&self, group: &str) -> AppResult<Vec<User>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .users
            .iter()
            .filter(|u| data.memberships.iter().any(|(id, g)| *id == u.id && g == group))
            .cloned()
            .collect())
    }

    async fn user_update(&self, id: i32, input: &UpdateUser) -> AppResult<User> {
        let mut data = self.data.lock().unwrap();
        let user = data
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;
        if let Some(ref v) = input.username {
            user.username = v.clone();
        }
        if input.email.is_some() {
            user.email = input.email.clone();
        }
        if input.first_name.is_some() {
            user.first_name = input.first_name.clone();
        }
        if input.last_name.is_some() {
            user.last_name = input.last_name.clone();
        }
        if let Some(v) = input.is_active {
            user.is_active = v;
        }
        Ok(user.clone())
    }

    async fn user_delete(&self, id: i32) -> AppResult<()> {
        let mut data = self.data.lock().unwrap();
        let before = data.users.len();
        data.users.retain(|u| u.id != id);
        if data.users.len() == before {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        data.memberships.retain(|(user_id, _)| *user_id != id);
        data.requests.retain(|r| r.user_id != id);
        Ok(())
    }

    async fn user_count(&self) -> AppResult<i64> {
        Ok(self.data.lock().unwrap().users.len() as i64)
    }
}

/// Services wired to a fresh `MemoryStore`
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub services: Services,
    pub config: AppConfig,
    windows: AtomicI64,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let config = AppConfig {
            auth: AuthConfig {
                jwt_secret: "test-secret".to_string(),
                jwt_expiration_hours: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let services = Services::new(store.clone(), config.auth.clone());
        Self {
            store,
            services,
            config,
            windows: AtomicI64::new(0),
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            config: Arc::new(self.config.clone()),
            services: Arc::new(self.services.clone()),
        }
    }

    /// Create a user directly in the store (no password hashing)
    pub async fn user_with_role(&self, username: &str, role: Role) -> Identity {
        let group = match role {
            Role::Administrator => ADMINISTRATOR_GROUP,
            Role::Manager => MANAGER_GROUP,
            Role::Employee => EMPLOYEE_GROUP,
        };
        let user = self
            .store
            .user_create(
                &NewUser {
                    username: username.to_string(),
                    password_hash: "!".to_string(),
                    email: None,
                    first_name: None,
                    last_name: None,
                },
                group,
            )
            .await
            .unwrap();
        Identity {
            user_id: user.id,
            username: user.username,
            role,
            groups: vec![group.to_string()],
        }
    }

    pub async fn employee(&self, username: &str) -> Identity {
        self.user_with_role(username, Role::Employee).await
    }

    pub fn token_for(&self, identity: &Identity) -> String {
        let user = User {
            id: identity.user_id,
            username: identity.username.clone(),
            password: String::new(),
            email: None,
            first_name: None,
            last_name: None,
            is_superuser: false,
            is_active: true,
            date_joined: Utc::now(),
        };
        self.services.users.issue_token(&user).unwrap()
    }

    pub async fn create_equipment(&self, name: &str, quantity_total: i32) -> EquipmentWithAvailability {
        self.services
            .equipment
            .create(&create_equipment_data(name, quantity_total))
            .await
            .unwrap()
    }

    /// Submit a request on a window no other call of this context has used
    pub async fn submit(&self, requester: &Identity, equipment_id: i32, quantity: i32) -> AppResult<BorrowRequest> {
        let n = self.windows.fetch_add(1, Ordering::SeqCst);
        let start = base_time() + Duration::days(n);
        self.services
            .requests
            .submit(
                requester,
                CreateRequest {
                    equipment_id,
                    quantity,
                    start_dt: start,
                    end_dt: start + Duration::hours(4),
                    comment: None,
                },
            )
            .await
    }

    pub async fn available(&self, equipment_id: i32) -> i64 {
        self.services.equipment.get(equipment_id).await.unwrap().quantity_available
    }
}

fn base_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap()
}

pub fn create_equipment_data(name: &str, quantity_total: i32) -> CreateEquipment {
    CreateEquipment {
        serial_number: format!("SN-{}", name.to_uppercase().replace(' ', "-")),
        name: name.to_string(),
        model: None,
        description: None,
        category_id: None,
        location: Some("Room A".to_string()),
        quantity_total,
        status: None,
        warranty_until: None,
        last_maintenance: None,
    }
}

pub fn equipment(id: i32, quantity_total: i32) -> Equipment {
    let now = Utc::now();
    Equipment {
        id,
        serial_number: format!("SN-{}", id),
        name: format!("Equipment {}", id),
        model: None,
        description: None,
        category_id: None,
        location: None,
        quantity_total,
        status: EquipmentStatus::Available,
        warranty_until: None,
        last_maintenance: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn request(id: i32, quantity: i32, status: RequestStatus) -> BorrowRequest {
    let start = base_time();
    BorrowRequest {
        id,
        user_id: 1,
        equipment_id: 1,
        quantity,
        start_dt: start,
        end_dt: start + Duration::hours(2),
        status,
        comment: None,
        created_at: start,
        updated_at: start,
    }
}
