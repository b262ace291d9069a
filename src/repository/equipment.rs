//! Equipment repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::{DUPLICATE_CATEGORY, DUPLICATE_SERIAL, EQUIPMENT_IN_USE, UNKNOWN_CATEGORY};
use crate::{
    error::{AppError, AppResult},
    models::equipment::{
        Category, CreateCategory, CreateEquipment, Equipment, EquipmentOrdering, EquipmentQuery,
        UpdateEquipment,
    },
};

/// WHERE clause for an equipment listing, numbering placeholders in bind order
/// (search, category, status). The search term is matched literally, so `%`
/// and `_` carry no wildcard meaning.
fn where_clause(query: &EquipmentQuery) -> String {
    let mut conditions = Vec::new();
    let mut idx = 1;

    if query.search.is_some() {
        conditions.push(format!(
            "(strpos(LOWER(name), ${0}) > 0 OR strpos(LOWER(serial_number), ${0}) > 0 \
             OR strpos(LOWER(COALESCE(model, '')), ${0}) > 0)",
            idx
        ));
        idx += 1;
    }
    if query.category_id.is_some() {
        conditions.push(format!("category_id = ${}", idx));
        idx += 1;
    }
    if query.status.is_some() {
        conditions.push(format!("status = ${}", idx));
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

/// Constraints an equipment insert or update can violate
const WRITE_CONSTRAINTS: &[(&str, &str)] = &[
    ("equipment_serial_number_key", DUPLICATE_SERIAL),
    ("equipment_category_id_fkey", UNKNOWN_CATEGORY),
];

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List equipment matching the query
    pub async fn list(
        &self,
        query: &EquipmentQuery,
        ordering: EquipmentOrdering,
    ) -> AppResult<Vec<Equipment>> {
        let filter = where_clause(query);

        let sql = format!(
            "SELECT * FROM equipment {} ORDER BY {}",
            filter,
            ordering.sql()
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&sql);
        if let Some(ref search) = query.search {
            builder = builder.bind(search.to_lowercase());
        }
        if let Some(category_id) = query.category_id {
            builder = builder.bind(category_id);
        }
        if let Some(status) = query.status {
            builder = builder.bind(status);
        }

        Ok(builder.fetch_all(&self.pool).await?)
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Create equipment
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (
                serial_number, name, model, description, category_id, location,
                quantity_total, status, warranty_until, last_maintenance
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&data.serial_number)
        .bind(&data.name)
        .bind(&data.model)
        .bind(&data.description)
        .bind(data.category_id)
        .bind(&data.location)
        .bind(data.quantity_total)
        .bind(data.status.unwrap_or_default())
        .bind(data.warranty_until)
        .bind(data.last_maintenance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::on_constraints(e, WRITE_CONSTRAINTS))
    }

    /// Update equipment, touching only the provided fields
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.serial_number, "serial_number");
        add_field!(data.name, "name");
        add_field!(data.model, "model");
        add_field!(data.description, "description");
        add_field!(data.category_id, "category_id");
        add_field!(data.location, "location");
        add_field!(data.quantity_total, "quantity_total");
        add_field!(data.status, "status");
        add_field!(data.warranty_until, "warranty_until");
        add_field!(data.last_maintenance, "last_maintenance");

        let query = format!(
            "UPDATE equipment SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.serial_number);
        bind_field!(data.name);
        bind_field!(data.model);
        bind_field!(data.description);
        bind_field!(data.category_id);
        bind_field!(data.location);
        bind_field!(data.quantity_total);
        bind_field!(data.status);
        bind_field!(data.warranty_until);
        bind_field!(data.last_maintenance);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::on_constraints(e, WRITE_CONSTRAINTS))?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Delete equipment. Fails while any request still references it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::on_constraint(e, "requests_equipment_id_fkey", EQUIPMENT_IN_USE))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM equipment")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create_category(&self, data: &CreateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING *")
            .bind(&data.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::on_constraint(e, "categories_name_key", DUPLICATE_CATEGORY))
    }
}
