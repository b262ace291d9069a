//! Borrow requests repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::DUPLICATE_REQUEST;
use crate::{
    error::{AppError, AppResult},
    models::{
        request::{BorrowRequest, NewRequest, RequestFilter},
        RequestStatus,
    },
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Units of an item held by approved or in-use requests, regardless of
    /// their time window
    pub async fn reserved_quantity(&self, equipment_id: i32) -> AppResult<i64> {
        let codes: Vec<&str> = RequestStatus::RESERVING.iter().map(|s| s.code()).collect();
        let reserved: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity), 0)::bigint FROM requests
            WHERE equipment_id = $1 AND status = ANY($2)
            "#,
        )
        .bind(equipment_id)
        .bind(&codes)
        .fetch_one(&self.pool)
        .await?;
        Ok(reserved)
    }

    /// Insert a new pending request
    pub async fn insert(&self, data: &NewRequest) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO requests (user_id, equipment_id, quantity, start_dt, end_dt, status, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.equipment_id)
        .bind(data.quantity)
        .bind(data.start_dt)
        .bind(data.end_dt)
        .bind(RequestStatus::Pending)
        .bind(&data.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::on_constraint(e, "requests_unique_window", DUPLICATE_REQUEST))
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// List requests, newest first
    pub async fn list(&self, filter: &RequestFilter) -> AppResult<Vec<BorrowRequest>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if filter.user_id.is_some() {
            conditions.push(format!("user_id = ${}", idx));
            idx += 1;
        }
        if filter.equipment_id.is_some() {
            conditions.push(format!("equipment_id = ${}", idx));
            idx += 1;
        }
        if filter.status.is_some() {
            conditions.push(format!("status = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM requests {} ORDER BY created_at DESC, id DESC",
            where_clause
        );

        let mut builder = sqlx::query_as::<_, BorrowRequest>(&sql);
        if let Some(user_id) = filter.user_id {
            builder = builder.bind(user_id);
        }
        if let Some(equipment_id) = filter.equipment_id {
            builder = builder.bind(equipment_id);
        }
        if let Some(status) = filter.status {
            builder = builder.bind(status);
        }

        Ok(builder.fetch_all(&self.pool).await?)
    }

    /// Overwrite the status of a request and bump `updated_at`
    pub async fn set_status(&self, id: i32, status: RequestStatus) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>(
            "UPDATE requests SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// Delete a pending request owned by `user_id`
    pub async fn delete_pending(&self, id: i32, user_id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1 AND user_id = $2 AND status = $3")
            .bind(id)
            .bind(user_id)
            .bind(RequestStatus::Pending)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_status(&self, status: RequestStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
