// src/db/room_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::room::{CreateRoomPayload, Room, UpdateRoomPayload},
};

fn duplicate_name() -> String {
    "A room with this name already exists.".to_string()
}

#[derive(Clone)]
pub struct RoomRepository {
    pool: PgPool,
}

impl RoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<Room>, AppError> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, tenant_id, name, capacity, location, status, created_at, updated_at
            FROM rooms WHERE tenant_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rooms)
    }

    pub async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Room>, AppError> {
        let room = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, tenant_id, name, capacity, location, status, created_at, updated_at
            FROM rooms WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(room)
    }

    pub async fn create(&self, tenant_id: Uuid, payload: &CreateRoomPayload) -> Result<Room, AppError> {
        sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (tenant_id, name, capacity, location)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tenant_id, name, capacity, location, status, created_at, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(&payload.name)
        .bind(payload.capacity)
        .bind(&payload.location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, duplicate_name))
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateRoomPayload,
    ) -> Result<Room, AppError> {
        sqlx::query_as::<_, Room>(
            r#"
            UPDATE rooms SET
                name = COALESCE($3, name),
                capacity = COALESCE($4, capacity),
                location = COALESCE($5, location),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING id, tenant_id, name, capacity, location, status, created_at, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(payload.name.as_deref())
        .bind(payload.capacity)
        .bind(payload.location.as_deref())
        .bind(payload.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, duplicate_name))?
        .ok_or(AppError::NotFound("Room"))
    }

    pub async fn set_status(&self, tenant_id: Uuid, id: Uuid, status: bool) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE rooms SET status = $3, updated_at = NOW() WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Room"));
        }
        Ok(())
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM rooms WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Room"));
        }
        Ok(())
    }
}
