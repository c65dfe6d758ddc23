// src/services/room_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RoomRepository,
    models::room::{persist_toggle, CreateRoomPayload, RoomView, UpdateRoomPayload},
};

#[derive(Clone)]
pub struct RoomService {
    repo: RoomRepository,
}

impl RoomService {
    pub fn new(repo: RoomRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<RoomView>, AppError> {
        let rooms = self.repo.list(tenant_id).await?;
        Ok(rooms.into_iter().map(RoomView::from).collect())
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<RoomView, AppError> {
        self.repo
            .find_by_id(tenant_id, id)
            .await?
            .map(RoomView::from)
            .ok_or(AppError::NotFound("Room"))
    }

    pub async fn create(&self, tenant_id: Uuid, payload: &CreateRoomPayload) -> Result<RoomView, AppError> {
        let room = self.repo.create(tenant_id, payload).await?;
        Ok(room.into())
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateRoomPayload,
    ) -> Result<RoomView, AppError> {
        let room = self.repo.update(tenant_id, id, payload).await?;
        Ok(room.into())
    }

    pub async fn toggle_status(&self, tenant_id: Uuid, id: Uuid) -> Result<RoomView, AppError> {
        let mut room = self
            .repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("Room"))?;

        persist_toggle(&mut room.status, |status| self.repo.set_status(tenant_id, id, status)).await?;

        tracing::info!("🚪 Sala {} agora {}", id, if room.status { "ativa" } else { "inativa" });
        Ok(room.into())
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.repo.delete(tenant_id, id).await
    }
}
