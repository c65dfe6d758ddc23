// src/models/room.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub location: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inverte o estado ativo e entrega o valor novo a quem grava.
pub async fn persist_toggle<F, Fut>(status: &mut bool, save: F) -> Result<(), AppError>
where
    F: FnOnce(bool) -> Fut,
    Fut: Future<Output = Result<(), AppError>>,
{
    let flipped = !*status;
    save(flipped).await?;
    *status = flipped;
    Ok(())
}

/// Ações que a interface mostra para recursos com estado ativo/inativo.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceActions {
    pub edit: bool,
    pub toggle_status: bool,
    pub status_label: String,
}

impl ResourceActions {
    pub fn for_status(active: bool) -> Self {
        Self {
            edit: true,
            toggle_status: true,
            status_label: if active { "Deactivate" } else { "Activate" }.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomView {
    #[serde(flatten)]
    pub room: Room,
    pub actions: ResourceActions,
}

impl From<Room> for RoomView {
    fn from(room: Room) -> Self {
        let actions = ResourceActions::for_status(room.status);
        Self { room, actions }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoomPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Sala Zen")]
    pub name: String,
    #[validate(range(min = 1, message = "Capacity must be a positive integer."))]
    #[serde(default = "default_capacity")]
    pub capacity: i32,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRoomPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[validate(range(min = 1, message = "Capacity must be a positive integer."))]
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub status: Option<bool>,
}

fn default_capacity() -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(status: bool) -> Room {
        Room {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Sala 1".into(),
            capacity: 4,
            location: "Piso 0".into(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn toggle_saves_the_flipped_status() {
        let mut r = room(true);
        let mut saved = Vec::new();

        persist_toggle(&mut r.status, |status| {
            saved.push(status);
            async { Ok(()) }
        })
        .await
        .unwrap();
        assert!(!r.status);

        persist_toggle(&mut r.status, |status| {
            saved.push(status);
            async { Ok(()) }
        })
        .await
        .unwrap();
        assert!(r.status);
        assert_eq!(saved, vec![false, true]);
    }

    #[tokio::test]
    async fn failed_save_keeps_status() {
        let mut r = room(true);
        let result = persist_toggle(&mut r.status, |_| async { Err(AppError::NotFound("Room")) }).await;

        assert!(matches!(result, Err(AppError::NotFound("Room"))));
        assert!(r.status);
    }

    #[test]
    fn actions_label_follows_status() {
        assert_eq!(RoomView::from(room(true)).actions.status_label, "Deactivate");
        assert_eq!(RoomView::from(room(false)).actions.status_label, "Activate");
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let payload = CreateRoomPayload {
            name: "Sala".into(),
            capacity: 0,
            location: String::new(),
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("capacity"));
    }
}
