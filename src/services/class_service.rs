// src/services/class_service.rs

use std::collections::HashSet;

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClassRepository, CustomerRepository, TeamRepository},
    models::{
        class::{check_capacity, Class, ClassDetail, CreateClassPayload, UpdateClassPayload},
        room::{persist_toggle, ResourceActions},
    },
};

#[derive(Clone)]
pub struct ClassService {
    class_repo: ClassRepository,
    customer_repo: CustomerRepository,
    team_repo: TeamRepository,
    pool: PgPool,
}

impl ClassService {
    pub fn new(
        class_repo: ClassRepository,
        customer_repo: CustomerRepository,
        team_repo: TeamRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            class_repo,
            customer_repo,
            team_repo,
            pool,
        }
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<ClassDetail>, AppError> {
        let classes = self.class_repo.list(tenant_id, None).await?;
        self.details(classes).await
    }

    pub async fn by_professional(
        &self,
        tenant_id: Uuid,
        professional_id: Option<Uuid>,
    ) -> Result<Vec<ClassDetail>, AppError> {
        let professional_id = professional_id
            .ok_or_else(|| AppError::field("professional_id", "This query parameter is required."))?;

        if !self
            .team_repo
            .is_professional(&self.pool, tenant_id, professional_id)
            .await?
        {
            return Err(AppError::NotFound("Professional"));
        }

        let classes = self.class_repo.list(tenant_id, Some(professional_id)).await?;
        self.details(classes).await
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<ClassDetail, AppError> {
        let class = self.find(tenant_id, id).await?;
        self.detail(class).await
    }

    pub async fn create(&self, tenant_id: Uuid, payload: &CreateClassPayload) -> Result<ClassDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let client_ids = self.tenant_clients(&mut *tx, tenant_id, &payload.client_ids).await?;
        check_capacity(payload.capacity, client_ids.len())?;

        let class = self
            .class_repo
            .create(
                &mut *tx,
                tenant_id,
                &payload.name,
                &payload.description,
                payload.duration,
                payload.capacity,
            )
            .await?;

        let professional_ids = self
            .team_repo
            .filter_professionals(&mut *tx, tenant_id, &payload.professional_ids)
            .await?;
        self.class_repo
            .replace_professionals(&mut *tx, class.id, &professional_ids)
            .await?;

        self.class_repo
            .replace_clients(&mut *tx, class.id, &client_ids)
            .await?;

        tx.commit().await?;

        tracing::info!("📅 Aula {} criada no tenant {}", class.id, tenant_id);
        self.detail(class).await
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateClassPayload,
    ) -> Result<ClassDetail, AppError> {
        let current = self.find(tenant_id, id).await?;

        let mut tx = self.pool.begin().await?;

        let client_ids = match &payload.client_ids {
            Some(ids) => Some(self.tenant_clients(&mut *tx, tenant_id, ids).await?),
            None => None,
        };

        // Sem capacidade nova, vale a guardada
        let capacity = payload.capacity.unwrap_or(current.capacity);
        let client_count = match &client_ids {
            Some(ids) => ids.len(),
            None => self.class_repo.client_ids(&mut *tx, id).await?.len(),
        };
        check_capacity(capacity, client_count)?;

        let class = self
            .class_repo
            .update(&mut *tx, tenant_id, id, payload)
            .await?;

        if let Some(ids) = &payload.professional_ids {
            let professional_ids = self
                .team_repo
                .filter_professionals(&mut *tx, tenant_id, ids)
                .await?;
            self.class_repo
                .replace_professionals(&mut *tx, id, &professional_ids)
                .await?;
        }

        if let Some(client_ids) = &client_ids {
            self.class_repo.replace_clients(&mut *tx, id, client_ids).await?;
        }

        tx.commit().await?;

        self.detail(class).await
    }

    pub async fn toggle_status(&self, tenant_id: Uuid, id: Uuid) -> Result<ClassDetail, AppError> {
        let mut class = self.find(tenant_id, id).await?;
        persist_toggle(&mut class.status, |status| self.class_repo.set_status(tenant_id, id, status))
            .await?;
        self.detail(class).await
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.class_repo.delete(tenant_id, id).await
    }

    async fn find(&self, tenant_id: Uuid, id: Uuid) -> Result<Class, AppError> {
        self.class_repo
            .find_by_id(&self.pool, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("Class"))
    }

    // Ids de clientes que pertencem ao tenant, sem repetidos; os restantes são ignorados
    async fn tenant_clients(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError> {
        let customers = self
            .customer_repo
            .find_many(conn, tenant_id, &distinct_ids(ids))
            .await?;
        Ok(customers.into_iter().map(|c| c.id).collect())
    }

    async fn detail(&self, class: Class) -> Result<ClassDetail, AppError> {
        let professional_ids = self.class_repo.professional_ids(&self.pool, class.id).await?;
        let client_ids = self.class_repo.client_ids(&self.pool, class.id).await?;
        let clients = self
            .customer_repo
            .find_many(&self.pool, class.tenant_id, &client_ids)
            .await?;

        let actions = ResourceActions::for_status(class.status);
        Ok(ClassDetail {
            class,
            professional_ids,
            clients,
            actions,
        })
    }

    async fn details(&self, classes: Vec<Class>) -> Result<Vec<ClassDetail>, AppError> {
        let mut details = Vec::with_capacity(classes.len());
        for class in classes {
            details.push(self.detail(class).await?);
        }
        Ok(details)
    }
}

/// Remove ids repetidos mantendo a ordem de chegada.
fn distinct_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_clients_count_once_against_capacity() {
        let ana = Uuid::new_v4();
        let rui = Uuid::new_v4();
        let ids = distinct_ids(&[ana, rui, ana, ana]);

        assert_eq!(ids, vec![ana, rui]);
        assert!(check_capacity(2, ids.len()).is_ok());
        assert!(check_capacity(2, 4).is_err());
    }
}
