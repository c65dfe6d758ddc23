// src/services/catalog_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, TeamRepository},
    models::catalog::{
        Category, CategoryDetail, CategoryPayload, CreateServicePayload, Service, ServiceDetail,
        UpdateServicePayload,
    },
};

#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
    team_repo: TeamRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository, team_repo: TeamRepository, pool: PgPool) -> Self {
        Self {
            catalog_repo,
            team_repo,
            pool,
        }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories(&self, tenant_id: Uuid) -> Result<Vec<CategoryDetail>, AppError> {
        let categories = self.catalog_repo.list_categories(tenant_id).await?;
        let services = self.catalog_repo.list_services(tenant_id, None).await?;
        Ok(group_by_category(categories, services))
    }

    pub async fn get_category(&self, tenant_id: Uuid, id: Uuid) -> Result<CategoryDetail, AppError> {
        let category = self
            .catalog_repo
            .find_category(tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("Category"))?;
        self.category_detail(category).await
    }

    pub async fn create_category(
        &self,
        tenant_id: Uuid,
        payload: &CategoryPayload,
    ) -> Result<CategoryDetail, AppError> {
        let category = self
            .catalog_repo
            .create_category(tenant_id, &payload.name, payload.status)
            .await?;
        Ok(CategoryDetail {
            category,
            services: Vec::new(),
        })
    }

    pub async fn update_category(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: &CategoryPayload,
    ) -> Result<CategoryDetail, AppError> {
        let category = self
            .catalog_repo
            .update_category(tenant_id, id, &payload.name, payload.status)
            .await?;
        self.category_detail(category).await
    }

    pub async fn delete_category(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.catalog_repo.delete_category(tenant_id, id).await
    }

    async fn category_detail(&self, category: Category) -> Result<CategoryDetail, AppError> {
        let services = self
            .catalog_repo
            .list_services(category.tenant_id, Some(category.id))
            .await?;
        Ok(CategoryDetail { category, services })
    }

    // =========================================================================
    //  SERVIÇOS
    // =========================================================================

    pub async fn list_services(&self, tenant_id: Uuid) -> Result<Vec<ServiceDetail>, AppError> {
        let services = self.catalog_repo.list_services(tenant_id, None).await?;
        let mut details = Vec::with_capacity(services.len());
        for service in services {
            details.push(self.service_detail(service).await?);
        }
        Ok(details)
    }

    pub async fn get_service(&self, tenant_id: Uuid, id: Uuid) -> Result<ServiceDetail, AppError> {
        let service = self
            .catalog_repo
            .find_service(&self.pool, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("Service"))?;
        self.service_detail(service).await
    }

    pub async fn create_service(
        &self,
        tenant_id: Uuid,
        payload: &CreateServicePayload,
    ) -> Result<ServiceDetail, AppError> {
        self.check_category(tenant_id, payload.category_id).await?;

        let mut tx = self.pool.begin().await?;

        let service = self
            .catalog_repo
            .create_service(&mut *tx, tenant_id, payload)
            .await?;

        // Colaboradores têm de ser profissionais deste tenant
        let collaborator_ids = self
            .team_repo
            .filter_professionals(&mut *tx, tenant_id, &payload.collaborator_ids)
            .await?;
        self.catalog_repo
            .replace_collaborators(&mut *tx, service.id, &collaborator_ids)
            .await?;

        tx.commit().await?;

        Ok(ServiceDetail {
            service,
            collaborator_ids,
        })
    }

    pub async fn update_service(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateServicePayload,
    ) -> Result<ServiceDetail, AppError> {
        self.check_category(tenant_id, payload.category_id).await?;

        let mut tx = self.pool.begin().await?;

        let service = self
            .catalog_repo
            .update_service(&mut *tx, tenant_id, id, payload)
            .await?;

        if let Some(ids) = &payload.collaborator_ids {
            let collaborator_ids = self
                .team_repo
                .filter_professionals(&mut *tx, tenant_id, ids)
                .await?;
            self.catalog_repo
                .replace_collaborators(&mut *tx, service.id, &collaborator_ids)
                .await?;
        }

        tx.commit().await?;

        self.service_detail(service).await
    }

    pub async fn delete_service(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.catalog_repo.delete_service(tenant_id, id).await
    }

    async fn check_category(&self, tenant_id: Uuid, category_id: Option<Uuid>) -> Result<(), AppError> {
        if let Some(category_id) = category_id {
            if !self
                .catalog_repo
                .category_exists(&self.pool, tenant_id, category_id)
                .await?
            {
                return Err(AppError::field("category_id", "Invalid category."));
            }
        }
        Ok(())
    }

    async fn service_detail(&self, service: Service) -> Result<ServiceDetail, AppError> {
        let collaborator_ids = self
            .catalog_repo
            .collaborator_ids(&self.pool, service.id)
            .await?;
        Ok(ServiceDetail {
            service,
            collaborator_ids,
        })
    }
}

/// Distribui os serviços pelas respetivas categorias, mantendo a ordem.
pub fn group_by_category(categories: Vec<Category>, services: Vec<Service>) -> Vec<CategoryDetail> {
    let mut by_category: HashMap<Uuid, Vec<Service>> = HashMap::new();
    for service in services {
        if let Some(category_id) = service.category_id {
            by_category.entry(category_id).or_default().push(service);
        }
    }

    categories
        .into_iter()
        .map(|category| {
            let services = by_category.remove(&category.id).unwrap_or_default();
            CategoryDetail { category, services }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn category(name: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            name: name.into(),
            status: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(name: &str, category_id: Option<Uuid>) -> Service {
        Service {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            name: name.into(),
            reference: name.to_uppercase(),
            category_id,
            duration: 30,
            rate: Decimal::ZERO,
            price: Decimal::new(20, 0),
            show_online: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn services_land_in_their_category() {
        let massagens = category("Massagens");
        let yoga = category("Yoga");
        let services = vec![
            service("Shiatsu", Some(massagens.id)),
            service("Hatha", Some(yoga.id)),
            service("Relaxante", Some(massagens.id)),
            service("Avulso", None),
        ];

        let grouped = group_by_category(vec![massagens, yoga], services);

        assert_eq!(grouped.len(), 2);
        let names: Vec<_> = grouped[0].services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Shiatsu", "Relaxante"]);
        assert_eq!(grouped[1].services.len(), 1);
    }

    #[test]
    fn empty_category_still_listed() {
        let grouped = group_by_category(vec![category("Vazia")], Vec::new());
        assert_eq!(grouped.len(), 1);
        assert!(grouped[0].services.is_empty());
    }
}
