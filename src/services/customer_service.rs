// src/services/customer_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, TeamRepository},
    models::{
        customer::{CreateCustomerPayload, Customer, CustomerDetail, UpdateCustomerPayload},
        tenancy::Membership,
    },
};

#[derive(Clone)]
pub struct CustomerService {
    customer_repo: CustomerRepository,
    team_repo: TeamRepository,
    pool: PgPool,
}

impl CustomerService {
    pub fn new(customer_repo: CustomerRepository, team_repo: TeamRepository, pool: PgPool) -> Self {
        Self {
            customer_repo,
            team_repo,
            pool,
        }
    }

    /// Admin vê todos; profissional só os seus; colaborador nenhum.
    pub async fn list(&self, tenant_id: Uuid, member: &Membership) -> Result<Vec<Customer>, AppError> {
        if member.is_admin() {
            self.customer_repo.list(tenant_id, None).await
        } else if member.is_professional() {
            self.customer_repo.list(tenant_id, Some(member.user_id)).await
        } else {
            Ok(Vec::new())
        }
    }

    pub async fn by_professional(
        &self,
        tenant_id: Uuid,
        professional_id: Option<Uuid>,
    ) -> Result<Vec<Customer>, AppError> {
        let professional_id = professional_id
            .ok_or_else(|| AppError::field("professional_id", "This query parameter is required."))?;

        if !self
            .team_repo
            .is_professional(&self.pool, tenant_id, professional_id)
            .await?
        {
            return Err(AppError::NotFound("Professional"));
        }

        self.customer_repo.list(tenant_id, Some(professional_id)).await
    }

    pub async fn get(
        &self,
        tenant_id: Uuid,
        member: &Membership,
        id: Uuid,
    ) -> Result<CustomerDetail, AppError> {
        let customer = self.visible_customer(tenant_id, member, id).await?;
        self.detail(customer).await
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        member: &Membership,
        payload: &CreateCustomerPayload,
    ) -> Result<CustomerDetail, AppError> {
        // Profissional fica sempre ligado ao cliente que cria
        let professional_ids = if member.is_admin() {
            self.team_repo
                .filter_professionals(&self.pool, tenant_id, &payload.professional_ids)
                .await?
        } else if member.is_professional() {
            vec![member.user_id]
        } else {
            return Err(AppError::Forbidden(
                "Only admins and professionals can create clients.".to_string(),
            ));
        };

        let mut tx = self.pool.begin().await?;

        let customer = self
            .customer_repo
            .create(
                &mut *tx,
                tenant_id,
                &payload.full_name,
                &payload.email,
                payload.contact_number.as_deref(),
            )
            .await?;

        self.customer_repo
            .replace_professionals(&mut *tx, customer.id, &professional_ids)
            .await?;

        tx.commit().await?;

        Ok(CustomerDetail {
            customer,
            professional_ids,
        })
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        member: &Membership,
        id: Uuid,
        payload: &UpdateCustomerPayload,
    ) -> Result<CustomerDetail, AppError> {
        self.visible_customer(tenant_id, member, id).await?;

        let mut tx = self.pool.begin().await?;

        let customer = self
            .customer_repo
            .update(&mut *tx, tenant_id, id, payload)
            .await?;

        // Só o admin redistribui clientes entre profissionais
        if let (true, Some(ids)) = (member.is_admin(), &payload.professional_ids) {
            let professional_ids = self
                .team_repo
                .filter_professionals(&mut *tx, tenant_id, ids)
                .await?;
            self.customer_repo
                .replace_professionals(&mut *tx, id, &professional_ids)
                .await?;
        }

        tx.commit().await?;

        self.detail(customer).await
    }

    pub async fn delete(&self, tenant_id: Uuid, member: &Membership, id: Uuid) -> Result<(), AppError> {
        self.visible_customer(tenant_id, member, id).await?;
        self.customer_repo.delete(tenant_id, id).await
    }

    async fn visible_customer(
        &self,
        tenant_id: Uuid,
        member: &Membership,
        id: Uuid,
    ) -> Result<Customer, AppError> {
        let customer = self
            .customer_repo
            .find_by_id(&self.pool, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("Client"))?;

        let visible = member.is_admin()
            || (member.is_professional()
                && self
                    .customer_repo
                    .is_linked(&self.pool, id, member.user_id)
                    .await?);

        if !visible {
            return Err(AppError::NotFound("Client"));
        }
        Ok(customer)
    }

    async fn detail(&self, customer: Customer) -> Result<CustomerDetail, AppError> {
        let professional_ids = self
            .customer_repo
            .professional_ids(&self.pool, customer.id)
            .await?;
        Ok(CustomerDetail {
            customer,
            professional_ids,
        })
    }
}
