// src/services/team_service.rs

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{TeamRepository, TenantRepository, UserRepository},
    models::{
        auth::{Role, UpdateProfilePayload},
        availability::WeeklyAvailability,
        team::{CreateMemberPayload, TeamMember, TeamMemberDetail, UpdateMemberPayload},
    },
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct TeamService {
    team_repo: TeamRepository,
    user_repo: UserRepository,
    tenant_repo: TenantRepository,
    pool: PgPool,
}

impl TeamService {
    pub fn new(
        team_repo: TeamRepository,
        user_repo: UserRepository,
        tenant_repo: TenantRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            team_repo,
            user_repo,
            tenant_repo,
            pool,
        }
    }

    pub async fn list_members(
        &self,
        tenant_id: Uuid,
        role: Option<Role>,
    ) -> Result<Vec<TeamMember>, AppError> {
        self.team_repo.list_members(tenant_id, role).await
    }

    pub async fn get_member(&self, tenant_id: Uuid, user_id: Uuid) -> Result<TeamMemberDetail, AppError> {
        let member = self
            .team_repo
            .find_member(&self.pool, tenant_id, user_id)
            .await?
            .ok_or(AppError::NotFound("Member"))?;

        if member.role != Role::Professional {
            return Ok(TeamMemberDetail {
                member,
                availability: None,
                customer_ids: Vec::new(),
                services_by_category: Default::default(),
            });
        }

        let rows = self
            .team_repo
            .get_availability(&self.pool, tenant_id, user_id)
            .await?;
        let customer_ids = self.team_repo.customer_ids(&self.pool, user_id).await?;
        let services_by_category = self
            .team_repo
            .services_by_category(&self.pool, tenant_id, user_id)
            .await?;

        Ok(TeamMemberDetail {
            member,
            availability: Some(WeeklyAvailability::from_rows(rows)),
            customer_ids,
            services_by_category,
        })
    }

    /// Cria a conta (se ainda não existir) e a associação ao tenant.
    pub async fn create_member(
        &self,
        tenant_id: Uuid,
        payload: &CreateMemberPayload,
    ) -> Result<TeamMemberDetail, AppError> {
        if let Some(availability) = &payload.availability {
            availability.validate()?;
        }

        let existing = self.user_repo.find_by_email(&self.pool, &payload.email).await?;

        // Hash antes da transação: não prende a conexão
        let password_hash = match (&existing, payload.password.as_deref()) {
            (Some(_), _) => None,
            (None, Some(password)) if password.len() >= 6 => Some(hash_password(password).await?),
            (None, _) => {
                return Err(AppError::field(
                    "password",
                    "A password of at least 6 characters is required for new accounts.",
                ));
            }
        };

        let mut tx = self.pool.begin().await?;

        let user = match (existing, password_hash) {
            (Some(user), _) => user,
            (None, Some(hash)) => {
                self.user_repo
                    .create_user(
                        &mut *tx,
                        &payload.email,
                        &hash,
                        &payload.full_name,
                        payload.contact_number.as_deref(),
                    )
                    .await?
            }
            (None, None) => return Err(AppError::non_field("Could not create the account.")),
        };

        self.tenant_repo
            .add_member(&mut *tx, tenant_id, user.id, payload.role)
            .await?;
        self.team_repo
            .update_membership(&mut *tx, tenant_id, user.id, None, &payload.membership)
            .await?;

        if payload.role == Role::Professional {
            if let Some(availability) = &payload.availability {
                self.write_availability(&mut *tx, tenant_id, user.id, availability)
                    .await?;
            }
            self.team_repo
                .replace_customers(&mut *tx, tenant_id, user.id, &payload.customer_ids)
                .await?;
            self.team_repo
                .replace_services(&mut *tx, tenant_id, user.id, &payload.category_services)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "👥 Membro {} adicionado ao tenant {} como {}",
            user.id,
            tenant_id,
            payload.role.as_str()
        );
        self.get_member(tenant_id, user.id).await
    }

    pub async fn update_member(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        payload: &UpdateMemberPayload,
    ) -> Result<TeamMemberDetail, AppError> {
        let current = self
            .team_repo
            .find_member(&self.pool, tenant_id, user_id)
            .await?
            .ok_or(AppError::NotFound("Member"))?;

        if let Some(availability) = &payload.availability {
            availability.validate()?;
        }

        let profile = UpdateProfilePayload {
            full_name: payload.full_name.clone(),
            contact_number: payload.contact_number.clone(),
            personal_mobile: payload.personal_mobile.clone(),
            bio: payload.bio.clone(),
            ..Default::default()
        };

        let mut tx = self.pool.begin().await?;

        self.user_repo
            .update_profile(&mut *tx, user_id, &profile, None)
            .await?;
        self.team_repo
            .update_membership(&mut *tx, tenant_id, user_id, payload.role, &payload.membership)
            .await?;

        let role = payload.role.unwrap_or(current.role);
        if role == Role::Professional {
            if let Some(availability) = &payload.availability {
                self.write_availability(&mut *tx, tenant_id, user_id, availability)
                    .await?;
            }
            if let Some(customer_ids) = &payload.customer_ids {
                self.team_repo
                    .replace_customers(&mut *tx, tenant_id, user_id, customer_ids)
                    .await?;
            }
            if let Some(category_services) = &payload.category_services {
                self.team_repo
                    .replace_services(&mut *tx, tenant_id, user_id, category_services)
                    .await?;
            }
        }

        tx.commit().await?;

        self.get_member(tenant_id, user_id).await
    }

    pub async fn remove_member(&self, tenant_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        self.team_repo.remove_member(tenant_id, user_id).await?;
        tracing::info!("👥 Membro {} removido do tenant {}", user_id, tenant_id);
        Ok(())
    }

    /// Aprovar (true) ou cancelar (false) o acesso do membro.
    pub async fn set_active(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        is_active: bool,
    ) -> Result<TeamMember, AppError> {
        self.team_repo.set_active(tenant_id, user_id, is_active).await?;
        self.team_repo
            .find_member(&self.pool, tenant_id, user_id)
            .await?
            .ok_or(AppError::NotFound("Member"))
    }

    pub async fn get_timeslots(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<WeeklyAvailability, AppError> {
        self.ensure_professional(tenant_id, user_id).await?;
        let rows = self
            .team_repo
            .get_availability(&self.pool, tenant_id, user_id)
            .await?;
        Ok(WeeklyAvailability::from_rows(rows))
    }

    pub async fn update_timeslots(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        availability: &WeeklyAvailability,
    ) -> Result<WeeklyAvailability, AppError> {
        availability.validate()?;
        self.ensure_professional(tenant_id, user_id).await?;

        let mut tx = self.pool.begin().await?;
        self.write_availability(&mut *tx, tenant_id, user_id, availability)
            .await?;
        tx.commit().await?;

        self.get_timeslots(tenant_id, user_id).await
    }

    async fn ensure_professional(&self, tenant_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if self
            .team_repo
            .is_professional(&self.pool, tenant_id, user_id)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::NotFound("Professional"))
        }
    }

    async fn write_availability(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        user_id: Uuid,
        availability: &WeeklyAvailability,
    ) -> Result<(), AppError> {
        for (weekday, day) in availability.days() {
            self.team_repo
                .upsert_day(&mut *conn, tenant_id, user_id, weekday, day)
                .await?;
        }
        Ok(())
    }
}
