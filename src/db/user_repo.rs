// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{UpdateProfilePayload, User},
};

const USER_COLUMNS: &str = r#"
    id, email, password_hash, full_name, contact_number, personal_mobile,
    show_mobile_in_app, bio, street, city, state, country, zipcode,
    created_at, updated_at
"#;

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email<'e, E>(&self, executor: E, email: &str) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM users WHERE lower(email) = lower($1)", USER_COLUMNS);
        let maybe_user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(executor)
            .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let maybe_user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário; e-mail duplicado vira EmailAlreadyExists.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        full_name: &str,
        contact_number: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO users (email, password_hash, full_name, contact_number)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .bind(full_name)
            .bind(contact_number)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return AppError::EmailAlreadyExists;
                    }
                }
                e.into()
            })
    }

    /// Atualiza apenas os campos presentes (COALESCE mantém o valor atual).
    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        payload: &UpdateProfilePayload,
        password_hash: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                password_hash = COALESCE($3, password_hash),
                contact_number = COALESCE($4, contact_number),
                personal_mobile = COALESCE($5, personal_mobile),
                show_mobile_in_app = COALESCE($6, show_mobile_in_app),
                bio = COALESCE($7, bio),
                street = COALESCE($8, street),
                city = COALESCE($9, city),
                state = COALESCE($10, state),
                country = COALESCE($11, country),
                zipcode = COALESCE($12, zipcode),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(payload.full_name.as_deref())
            .bind(password_hash)
            .bind(payload.contact_number.as_deref())
            .bind(payload.personal_mobile.as_deref())
            .bind(payload.show_mobile_in_app)
            .bind(payload.bio.as_deref())
            .bind(payload.street.as_deref())
            .bind(payload.city.as_deref())
            .bind(payload.state.as_deref())
            .bind(payload.country.as_deref())
            .bind(payload.zipcode.as_deref())
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }
}
