// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{AuthResponse, Claims, RegisterUserPayload, UpdateProfilePayload, User},
};

const TOKEN_TTL_DAYS: i64 = 7;

/// Gera o hash bcrypt numa thread de bloqueio.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub fn encode_token(secret: &str, user_id: Uuid, now: DateTime<Utc>) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id,
        exp: (now + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

/// Valida assinatura e expiração. Não toca no banco.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, pool }
    }

    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<AuthResponse, AppError> {
        let hashed_password = hash_password(&payload.password).await?;

        let user = self
            .user_repo
            .create_user(
                &self.pool,
                &payload.email,
                &hashed_password,
                &payload.full_name,
                payload.contact_number.as_deref(),
            )
            .await?;

        tracing::info!("👤 Novo usuário registrado: {}", user.id);
        self.auth_response(user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(&self.pool, email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.auth_response(user)
    }

    pub fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        decode_token(&self.jwt_secret, token)
    }

    /// Usuário dono das claims; conta apagada invalida o token.
    pub async fn user_for_claims(&self, claims: &Claims) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_claims(token)?;
        self.user_for_claims(&claims).await
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        payload: &UpdateProfilePayload,
    ) -> Result<User, AppError> {
        let password_hash = match payload.password.as_deref() {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        self.user_repo
            .update_profile(
                &self.pool,
                user_id,
                payload,
                password_hash.as_deref(),
            )
            .await
    }

    pub async fn delete_account(&self, user_id: Uuid) -> Result<(), AppError> {
        self.user_repo.delete_user(user_id).await?;
        tracing::info!("🗑️ Conta removida: {}", user_id);
        Ok(())
    }

    fn auth_response(&self, user: User) -> Result<AuthResponse, AppError> {
        let token = encode_token(&self.jwt_secret, user.id, Utc::now())?;
        Ok(AuthResponse {
            token,
            user_id: user.id,
            email: user.email,
            full_name: user.full_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_keeps_subject() {
        let user_id = Uuid::new_v4();
        let token = encode_token("segredo", user_id, Utc::now()).unwrap();
        let claims = decode_token("segredo", &token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = encode_token("segredo", Uuid::new_v4(), Utc::now()).unwrap();
        assert!(matches!(
            decode_token("outro", &token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now() - chrono::Duration::days(8);
        let token = encode_token("segredo", Uuid::new_v4(), issued).unwrap();
        assert!(decode_token("segredo", &token).is_err());
    }

    #[tokio::test]
    async fn hashed_password_verifies() {
        let hashed = hash_password("segredo123").await.unwrap();
        assert!(verify("segredo123", &hashed).unwrap());
        assert!(!verify("errada", &hashed).unwrap());
    }
}
