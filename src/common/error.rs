// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio. Os handlers convertem para ApiError
// (com a mensagem no idioma do cliente) antes de responder.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Erros de regra de negócio indexados por campo (ex: "class_id" -> [...])
    #[error("Erro de validação: {0:?}")]
    FieldErrors(HashMap<String, Vec<String>>),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Sem acesso ao estabelecimento")]
    TenantAccessDenied,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Falha no gateway de pagamento: {0}")]
    PaymentGateway(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Erro de validação para um único campo.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut map = HashMap::new();
        map.insert(field.to_string(), vec![message.into()]);
        AppError::FieldErrors(map)
    }

    /// Erro de validação sem campo específico (validação cruzada).
    pub fn non_field(message: impl Into<String>) -> Self {
        Self::field("non_field_errors", message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::FieldErrors(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists | AppError::UniqueConstraintViolation(_) => {
                StatusCode::CONFLICT
            }
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) | AppError::TenantAccessDenied => StatusCode::FORBIDDEN,
            AppError::PaymentGateway(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta HTTP, no idioma pedido.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let pt = locale.is_portuguese();
        let status = self.status_code();

        match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError::with_details(status, invalid_fields_message(pt), json!(details))
            }
            AppError::FieldErrors(map) => {
                ApiError::with_details(status, invalid_fields_message(pt), json!(map))
            }
            AppError::BadRequest(message) | AppError::Forbidden(message) => {
                ApiError::new(status, message.clone())
            }
            AppError::UniqueConstraintViolation(message) => ApiError::new(status, message.clone()),
            AppError::EmailAlreadyExists => ApiError::new(
                status,
                pick(pt, "Este e-mail já está em uso.", "This e-mail is already in use."),
            ),
            AppError::InvalidCredentials => ApiError::new(
                status,
                pick(pt, "E-mail ou senha inválidos.", "Invalid e-mail or password."),
            ),
            AppError::InvalidToken => ApiError::new(
                status,
                pick(
                    pt,
                    "Token de autenticação inválido ou ausente.",
                    "Missing or invalid authentication token.",
                ),
            ),
            AppError::UserNotFound => ApiError::new(
                status,
                pick(pt, "Usuário não encontrado.", "User not found."),
            ),
            AppError::NotFound(resource) => ApiError::new(
                status,
                if pt {
                    format!("{} não encontrado.", resource)
                } else {
                    format!("{} not found.", resource)
                },
            ),
            AppError::TenantAccessDenied => ApiError::new(
                status,
                pick(
                    pt,
                    "Você não tem acesso a este estabelecimento.",
                    "You do not have access to this tenant.",
                ),
            ),
            // Falhas internas: loga o detalhe, devolve mensagem genérica.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                let message = match e {
                    AppError::PaymentGateway(_) => pick(
                        pt,
                        "Falha ao comunicar com o gateway de pagamento. Tente novamente mais tarde.",
                        "Failed to reach the payment gateway. Please try again later.",
                    ),
                    _ => pick(pt, "Ocorreu um erro inesperado.", "An unexpected error occurred."),
                };
                ApiError::new(status, message)
            }
        }
    }
}

fn pick(pt: bool, pt_message: &str, en_message: &str) -> String {
    let message = if pt { pt_message } else { en_message };
    message.to_string()
}

fn invalid_fields_message(pt: bool) -> String {
    pick(pt, "Um ou mais campos são inválidos.", "One or more fields are invalid.")
}

// Resposta de erro serializada para o cliente
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(status: StatusCode, error: impl Into<String>, details: Value) -> Self {
        Self {
            status,
            error: error.into(),
            details: Some(details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

// Sem Locale explícito (middlewares, callbacks) respondemos no idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

/// Converte violação de chave única em erro amigável; o resto vira DatabaseError.
pub fn map_unique_violation(e: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(message());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::non_field("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("Sala").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::UniqueConstraintViolation("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::PaymentGateway("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn field_errors_are_keyed_by_field() {
        let api = AppError::field("capacity", "Capacity must be a positive integer.")
            .to_api_error(&Locale::default());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["capacity"][0], "Capacity must be a positive integer.");
    }

    #[test]
    fn fixed_messages_are_localized() {
        let en = AppError::InvalidCredentials.to_api_error(&Locale("en".into()));
        let pt = AppError::InvalidCredentials.to_api_error(&Locale("pt".into()));

        assert_eq!(en.error, "Invalid e-mail or password.");
        assert_eq!(pt.error, "E-mail ou senha inválidos.");
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("pool exploded"))
            .to_api_error(&Locale::default());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("pool"));
    }
}
