// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;
use crate::models::service::ServiceStatus;

// Nosso tipo de erro de domínio. Repositórios e serviços só conhecem este tipo;
// a tradução para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    InvalidBody(String),

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("CPF/CNPJ já cadastrado")]
    DocumentAlreadyExists,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Perfil bloqueado")]
    ProfileBlocked,

    #[error("Perfil sem permissão para esta rota")]
    RoleNotAllowed,

    #[error("Recurso pertence a outro perfil")]
    NotResourceOwner,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Perfil não encontrado")]
    ProfileNotFound,

    #[error("Empresa não encontrada")]
    CompanyNotFound,

    #[error("Serviço não encontrado")]
    ServiceNotFound,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Perfil sem empresa vinculada")]
    CompanyRequired,

    #[error("Perfil já possui empresa")]
    CompanyAlreadyExists,

    #[error("Serviço não pode ser confirmado no status {0:?}")]
    ServiceNotConfirmable(ServiceStatus),

    #[error("Serviço não aceita novos montadores")]
    ServiceClosed,

    #[error("Avaliação não permitida neste momento")]
    ReviewNotAllowed,

    #[error("Um perfil não pode denunciar a si mesmo")]
    CannotFlagSelf,

    #[error("Transição inválida: {0}")]
    InvalidTransition(String),

    #[error("Perfil avaliado não participa do serviço")]
    InvalidReviewee,

    #[error("Campo obrigatório ausente: {0}")]
    MissingField(&'static str),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que efetivamente vai para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Status HTTP e chave de tradução de cada variante.
    pub fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "errors.validation"),
            AppError::InvalidBody(_) => (StatusCode::BAD_REQUEST, "errors.invalid_body"),
            AppError::UsernameAlreadyExists => (StatusCode::CONFLICT, "errors.username_taken"),
            AppError::DocumentAlreadyExists => (StatusCode::CONFLICT, "errors.document_taken"),
            AppError::UniqueConstraintViolation(_) => (StatusCode::CONFLICT, "errors.conflict"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "errors.invalid_credentials"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "errors.invalid_token"),
            AppError::ProfileBlocked => (StatusCode::FORBIDDEN, "errors.profile_blocked"),
            AppError::RoleNotAllowed => (StatusCode::FORBIDDEN, "errors.role_not_allowed"),
            AppError::NotResourceOwner => (StatusCode::FORBIDDEN, "errors.not_owner"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "errors.user_not_found"),
            AppError::ProfileNotFound => (StatusCode::NOT_FOUND, "errors.profile_not_found"),
            AppError::CompanyNotFound => (StatusCode::NOT_FOUND, "errors.company_not_found"),
            AppError::ServiceNotFound => (StatusCode::NOT_FOUND, "errors.service_not_found"),
            AppError::ResourceNotFound(_) => (StatusCode::NOT_FOUND, "errors.not_found"),
            AppError::CompanyRequired => (StatusCode::BAD_REQUEST, "errors.company_required"),
            AppError::CompanyAlreadyExists => (StatusCode::CONFLICT, "errors.company_exists"),
            AppError::ServiceNotConfirmable(_) => (StatusCode::CONFLICT, "errors.service_not_confirmable"),
            AppError::ServiceClosed => (StatusCode::CONFLICT, "errors.service_closed"),
            AppError::ReviewNotAllowed => (StatusCode::CONFLICT, "errors.review_not_allowed"),
            AppError::CannotFlagSelf => (StatusCode::BAD_REQUEST, "errors.cannot_flag_self"),
            AppError::InvalidTransition(_) => (StatusCode::CONFLICT, "errors.invalid_transition"),
            AppError::InvalidReviewee => (StatusCode::BAD_REQUEST, "errors.invalid_reviewee"),
            AppError::MissingField(_) => (StatusCode::BAD_REQUEST, "errors.missing_field"),
            AppError::DatabaseError(e) => classify_database_error(e),
            AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "errors.internal"),
        }
    }

    /// Converte o erro de domínio na resposta HTTP, traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica só no log, nunca na resposta.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            let code = e.message.as_deref().unwrap_or(e.code.as_ref());
                            store.translate(&locale.0, &format!("validation.{}", code))
                        })
                        .collect();
                    fields.insert(field.to_string(), messages);
                }
                Some(json!(fields))
            }
            AppError::InvalidBody(reason) => Some(json!({ "reason": reason })),
            AppError::UniqueConstraintViolation(constraint) => Some(json!({ "constraint": constraint })),
            AppError::ResourceNotFound(resource) => Some(json!({ "resource": resource })),
            AppError::ServiceNotConfirmable(status) => Some(json!({ "status": status })),
            AppError::InvalidTransition(reason) => Some(json!({ "reason": reason })),
            AppError::MissingField(field) => Some(json!({ "field": field })),
            AppError::DatabaseError(sqlx::Error::Database(db_err))
                if status != StatusCode::INTERNAL_SERVER_ERROR =>
            {
                db_err.constraint().map(|c| json!({ "constraint": c }))
            }
            _ => None,
        };

        ApiError {
            status,
            error: store.translate(&locale.0, key),
            details,
        }
    }
}

// Códigos do Postgres que conhecemos viram 409/400; o resto é 500.
fn classify_database_error(e: &sqlx::Error) -> (StatusCode, &'static str) {
    match e {
        sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "errors.not_found"),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => (StatusCode::CONFLICT, "errors.conflict"),
            Some("23503") | Some("23502") | Some("23514") | Some("22P02") => {
                (StatusCode::BAD_REQUEST, "errors.constraint_violation")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "errors.internal"),
        },
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "errors.internal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn store() -> I18nStore {
        I18nStore::load_embedded().expect("locales embutidos devem ser válidos")
    }

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 3, message = "too_short"))]
        name: String,
    }

    #[test]
    fn validation_error_is_bad_request_with_translated_details() {
        let errors = Payload { name: "a".into() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&Locale("pt".into()), &store());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("detalhes por campo");
        let messages = details["name"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_ne!(messages[0], "validation.too_short");
    }

    #[test]
    fn domain_errors_map_to_expected_status() {
        assert_eq!(AppError::CompanyRequired.status_and_key().0, StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidToken.status_and_key().0, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::RoleNotAllowed.status_and_key().0, StatusCode::FORBIDDEN);
        assert_eq!(AppError::ServiceNotFound.status_and_key().0, StatusCode::NOT_FOUND);
        assert_eq!(AppError::UsernameAlreadyExists.status_and_key().0, StatusCode::CONFLICT);
        assert_eq!(
            AppError::ServiceNotConfirmable(ServiceStatus::Draft).status_and_key().0,
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn row_not_found_is_404_and_pool_errors_are_500() {
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status_and_key().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::PoolTimedOut).status_and_key().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let api = AppError::InternalServerError(anyhow::anyhow!("segredo do banco"))
            .to_api_error(&Locale("en".into()), &store());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("segredo"));
        assert!(api.details.is_none());
    }

    #[test]
    fn not_confirmable_reports_current_status() {
        let api = AppError::ServiceNotConfirmable(ServiceStatus::Cancelled)
            .to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.details.unwrap()["status"], "cancelled");
    }
}
