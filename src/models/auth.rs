// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::documents::{validate_cpf, validate_uf};
use crate::models::profile::{Profile, ProfileRole};

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "joao.montador")]
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário (cria também o perfil)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 3, max = 50, message = "username_length"))]
    #[schema(example = "joao.montador")]
    pub username: String,

    #[validate(length(min = 6, message = "password_too_short"))]
    #[schema(example = "segredo123")]
    pub password: String,

    #[validate(custom(function = "validate_self_register_role"))]
    #[schema(example = "montador")]
    pub role: ProfileRole,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "João da Silva")]
    pub full_name: String,

    #[validate(custom(function = "validate_cpf"))]
    #[schema(example = "52998224725")]
    pub cpf: Option<String>,

    pub phone: Option<String>,
    #[schema(example = "Campinas")]
    pub city: Option<String>,
    #[validate(custom(function = "validate_uf"))]
    #[schema(example = "SP")]
    pub state: Option<String>,
}

// Administradores não se cadastram pela rota pública.
fn validate_self_register_role(role: &ProfileRole) -> Result<(), ValidationError> {
    match role {
        ProfileRole::Montador | ProfileRole::Partner => Ok(()),
        ProfileRole::Admin => Err(ValidationError::new("invalid_role")),
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "joao.montador")]
    pub username: String,
    #[validate(length(min = 1, message = "required"))]
    pub password: String,
}

// Resposta de autenticação com o token (o mesmo token vai no cookie de sessão)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub profile: Profile,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: User,
    pub profile: Profile,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
