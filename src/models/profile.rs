// src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::documents::{validate_cpf, validate_uf};

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "profile_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProfileRole {
    Montador,
    Partner,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "profile_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Pending,
    Approved,
    Blocked,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: ProfileRole,
    pub status: ProfileStatus,
    #[schema(example = "João da Silva")]
    pub full_name: String,
    #[schema(example = "52998224725")]
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub bio: Option<String>,
    #[schema(example = json!(["cozinhas", "guarda-roupas"]))]
    pub specialties: Vec<String>,
    #[schema(example = 5)]
    pub experience_years: Option<i32>,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == ProfileRole::Admin
    }
}

// Todos os campos são opcionais: o que vier `None` mantém o valor atual (COALESCE no repo).
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, message = "required"))]
    pub full_name: Option<String>,
    #[validate(custom(function = "validate_cpf"))]
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    #[validate(custom(function = "validate_uf"))]
    pub state: Option<String>,
    #[validate(length(max = 2000, message = "too_long"))]
    pub bio: Option<String>,
    pub specialties: Option<Vec<String>>,
    #[validate(range(min = 0, message = "invalid_experience"))]
    pub experience_years: Option<i32>,
}

// Filtros da listagem pública de montadores
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MontadorFilter {
    #[param(example = "Campinas")]
    pub city: Option<String>,
    #[param(example = "SP")]
    pub state: Option<String>,
    #[param(example = "cozinhas")]
    pub specialty: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_as_snake_case() {
        assert_eq!(serde_json::to_value(ProfileRole::Montador).unwrap(), "montador");
        assert_eq!(serde_json::to_value(ProfileStatus::Blocked).unwrap(), "blocked");
    }

    #[test]
    fn negative_experience_is_rejected() {
        let payload = UpdateProfilePayload {
            experience_years: Some(-1),
            ..Default::default()
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("experience_years"));
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateProfilePayload::default().validate().is_ok());
    }
}
