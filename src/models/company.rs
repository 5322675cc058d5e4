// src/models/company.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::documents::{validate_cnpj, validate_uf};

// A loja / marcenaria dona dos serviços
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Móveis Centro")]
    pub trading_name: String,
    #[schema(example = "Móveis Centro Comércio LTDA")]
    pub legal_name: Option<String>,
    #[schema(example = "11222333000181")]
    pub cnpj: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Móveis Centro")]
    pub trading_name: String,
    pub legal_name: Option<String>,
    #[validate(custom(function = "validate_cnpj"))]
    #[schema(example = "11222333000181")]
    pub cnpj: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[validate(custom(function = "validate_uf"))]
    pub state: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyPayload {
    #[validate(length(min = 1, message = "required"))]
    pub trading_name: Option<String>,
    pub legal_name: Option<String>,
    #[validate(custom(function = "validate_cnpj"))]
    pub cnpj: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[validate(custom(function = "validate_uf"))]
    pub state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_requires_trading_name_and_valid_cnpj() {
        let payload = CreateCompanyPayload {
            trading_name: "".into(),
            legal_name: None,
            cnpj: Some("11222333000182".into()),
            phone: None,
            email: Some("contato@moveis".into()),
            address: None,
            city: None,
            state: None,
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("trading_name"));
        assert!(fields.contains_key("cnpj"));
    }
}
