// src/models/service.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::documents::validate_uf;

// --- Enums ---

// Mapeia o CREATE TYPE service_status do banco. Todos os valores usados pelo
// ciclo de vida estão declarados aqui e na migração.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "service_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Draft,
    Published,
    AwaitingMontador,
    AwaitingTeam,
    Scheduled,
    InProgress,
    CompletedPendingConfirmation,
    CompletedPendingEvaluation,
    Completed,
    Cancelled,
    Disputed,
}

impl ServiceStatus {
    /// Status em que o serviço ainda aceita candidaturas e convites.
    pub fn accepts_montadores(self) -> bool {
        matches!(
            self,
            ServiceStatus::Published | ServiceStatus::AwaitingMontador | ServiceStatus::AwaitingTeam
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "confirmation_side", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationSide {
    Company,
    Montador,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "assignment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Invited,
    Applied,
    Accepted,
    Declined,
    Removed,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub company_id: Uuid,
    pub montador_id: Option<Uuid>,
    pub created_by: Uuid,
    #[schema(example = "Montagem de guarda-roupa 6 portas")]
    pub title: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Valor em centavos
    #[schema(example = 25000)]
    pub price_cents: i64,
    #[schema(example = 2)]
    pub required_montadores_count: i32,
    pub status: ServiceStatus,
    pub is_open: bool,
    pub pending_confirmation_by: Option<ConfirmationSide>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAssignment {
    pub id: Uuid,
    pub service_id: Uuid,
    pub montador_id: Uuid,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Só guardamos os metadados; o arquivo em si fica no storage externo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAttachment {
    pub id: Uuid,
    pub service_id: Uuid,
    pub uploaded_by: Uuid,
    #[schema(example = "projeto-cozinha.pdf")]
    pub file_name: String,
    #[schema(example = "https://cdn.example.com/uploads/projeto-cozinha.pdf")]
    pub file_url: String,
    #[schema(example = "application/pdf")]
    pub mime_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServicePayload {
    #[validate(length(min = 3, max = 200, message = "too_short"))]
    #[schema(example = "Montagem de guarda-roupa 6 portas")]
    pub title: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[validate(custom(function = "validate_uf"))]
    pub state: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    #[validate(range(min = 0, message = "invalid_price"))]
    #[schema(example = 25000)]
    pub price_cents: i64,
    #[serde(default = "default_team_size")]
    #[validate(range(min = 1, message = "invalid_team_size"))]
    #[schema(example = 1)]
    pub required_montadores_count: i32,
    /// `true` publica direto; caso contrário nasce como rascunho.
    #[serde(default)]
    pub publish: bool,
}

fn default_team_size() -> i32 {
    1
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServicePayload {
    #[validate(length(min = 3, max = 200, message = "too_short"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[validate(custom(function = "validate_uf"))]
    pub state: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    #[validate(range(min = 0, message = "invalid_price"))]
    pub price_cents: Option<i64>,
    #[validate(range(min = 1, message = "invalid_team_size"))]
    pub required_montadores_count: Option<i32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ServiceFilter {
    pub status: Option<ServiceStatus>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub company_id: Option<Uuid>,
    /// Montador: apenas serviços em que está escalado
    pub assigned_to_me: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttachmentPayload {
    #[validate(length(min = 1, max = 255, message = "required"))]
    #[schema(example = "projeto-cozinha.pdf")]
    pub file_name: String,
    #[validate(url(message = "invalid_url"))]
    #[schema(example = "https://cdn.example.com/uploads/projeto-cozinha.pdf")]
    pub file_url: String,
    pub mime_type: Option<String>,
    #[validate(range(min = 0, message = "invalid_size"))]
    pub size_bytes: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusPayload {
    #[schema(example = "scheduled")]
    pub status: ServiceStatus,
    /// Contexto livre gravado na auditoria
    #[schema(example = json!({"motivo": "cliente remarcou"}))]
    pub details: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteMontadorPayload {
    pub montador_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentPayload {
    #[schema(example = "accepted")]
    pub status: AssignmentStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCompletionPayload {
    #[schema(example = "company")]
    pub side: ConfirmationSide,
}

// Resultado do confirm-completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationOutcome {
    /// Primeiro lado confirmou; aguarda o outro.
    AwaitingOtherSide,
    /// O mesmo lado confirmou de novo; nada muda.
    AlreadyConfirmed,
    /// Os dois lados confirmaram.
    Confirmed,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationResponse {
    pub outcome: ConfirmationOutcome,
    pub service: Service,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetail {
    #[serde(flatten)]
    pub service: Service,
    #[schema(example = "Móveis Centro")]
    pub company_name: String,
    pub assignments: Vec<ServiceAssignment>,
    #[schema(example = json!([]))]
    pub attachments: Vec<ServiceAttachment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_statuses_round_trip_through_json() {
        let status: ServiceStatus = serde_json::from_str("\"completed_pending_confirmation\"").unwrap();
        assert_eq!(status, ServiceStatus::CompletedPendingConfirmation);
        assert_eq!(serde_json::to_value(ServiceStatus::AwaitingTeam).unwrap(), "awaiting_team");
    }

    #[test]
    fn only_open_statuses_accept_montadores() {
        assert!(ServiceStatus::Published.accepts_montadores());
        assert!(ServiceStatus::AwaitingTeam.accepts_montadores());
        assert!(!ServiceStatus::Draft.accepts_montadores());
        assert!(!ServiceStatus::InProgress.accepts_montadores());
    }

    #[test]
    fn create_payload_defaults_to_one_montador_and_draft() {
        let payload: CreateServicePayload = serde_json::from_value(serde_json::json!({
            "title": "Montagem de cozinha",
            "priceCents": 30000
        }))
        .unwrap();
        assert_eq!(payload.required_montadores_count, 1);
        assert!(!payload.publish);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn negative_price_and_empty_team_are_rejected() {
        let payload: CreateServicePayload = serde_json::from_value(serde_json::json!({
            "title": "Montagem de cozinha",
            "priceCents": -1,
            "requiredMontadoresCount": 0
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price_cents"));
        assert!(fields.contains_key("required_montadores_count"));
    }

    #[test]
    fn attachment_requires_a_url() {
        let payload = CreateAttachmentPayload {
            file_name: "foto.jpg".into(),
            file_url: "not a url".into(),
            mime_type: None,
            size_bytes: Some(10),
        };
        assert!(payload.validate().unwrap_err().field_errors().contains_key("file_url"));
    }
}
