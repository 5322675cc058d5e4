// src/models/governance.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// Registro imutável de auditoria
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    #[schema(example = "service.status_changed")]
    pub action: String,
    #[schema(example = "service")]
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    #[schema(example = json!({"from": "published", "to": "in_progress"}))]
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

// Denúncia contra um perfil
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub reporter_id: Uuid,
    pub service_id: Option<Uuid>,
    #[schema(example = "Não compareceu no horário combinado")]
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlagPayload {
    #[validate(length(min = 3, max = 1000, message = "too_short"))]
    pub reason: String,
    pub service_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlagReport {
    pub flag: Flag,
    #[schema(example = 3)]
    pub total_flags: i64,
    /// Apenas recomendação; nenhum bloqueio automático é aplicado.
    pub block_recommended: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditLogFilter {
    #[param(example = "service")]
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
    #[param(example = 50)]
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FlagFilter {
    pub profile_id: Option<Uuid>,
    pub limit: Option<i64>,
}
