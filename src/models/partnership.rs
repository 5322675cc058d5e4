// src/models/partnership.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "partnership_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PartnershipStatus {
    Pending,
    Active,
    Rejected,
    Ended,
}

// Vínculo fixo entre uma empresa e um montador
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Partnership {
    pub id: Uuid,
    pub company_id: Uuid,
    pub montador_id: Uuid,
    pub initiated_by: Uuid,
    pub status: PartnershipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A empresa informa `montadorId`; o montador informa `companyId`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartnershipPayload {
    pub company_id: Option<Uuid>,
    pub montador_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartnershipPayload {
    pub status: PartnershipStatus,
}
