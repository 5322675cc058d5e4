// src/db/governance_repo.rs

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::governance::{AuditLog, Flag},
};

// Tabelas append-only: só INSERT e SELECT
#[derive(Clone)]
pub struct GovernanceRepository {
    pool: PgPool,
}

impl GovernanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_audit_log(
        &self,
        actor_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Option<Uuid>,
        details: &Value,
    ) -> Result<AuditLog, AppError> {
        let log = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (actor_id, action, entity_type, entity_id, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(actor_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(details)
        .fetch_one(&self.pool)
        .await?;
        Ok(log)
    }

    // Mais recentes primeiro
    pub async fn list_audit_logs(
        &self,
        entity_type: Option<&str>,
        entity_id: Option<Uuid>,
        actor_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<AuditLog>, AppError> {
        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT * FROM audit_logs
            WHERE ($1::text IS NULL OR entity_type = $1)
              AND ($2::uuid IS NULL OR entity_id = $2)
              AND ($3::uuid IS NULL OR actor_id = $3)
            ORDER BY created_at DESC
            LIMIT $4
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(actor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    pub async fn insert_flag(
        &self,
        profile_id: Uuid,
        reporter_id: Uuid,
        service_id: Option<Uuid>,
        reason: &str,
    ) -> Result<Flag, AppError> {
        let flag = sqlx::query_as::<_, Flag>(
            r#"
            INSERT INTO flags (profile_id, reporter_id, service_id, reason)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(profile_id)
        .bind(reporter_id)
        .bind(service_id)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(flag)
    }

    pub async fn count_flags(&self, profile_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM flags WHERE profile_id = $1")
            .bind(profile_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn list_flags(&self, profile_id: Option<Uuid>, limit: i64) -> Result<Vec<Flag>, AppError> {
        let flags = sqlx::query_as::<_, Flag>(
            r#"
            SELECT * FROM flags
            WHERE ($1::uuid IS NULL OR profile_id = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(profile_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(flags)
    }
}
