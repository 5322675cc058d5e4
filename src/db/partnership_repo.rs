// src/db/partnership_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    models::partnership::{Partnership, PartnershipStatus},
};

#[derive(Clone)]
pub struct PartnershipRepository {
    pool: PgPool,
}

impl PartnershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Parceria encerrada ou recusada pode ser proposta de novo
    pub async fn create_partnership(
        &self,
        company_id: Uuid,
        montador_id: Uuid,
        initiated_by: Uuid,
    ) -> Result<Partnership, AppError> {
        sqlx::query_as::<_, Partnership>(
            r#"
            INSERT INTO partnerships (company_id, montador_id, initiated_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (company_id, montador_id) DO UPDATE
                SET status = 'pending', initiated_by = EXCLUDED.initiated_by, updated_at = NOW()
                WHERE partnerships.status IN ('rejected', 'ended')
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(montador_id)
        .bind(initiated_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?
        .ok_or_else(|| AppError::UniqueConstraintViolation("partnerships_company_montador_key".into()))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Partnership>, AppError> {
        let partnership = sqlx::query_as::<_, Partnership>("SELECT * FROM partnerships WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(partnership)
    }

    pub async fn list_for_company(&self, company_id: Uuid) -> Result<Vec<Partnership>, AppError> {
        let partnerships = sqlx::query_as::<_, Partnership>(
            "SELECT * FROM partnerships WHERE company_id = $1 ORDER BY updated_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(partnerships)
    }

    pub async fn list_for_montador(&self, montador_id: Uuid) -> Result<Vec<Partnership>, AppError> {
        let partnerships = sqlx::query_as::<_, Partnership>(
            "SELECT * FROM partnerships WHERE montador_id = $1 ORDER BY updated_at DESC",
        )
        .bind(montador_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(partnerships)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: PartnershipStatus,
    ) -> Result<Partnership, AppError> {
        sqlx::query_as::<_, Partnership>(
            "UPDATE partnerships SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("partnership {}", id)))
    }
}
