// src/db/service_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::service::{
        AssignmentStatus, ConfirmationSide, CreateAttachmentPayload, CreateServicePayload, Service,
        ServiceAssignment, ServiceAttachment, ServiceFilter, ServiceStatus, UpdateServicePayload,
    },
};

/// Quais serviços o perfil que está listando pode enxergar.
#[derive(Debug, Clone, Copy)]
pub enum ServiceScope {
    /// Administrador: tudo
    All,
    /// Parceiro: apenas os serviços da própria empresa
    Company(Uuid),
    /// Montador: serviços abertos + aqueles em que está escalado
    Montador { profile_id: Uuid, assigned_only: bool },
}

#[derive(Clone)]
pub struct ServiceRepository {
    pool: PgPool,
}

impl ServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  SERVIÇOS
    // =========================================================================

    pub async fn create_service(
        &self,
        company_id: Uuid,
        created_by: Uuid,
        payload: &CreateServicePayload,
        status: ServiceStatus,
    ) -> Result<Service, AppError> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (
                company_id, created_by, title, description, address, city, state,
                scheduled_for, price_cents, required_montadores_count, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(created_by)
        .bind(payload.title.as_str())
        .bind(payload.description.as_deref())
        .bind(payload.address.as_deref())
        .bind(payload.city.as_deref())
        .bind(payload.state.as_deref())
        .bind(payload.scheduled_for)
        .bind(payload.price_cents)
        .bind(payload.required_montadores_count)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(service)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, AppError> {
        let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(service)
    }

    /// Lê o serviço travando a linha até o fim da transação.
    /// Aceites simultâneos ficam serializados aqui.
    pub async fn lock_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(service)
    }

    pub async fn list_services(
        &self,
        filter: &ServiceFilter,
        scope: ServiceScope,
    ) -> Result<Vec<Service>, AppError> {
        let (scope_company, scope_montador, assigned_only) = match scope {
            ServiceScope::All => (None, None, false),
            ServiceScope::Company(company_id) => (Some(company_id), None, false),
            ServiceScope::Montador { profile_id, assigned_only } => (None, Some(profile_id), assigned_only),
        };

        let services = sqlx::query_as::<_, Service>(
            r#"
            SELECT s.* FROM services s
            WHERE ($1::service_status IS NULL OR s.status = $1)
              AND ($2::text IS NULL OR s.city ILIKE $2)
              AND ($3::text IS NULL OR s.state = $3)
              AND ($4::uuid IS NULL OR s.company_id = $4)
              AND ($5::uuid IS NULL OR s.company_id = $5)
              AND (
                $6::uuid IS NULL
                OR s.montador_id = $6
                OR EXISTS (
                    SELECT 1 FROM service_assignments a
                    WHERE a.service_id = s.id
                      AND a.montador_id = $6
                      AND a.status IN ('invited', 'applied', 'accepted')
                )
                OR (
                    NOT $7
                    AND s.is_open
                    AND s.status IN ('published', 'awaiting_montador', 'awaiting_team')
                )
              )
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(filter.status)
        .bind(filter.city.as_deref())
        .bind(filter.state.as_deref())
        .bind(filter.company_id)
        .bind(scope_company)
        .bind(scope_montador)
        .bind(assigned_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    pub async fn update_service(
        &self,
        id: Uuid,
        payload: &UpdateServicePayload,
    ) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            r#"
            UPDATE services SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                address = COALESCE($4, address),
                city = COALESCE($5, city),
                state = COALESCE($6, state),
                scheduled_for = COALESCE($7, scheduled_for),
                price_cents = COALESCE($8, price_cents),
                required_montadores_count = COALESCE($9, required_montadores_count),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.title.as_deref())
        .bind(payload.description.as_deref())
        .bind(payload.address.as_deref())
        .bind(payload.city.as_deref())
        .bind(payload.state.as_deref())
        .bind(payload.scheduled_for)
        .bind(payload.price_cents)
        .bind(payload.required_montadores_count)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ServiceNotFound)
    }

    pub async fn delete_service(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Sobrescreve o status sem checar de onde vem
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ServiceStatus,
    ) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Service>(
            "UPDATE services SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ServiceNotFound)
    }

    /// Equipe completa: serviço começa e deixa de aceitar montadores.
    pub async fn start_and_close<'e, E>(&self, executor: E, id: Uuid) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET status = 'in_progress', is_open = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ServiceNotFound)
    }

    pub async fn set_pending_confirmation<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        side: ConfirmationSide,
    ) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET status = 'completed_pending_confirmation',
                pending_confirmation_by = $1,
                updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(side)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ServiceNotFound)
    }

    /// Os dois lados confirmaram: aguarda as avaliações.
    pub async fn mark_confirmed<'e, E>(&self, executor: E, id: Uuid) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET status = 'completed_pending_evaluation',
                pending_confirmation_by = NULL,
                completed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ServiceNotFound)
    }

    /// O primeiro montador aceito vira o responsável principal do serviço.
    pub async fn set_primary_montador_if_empty<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        montador_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE services SET montador_id = $1, updated_at = NOW() WHERE id = $2 AND montador_id IS NULL",
        )
        .bind(montador_id)
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Montador saiu da equipe: se era o responsável principal, passa para o aceito
    /// mais antigo que restou (ou fica vazio).
    pub async fn reassign_primary_montador<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        removed_montador_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE services SET
                montador_id = (
                    SELECT a.montador_id FROM service_assignments a
                    WHERE a.service_id = $1
                      AND a.status = 'accepted'
                      AND a.montador_id <> $2
                    ORDER BY a.updated_at ASC
                    LIMIT 1
                ),
                updated_at = NOW()
            WHERE id = $1 AND montador_id = $2
            "#,
        )
        .bind(id)
        .bind(removed_montador_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    // =========================================================================
    //  EQUIPE (ASSIGNMENTS)
    // =========================================================================

    /// Cria o vínculo. Um vínculo recusado ou removido pode ser reaberto;
    /// qualquer outro conflito devolve `None`.
    pub async fn upsert_assignment(
        &self,
        service_id: Uuid,
        montador_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<Option<ServiceAssignment>, AppError> {
        let assignment = sqlx::query_as::<_, ServiceAssignment>(
            r#"
            INSERT INTO service_assignments (service_id, montador_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (service_id, montador_id) DO UPDATE
                SET status = EXCLUDED.status, updated_at = NOW()
                WHERE service_assignments.status IN ('declined', 'removed')
            RETURNING *
            "#,
        )
        .bind(service_id)
        .bind(montador_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    pub async fn find_assignment(&self, id: Uuid) -> Result<Option<ServiceAssignment>, AppError> {
        let assignment =
            sqlx::query_as::<_, ServiceAssignment>("SELECT * FROM service_assignments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(assignment)
    }

    pub async fn list_assignments(&self, service_id: Uuid) -> Result<Vec<ServiceAssignment>, AppError> {
        let assignments = sqlx::query_as::<_, ServiceAssignment>(
            "SELECT * FROM service_assignments WHERE service_id = $1 ORDER BY created_at ASC",
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    pub async fn update_assignment_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: AssignmentStatus,
    ) -> Result<ServiceAssignment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ServiceAssignment>(
            r#"
            UPDATE service_assignments SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("assignment {}", id)))
    }

    pub async fn count_accepted<'e, E>(&self, executor: E, service_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM service_assignments WHERE service_id = $1 AND status = 'accepted'",
        )
        .bind(service_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    /// Montador escalado: responsável principal ou vínculo aceito.
    pub async fn is_active_montador(&self, service_id: Uuid, montador_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM services WHERE id = $1 AND montador_id = $2
                UNION ALL
                SELECT 1 FROM service_assignments
                WHERE service_id = $1 AND montador_id = $2 AND status = 'accepted'
            )
            "#,
        )
        .bind(service_id)
        .bind(montador_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    // =========================================================================
    //  ANEXOS
    // =========================================================================

    pub async fn create_attachment(
        &self,
        service_id: Uuid,
        uploaded_by: Uuid,
        payload: &CreateAttachmentPayload,
    ) -> Result<ServiceAttachment, AppError> {
        let attachment = sqlx::query_as::<_, ServiceAttachment>(
            r#"
            INSERT INTO service_attachments (service_id, uploaded_by, file_name, file_url, mime_type, size_bytes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(service_id)
        .bind(uploaded_by)
        .bind(payload.file_name.as_str())
        .bind(payload.file_url.as_str())
        .bind(payload.mime_type.as_deref())
        .bind(payload.size_bytes)
        .fetch_one(&self.pool)
        .await?;
        Ok(attachment)
    }

    pub async fn list_attachments(&self, service_id: Uuid) -> Result<Vec<ServiceAttachment>, AppError> {
        let attachments = sqlx::query_as::<_, ServiceAttachment>(
            "SELECT * FROM service_attachments WHERE service_id = $1 ORDER BY created_at ASC",
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attachments)
    }

    pub async fn find_attachment(
        &self,
        service_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<Option<ServiceAttachment>, AppError> {
        let attachment = sqlx::query_as::<_, ServiceAttachment>(
            "SELECT * FROM service_attachments WHERE id = $1 AND service_id = $2",
        )
        .bind(attachment_id)
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attachment)
    }

    pub async fn delete_attachment(&self, attachment_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM service_attachments WHERE id = $1")
            .bind(attachment_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
