// src/services/lifecycle_service.rs

use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ReviewRepository, ServiceRepository},
    models::{
        profile::Profile,
        service::{
            ConfirmationOutcome, ConfirmationResponse, ConfirmationSide, Service, ServiceStatus,
        },
    },
    services::governance_service::GovernanceService,
};

/// O que a contagem de aceites pede para o serviço.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamFormation {
    /// Equipe completa: `in_progress` e fechado para novos montadores.
    Complete,
    /// Parte da equipe aceitou: `awaiting_team`.
    Partial,
    /// Ninguém aceitou ainda.
    Empty,
}

pub fn team_formation(accepted: i64, required: i32) -> TeamFormation {
    if accepted >= i64::from(required) {
        TeamFormation::Complete
    } else if accepted >= 1 {
        TeamFormation::Partial
    } else {
        TeamFormation::Empty
    }
}

/// Passo da confirmação dupla, decidido só com o estado atual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStep {
    First,
    SameSideAgain,
    Second,
}

pub fn confirmation_step(
    status: ServiceStatus,
    pending_by: Option<ConfirmationSide>,
    side: ConfirmationSide,
) -> Result<ConfirmationStep, AppError> {
    match (status, pending_by) {
        (ServiceStatus::CompletedPendingConfirmation, Some(pending)) if pending == side => {
            Ok(ConfirmationStep::SameSideAgain)
        }
        (ServiceStatus::CompletedPendingConfirmation, Some(_)) => Ok(ConfirmationStep::Second),
        (ServiceStatus::Scheduled | ServiceStatus::InProgress | ServiceStatus::AwaitingTeam, _) => {
            Ok(ConfirmationStep::First)
        }
        (other, _) => Err(AppError::ServiceNotConfirmable(other)),
    }
}

// Ciclo de vida do serviço: transições de status, formação de equipe e confirmação dupla.
#[derive(Clone)]
pub struct ServiceLifecycle {
    service_repo: ServiceRepository,
    review_repo: ReviewRepository,
    governance: GovernanceService,
    pool: PgPool,
}

impl ServiceLifecycle {
    pub fn new(
        service_repo: ServiceRepository,
        review_repo: ReviewRepository,
        governance: GovernanceService,
        pool: PgPool,
    ) -> Self {
        Self { service_repo, review_repo, governance, pool }
    }

    /// Sobrescreve o status sem validar de onde ele vem e audita o de/para.
    pub async fn transition_status(
        &self,
        service_id: Uuid,
        next_status: ServiceStatus,
        actor_id: Option<Uuid>,
        details: Value,
    ) -> Result<Service, AppError> {
        let current = self
            .service_repo
            .find_by_id(service_id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;

        let updated = self
            .service_repo
            .update_status(&self.pool, service_id, next_status)
            .await?;

        tracing::info!(%service_id, from = ?current.status, to = ?next_status, "Status do serviço alterado");

        self.governance
            .log_action(
                actor_id,
                "service.status_changed",
                "service",
                Some(service_id),
                json!({ "from": current.status, "to": next_status, "details": details }),
            )
            .await;

        Ok(updated)
    }

    /// Confere a equipe depois de um aceite. A linha do serviço fica travada durante
    /// a contagem, então aceites simultâneos chegam aqui um de cada vez.
    pub async fn check_team_formation(
        &self,
        service_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> Result<Service, AppError> {
        let mut tx = self.pool.begin().await?;

        let service = self
            .service_repo
            .lock_by_id(&mut *tx, service_id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;

        let accepted = self.service_repo.count_accepted(&mut *tx, service_id).await?;
        let outcome = team_formation(accepted, service.required_montadores_count);

        let updated = match outcome {
            TeamFormation::Complete
                if service.status != ServiceStatus::InProgress || service.is_open =>
            {
                Some(self.service_repo.start_and_close(&mut *tx, service_id).await?)
            }
            TeamFormation::Partial if service.status != ServiceStatus::AwaitingTeam => Some(
                self.service_repo
                    .update_status(&mut *tx, service_id, ServiceStatus::AwaitingTeam)
                    .await?,
            ),
            _ => None,
        };

        tx.commit().await?;

        let Some(updated) = updated else {
            return Ok(service);
        };

        self.governance
            .log_action(
                actor_id,
                "service.status_changed",
                "service",
                Some(service_id),
                json!({
                    "from": service.status,
                    "to": updated.status,
                    "reason": "team_formation",
                    "accepted": accepted,
                    "required": service.required_montadores_count,
                }),
            )
            .await;

        Ok(updated)
    }

    /// Confirmação de conclusão pelos dois lados. Quem confirmou primeiro fica
    /// em `pending_confirmation_by`.
    pub async fn confirm_completion(
        &self,
        service_id: Uuid,
        actor: &Profile,
        side: ConfirmationSide,
    ) -> Result<ConfirmationResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let service = self
            .service_repo
            .lock_by_id(&mut *tx, service_id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;

        self.ensure_confirming_side(&service, actor, side).await?;

        let step = confirmation_step(service.status, service.pending_confirmation_by, side)?;

        let (outcome, updated) = match step {
            ConfirmationStep::SameSideAgain => (ConfirmationOutcome::AlreadyConfirmed, None),
            ConfirmationStep::First => (
                ConfirmationOutcome::AwaitingOtherSide,
                Some(
                    self.service_repo
                        .set_pending_confirmation(&mut *tx, service_id, side)
                        .await?,
                ),
            ),
            ConfirmationStep::Second => (
                ConfirmationOutcome::Confirmed,
                Some(self.service_repo.mark_confirmed(&mut *tx, service_id).await?),
            ),
        };

        tx.commit().await?;

        let Some(updated) = updated else {
            return Ok(ConfirmationResponse { outcome, service });
        };

        self.governance
            .log_action(
                Some(actor.id),
                "service.completion_confirmed",
                "service",
                Some(service_id),
                json!({
                    "side": side,
                    "from": service.status,
                    "to": updated.status,
                }),
            )
            .await;

        Ok(ConfirmationResponse { outcome, service: updated })
    }

    /// Fecha o serviço quando empresa e montador já avaliaram. A linha fica travada
    /// entre a leitura do status e a escrita, então duas avaliações finais
    /// simultâneas fecham o serviço uma única vez.
    pub async fn finalize_if_evaluated(
        &self,
        service_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> Result<Option<Service>, AppError> {
        let mut tx = self.pool.begin().await?;

        let service = self
            .service_repo
            .lock_by_id(&mut *tx, service_id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;

        if service.status != ServiceStatus::CompletedPendingEvaluation {
            return Ok(None);
        }

        let (company_reviewed, montador_reviewed) = self
            .review_repo
            .evaluation_sides(service_id, service.company_id)
            .await?;

        if !(company_reviewed && montador_reviewed) {
            return Ok(None);
        }

        let completed = self
            .service_repo
            .update_status(&mut *tx, service_id, ServiceStatus::Completed)
            .await?;

        tx.commit().await?;

        tracing::info!(%service_id, "Serviço concluído após as avaliações");

        self.governance
            .log_action(
                actor_id,
                "service.status_changed",
                "service",
                Some(service_id),
                json!({
                    "from": service.status,
                    "to": completed.status,
                    "details": { "reason": "both_sides_reviewed" },
                }),
            )
            .await;

        Ok(Some(completed))
    }

    async fn ensure_confirming_side(
        &self,
        service: &Service,
        actor: &Profile,
        side: ConfirmationSide,
    ) -> Result<(), AppError> {
        let allowed = match side {
            ConfirmationSide::Company => actor.company_id == Some(service.company_id),
            ConfirmationSide::Montador => {
                service.montador_id == Some(actor.id)
                    || self.service_repo.is_active_montador(service.id, actor.id).await?
            }
        };

        if allowed { Ok(()) } else { Err(AppError::NotResourceOwner) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_team_starts_the_service() {
        assert_eq!(team_formation(2, 2), TeamFormation::Complete);
        assert_eq!(team_formation(3, 2), TeamFormation::Complete);
    }

    #[test]
    fn partial_team_waits() {
        assert_eq!(team_formation(1, 3), TeamFormation::Partial);
        assert_eq!(team_formation(2, 3), TeamFormation::Partial);
    }

    #[test]
    fn no_acceptances_changes_nothing() {
        assert_eq!(team_formation(0, 1), TeamFormation::Empty);
    }

    #[test]
    fn single_montador_service_completes_on_first_accept() {
        assert_eq!(team_formation(1, 1), TeamFormation::Complete);
    }

    #[test]
    fn first_confirmation_from_active_service() {
        for status in [ServiceStatus::Scheduled, ServiceStatus::InProgress, ServiceStatus::AwaitingTeam] {
            assert_eq!(
                confirmation_step(status, None, ConfirmationSide::Company).unwrap(),
                ConfirmationStep::First
            );
        }
    }

    #[test]
    fn same_side_twice_does_not_complete() {
        let step = confirmation_step(
            ServiceStatus::CompletedPendingConfirmation,
            Some(ConfirmationSide::Montador),
            ConfirmationSide::Montador,
        )
        .unwrap();
        assert_eq!(step, ConfirmationStep::SameSideAgain);
    }

    #[test]
    fn other_side_completes() {
        let step = confirmation_step(
            ServiceStatus::CompletedPendingConfirmation,
            Some(ConfirmationSide::Montador),
            ConfirmationSide::Company,
        )
        .unwrap();
        assert_eq!(step, ConfirmationStep::Second);
    }

    #[test]
    fn pending_confirmation_without_side_is_rejected() {
        // Status ajustado manualmente via transition_status, sem lado registrado
        let result = confirmation_step(
            ServiceStatus::CompletedPendingConfirmation,
            None,
            ConfirmationSide::Company,
        );
        assert!(matches!(result, Err(AppError::ServiceNotConfirmable(_))));
    }

    #[test]
    fn closed_or_unstarted_services_are_not_confirmable() {
        for status in [
            ServiceStatus::Draft,
            ServiceStatus::Published,
            ServiceStatus::Cancelled,
            ServiceStatus::Completed,
            ServiceStatus::CompletedPendingEvaluation,
            ServiceStatus::Disputed,
        ] {
            let result = confirmation_step(status, None, ConfirmationSide::Montador);
            assert!(matches!(result, Err(AppError::ServiceNotConfirmable(s)) if s == status));
        }
    }
}
