// src/services/partnership_service.rs

use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, PartnershipRepository, ProfileRepository},
    models::{
        partnership::{CreatePartnershipPayload, Partnership, PartnershipStatus},
        profile::{Profile, ProfileRole},
    },
    services::governance_service::GovernanceService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnershipSide {
    Company,
    Montador,
}

/// Proposta pendente só é respondida pelo outro lado; parceria ativa pode ser
/// encerrada por qualquer um dos dois.
pub fn partnership_transition(
    current: PartnershipStatus,
    next: PartnershipStatus,
    actor: PartnershipSide,
    initiator: PartnershipSide,
) -> Result<(), AppError> {
    use PartnershipStatus::*;

    match (current, next) {
        (Pending, Active | Rejected) if actor != initiator => Ok(()),
        (Pending, Active | Rejected) => Err(AppError::InvalidTransition("awaiting_counterpart".into())),
        (Active, Ended) => Ok(()),
        _ => Err(AppError::InvalidTransition(
            format!("{:?} -> {:?}", current, next).to_lowercase(),
        )),
    }
}

#[derive(Clone)]
pub struct PartnershipService {
    repo: PartnershipRepository,
    company_repo: CompanyRepository,
    profile_repo: ProfileRepository,
    governance: GovernanceService,
}

impl PartnershipService {
    pub fn new(
        repo: PartnershipRepository,
        company_repo: CompanyRepository,
        profile_repo: ProfileRepository,
        governance: GovernanceService,
    ) -> Self {
        Self { repo, company_repo, profile_repo, governance }
    }

    pub async fn propose(
        &self,
        actor: &Profile,
        payload: &CreatePartnershipPayload,
    ) -> Result<Partnership, AppError> {
        let (company_id, montador_id) = match actor.role {
            ProfileRole::Partner => {
                let company_id = actor.company_id.ok_or(AppError::CompanyRequired)?;
                let montador_id = payload.montador_id.ok_or(AppError::MissingField("montadorId"))?;

                let montador = self
                    .profile_repo
                    .find_by_id(montador_id)
                    .await?
                    .ok_or(AppError::ProfileNotFound)?;
                if montador.role != ProfileRole::Montador {
                    return Err(AppError::InvalidTransition("target_not_montador".into()));
                }
                (company_id, montador_id)
            }
            ProfileRole::Montador => {
                let company_id = payload.company_id.ok_or(AppError::MissingField("companyId"))?;
                self.company_repo
                    .find_by_id(company_id)
                    .await?
                    .ok_or(AppError::CompanyNotFound)?;
                (company_id, actor.id)
            }
            ProfileRole::Admin => return Err(AppError::RoleNotAllowed),
        };

        let partnership = self.repo.create_partnership(company_id, montador_id, actor.id).await?;

        self.governance
            .log_action(
                Some(actor.id),
                "partnership.proposed",
                "partnership",
                Some(partnership.id),
                json!({ "companyId": company_id, "montadorId": montador_id }),
            )
            .await;

        Ok(partnership)
    }

    pub async fn list_own(&self, actor: &Profile) -> Result<Vec<Partnership>, AppError> {
        match actor.role {
            ProfileRole::Montador => self.repo.list_for_montador(actor.id).await,
            ProfileRole::Partner => match actor.company_id {
                Some(company_id) => self.repo.list_for_company(company_id).await,
                None => Ok(Vec::new()),
            },
            ProfileRole::Admin => Ok(Vec::new()),
        }
    }

    pub async fn update_status(
        &self,
        actor: &Profile,
        id: Uuid,
        next: PartnershipStatus,
    ) -> Result<Partnership, AppError> {
        let partnership = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("partnership {}", id)))?;

        let side = if actor.id == partnership.montador_id {
            PartnershipSide::Montador
        } else if actor.company_id == Some(partnership.company_id) {
            PartnershipSide::Company
        } else {
            return Err(AppError::NotResourceOwner);
        };

        let initiator = if partnership.initiated_by == partnership.montador_id {
            PartnershipSide::Montador
        } else {
            PartnershipSide::Company
        };

        partnership_transition(partnership.status, next, side, initiator)?;

        let updated = self.repo.update_status(id, next).await?;

        self.governance
            .log_action(
                Some(actor.id),
                "partnership.status_changed",
                "partnership",
                Some(id),
                json!({ "from": partnership.status, "to": next }),
            )
            .await;

        Ok(updated)
    }
}
