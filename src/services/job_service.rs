// src/services/job_service.rs

use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{service_repo::ServiceScope, CompanyRepository, ProfileRepository, ServiceRepository},
    models::{
        profile::{Profile, ProfileRole, ProfileStatus},
        service::{
            AssignmentStatus, CreateAttachmentPayload, CreateServicePayload, Service,
            ServiceAssignment, ServiceAttachment, ServiceDetail, ServiceFilter, ServiceStatus,
            UpdateServicePayload,
        },
    },
    services::{governance_service::GovernanceService, lifecycle_service::ServiceLifecycle},
};

/// De que lado do vínculo está quem mexe na equipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentActor {
    /// Dono do serviço (ou admin)
    Company,
    /// O próprio montador do vínculo
    Montador,
}

/// Transições permitidas de um vínculo de equipe.
///
/// A empresa decide sobre candidaturas e pode remover qualquer vínculo ativo;
/// o montador responde convites e pode desistir da própria candidatura.
pub fn assignment_transition(
    current: AssignmentStatus,
    next: AssignmentStatus,
    actor: AssignmentActor,
) -> Result<(), AppError> {
    use AssignmentStatus::*;

    let allowed = match actor {
        AssignmentActor::Company => matches!(
            (current, next),
            (Applied, Accepted) | (Applied, Declined) | (Invited | Applied | Accepted, Removed)
        ),
        AssignmentActor::Montador => matches!(
            (current, next),
            (Invited, Accepted) | (Invited, Declined) | (Applied, Removed)
        ),
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::InvalidTransition(format!("{:?} -> {:?}", current, next).to_lowercase()))
    }
}

/// Quais serviços cada papel enxerga na listagem.
pub fn scope_for(profile: &Profile, assigned_only: bool) -> Option<ServiceScope> {
    match profile.role {
        ProfileRole::Admin => Some(ServiceScope::All),
        ProfileRole::Partner => profile.company_id.map(ServiceScope::Company),
        ProfileRole::Montador => Some(ServiceScope::Montador { profile_id: profile.id, assigned_only }),
    }
}

// Serviços (jobs): CRUD, equipe e anexos.
#[derive(Clone)]
pub struct JobService {
    repo: ServiceRepository,
    company_repo: CompanyRepository,
    profile_repo: ProfileRepository,
    lifecycle: ServiceLifecycle,
    governance: GovernanceService,
    pool: PgPool,
}

impl JobService {
    pub fn new(
        repo: ServiceRepository,
        company_repo: CompanyRepository,
        profile_repo: ProfileRepository,
        lifecycle: ServiceLifecycle,
        governance: GovernanceService,
        pool: PgPool,
    ) -> Self {
        Self { repo, company_repo, profile_repo, lifecycle, governance, pool }
    }

    // =========================================================================
    //  SERVIÇOS
    // =========================================================================

    pub async fn create_service(
        &self,
        actor: &Profile,
        payload: &CreateServicePayload,
    ) -> Result<Service, AppError> {
        let company_id = actor.company_id.ok_or(AppError::CompanyRequired)?;

        let status = if payload.publish { ServiceStatus::Published } else { ServiceStatus::Draft };
        let service = self.repo.create_service(company_id, actor.id, payload, status).await?;

        self.governance
            .log_action(
                Some(actor.id),
                "service.created",
                "service",
                Some(service.id),
                json!({ "status": service.status, "companyId": company_id }),
            )
            .await;

        Ok(service)
    }

    pub async fn list_services(
        &self,
        actor: &Profile,
        filter: &ServiceFilter,
    ) -> Result<Vec<Service>, AppError> {
        // Parceiro sem empresa ainda não tem serviços
        match scope_for(actor, filter.assigned_to_me.unwrap_or(false)) {
            Some(scope) => self.repo.list_services(filter, scope).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn get_service(&self, id: Uuid) -> Result<Service, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::ServiceNotFound)
    }

    pub async fn get_service_detail(&self, id: Uuid) -> Result<ServiceDetail, AppError> {
        let service = self.get_service(id).await?;

        let company = self
            .company_repo
            .find_by_id(service.company_id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;

        let assignments = self.repo.list_assignments(id).await?;
        let attachments = self.repo.list_attachments(id).await?;

        Ok(ServiceDetail {
            service,
            company_name: company.trading_name,
            assignments,
            attachments,
        })
    }

    pub async fn update_service(
        &self,
        actor: &Profile,
        id: Uuid,
        payload: &UpdateServicePayload,
    ) -> Result<Service, AppError> {
        let service = self.get_owned_service(actor, id).await?;
        let updated = self.repo.update_service(service.id, payload).await?;

        self.governance
            .log_action(Some(actor.id), "service.updated", "service", Some(id), json!({}))
            .await;

        // Novo tamanho de equipe pode completar (ou não) quem já foi aceito
        let team_size_changed =
            updated.required_montadores_count != service.required_montadores_count;
        if team_size_changed && ensure_accepting(&service).is_ok() {
            return self.lifecycle.check_team_formation(id, Some(actor.id)).await;
        }

        Ok(updated)
    }

    pub async fn delete_service(&self, actor: &Profile, id: Uuid) -> Result<(), AppError> {
        let service = self.get_owned_service(actor, id).await?;

        if !self.repo.delete_service(service.id).await? {
            return Err(AppError::ServiceNotFound);
        }

        self.governance
            .log_action(
                Some(actor.id),
                "service.deleted",
                "service",
                Some(id),
                json!({ "title": service.title, "status": service.status }),
            )
            .await;

        Ok(())
    }

    pub async fn change_status(
        &self,
        actor: &Profile,
        id: Uuid,
        next_status: ServiceStatus,
        details: Option<Value>,
    ) -> Result<Service, AppError> {
        self.get_owned_service(actor, id).await?;
        self.lifecycle
            .transition_status(id, next_status, Some(actor.id), details.unwrap_or(Value::Null))
            .await
    }

    // =========================================================================
    //  EQUIPE
    // =========================================================================

    pub async fn list_assignments(&self, service_id: Uuid) -> Result<Vec<ServiceAssignment>, AppError> {
        self.get_service(service_id).await?;
        self.repo.list_assignments(service_id).await
    }

    pub async fn invite_montador(
        &self,
        actor: &Profile,
        service_id: Uuid,
        montador_id: Uuid,
    ) -> Result<ServiceAssignment, AppError> {
        let service = self.get_owned_service(actor, service_id).await?;
        ensure_accepting(&service)?;

        let montador = self
            .profile_repo
            .find_by_id(montador_id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        if montador.role != ProfileRole::Montador || montador.status != ProfileStatus::Approved {
            return Err(AppError::InvalidTransition("montador_not_available".into()));
        }

        let assignment = self
            .repo
            .upsert_assignment(service_id, montador_id, AssignmentStatus::Invited)
            .await?
            .ok_or_else(|| {
                AppError::UniqueConstraintViolation("service_assignments_service_montador_key".into())
            })?;

        self.governance
            .log_action(
                Some(actor.id),
                "assignment.invited",
                "service",
                Some(service_id),
                json!({ "assignmentId": assignment.id, "montadorId": montador_id }),
            )
            .await;

        Ok(assignment)
    }

    pub async fn apply(&self, montador: &Profile, service_id: Uuid) -> Result<ServiceAssignment, AppError> {
        let service = self.get_service(service_id).await?;
        ensure_accepting(&service)?;

        let assignment = self
            .repo
            .upsert_assignment(service_id, montador.id, AssignmentStatus::Applied)
            .await?
            .ok_or_else(|| {
                AppError::UniqueConstraintViolation("service_assignments_service_montador_key".into())
            })?;

        self.governance
            .log_action(
                Some(montador.id),
                "assignment.applied",
                "service",
                Some(service_id),
                json!({ "assignmentId": assignment.id }),
            )
            .await;

        Ok(assignment)
    }

    /// Aceitar, recusar ou remover um vínculo. Um aceite recalcula a formação da equipe.
    pub async fn update_assignment(
        &self,
        actor: &Profile,
        service_id: Uuid,
        assignment_id: Uuid,
        next: AssignmentStatus,
    ) -> Result<ServiceAssignment, AppError> {
        let assignment = self
            .repo
            .find_assignment(assignment_id)
            .await?
            .filter(|a| a.service_id == service_id)
            .ok_or_else(|| AppError::ResourceNotFound(format!("assignment {}", assignment_id)))?;

        let service = self.get_service(service_id).await?;

        let side = if assignment.montador_id == actor.id {
            AssignmentActor::Montador
        } else if owns_service(actor, &service) {
            AssignmentActor::Company
        } else {
            return Err(AppError::NotResourceOwner);
        };

        assignment_transition(assignment.status, next, side)?;

        let updated = match (assignment.status, next) {
            (_, AssignmentStatus::Accepted) => self.accept_assignment(service_id, &assignment).await?,
            (AssignmentStatus::Accepted, AssignmentStatus::Removed) => {
                self.remove_accepted(service_id, &assignment).await?
            }
            _ => self.repo.update_assignment_status(&self.pool, assignment_id, next).await?,
        };

        self.governance
            .log_action(
                Some(actor.id),
                "assignment.status_changed",
                "service",
                Some(service_id),
                json!({
                    "assignmentId": assignment_id,
                    "montadorId": assignment.montador_id,
                    "from": assignment.status,
                    "to": next,
                }),
            )
            .await;

        if next == AssignmentStatus::Accepted {
            self.lifecycle.check_team_formation(service_id, Some(actor.id)).await?;
        }

        Ok(updated)
    }

    // O serviço fica travado enquanto o aceite é gravado: depois de fechado,
    // nenhum aceite atrasado passa.
    async fn accept_assignment(
        &self,
        service_id: Uuid,
        assignment: &ServiceAssignment,
    ) -> Result<ServiceAssignment, AppError> {
        let mut tx = self.pool.begin().await?;

        let service = self
            .repo
            .lock_by_id(&mut *tx, service_id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;
        ensure_accepting(&service)?;

        let updated = self
            .repo
            .update_assignment_status(&mut *tx, assignment.id, AssignmentStatus::Accepted)
            .await?;
        self.repo
            .set_primary_montador_if_empty(&mut *tx, service_id, assignment.montador_id)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // Quem sai da equipe deixa de ser o responsável principal.
    async fn remove_accepted(
        &self,
        service_id: Uuid,
        assignment: &ServiceAssignment,
    ) -> Result<ServiceAssignment, AppError> {
        let mut tx = self.pool.begin().await?;

        self.repo
            .lock_by_id(&mut *tx, service_id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;

        let updated = self
            .repo
            .update_assignment_status(&mut *tx, assignment.id, AssignmentStatus::Removed)
            .await?;
        self.repo
            .reassign_primary_montador(&mut *tx, service_id, assignment.montador_id)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // =========================================================================
    //  ANEXOS
    // =========================================================================

    pub async fn list_attachments(&self, service_id: Uuid) -> Result<Vec<ServiceAttachment>, AppError> {
        self.get_service(service_id).await?;
        self.repo.list_attachments(service_id).await
    }

    pub async fn add_attachment(
        &self,
        actor: &Profile,
        service_id: Uuid,
        payload: &CreateAttachmentPayload,
    ) -> Result<ServiceAttachment, AppError> {
        let service = self.get_service(service_id).await?;

        if !owns_service(actor, &service) && !self.repo.is_active_montador(service_id, actor.id).await? {
            return Err(AppError::NotResourceOwner);
        }

        let attachment = self.repo.create_attachment(service_id, actor.id, payload).await?;

        self.governance
            .log_action(
                Some(actor.id),
                "attachment.added",
                "service",
                Some(service_id),
                json!({ "attachmentId": attachment.id, "fileName": attachment.file_name }),
            )
            .await;

        Ok(attachment)
    }

    pub async fn delete_attachment(
        &self,
        actor: &Profile,
        service_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<(), AppError> {
        let service = self.get_service(service_id).await?;
        let attachment = self
            .repo
            .find_attachment(service_id, attachment_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("attachment {}", attachment_id)))?;

        if attachment.uploaded_by != actor.id && !owns_service(actor, &service) {
            return Err(AppError::NotResourceOwner);
        }

        self.repo.delete_attachment(attachment_id).await?;

        self.governance
            .log_action(
                Some(actor.id),
                "attachment.removed",
                "service",
                Some(service_id),
                json!({ "attachmentId": attachment_id, "fileName": attachment.file_name }),
            )
            .await;

        Ok(())
    }

    async fn get_owned_service(&self, actor: &Profile, id: Uuid) -> Result<Service, AppError> {
        let service = self.get_service(id).await?;
        if owns_service(actor, &service) {
            Ok(service)
        } else {
            Err(AppError::NotResourceOwner)
        }
    }
}

/// Perfil da empresa dona do serviço, ou admin.
pub fn owns_service(actor: &Profile, service: &Service) -> bool {
    actor.is_admin() || actor.company_id == Some(service.company_id)
}

fn ensure_accepting(service: &Service) -> Result<(), AppError> {
    if service.is_open && service.status.accepts_montadores() {
        Ok(())
    } else {
        Err(AppError::ServiceClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use AssignmentStatus::*;

    fn profile(role: ProfileRole, company_id: Option<Uuid>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role,
            status: ProfileStatus::Approved,
            full_name: "Teste".into(),
            cpf: None,
            phone: None,
            city: None,
            state: None,
            bio: None,
            specialties: vec![],
            experience_years: None,
            company_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(company_id: Uuid, status: ServiceStatus, is_open: bool) -> Service {
        Service {
            id: Uuid::new_v4(),
            company_id,
            montador_id: None,
            created_by: Uuid::new_v4(),
            title: "Montagem de cozinha".into(),
            description: None,
            address: None,
            city: None,
            state: None,
            scheduled_for: None,
            price_cents: 30000,
            required_montadores_count: 2,
            status,
            is_open,
            pending_confirmation_by: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn company_decides_applications() {
        assert!(assignment_transition(Applied, Accepted, AssignmentActor::Company).is_ok());
        assert!(assignment_transition(Applied, Declined, AssignmentActor::Company).is_ok());
        assert!(assignment_transition(Accepted, Removed, AssignmentActor::Company).is_ok());
    }

    #[test]
    fn company_cannot_accept_its_own_invitation() {
        let err = assignment_transition(Invited, Accepted, AssignmentActor::Company).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn montador_answers_invitations() {
        assert!(assignment_transition(Invited, Accepted, AssignmentActor::Montador).is_ok());
        assert!(assignment_transition(Invited, Declined, AssignmentActor::Montador).is_ok());
        assert!(assignment_transition(Applied, Removed, AssignmentActor::Montador).is_ok());
    }

    #[test]
    fn montador_cannot_accept_own_application() {
        assert!(assignment_transition(Applied, Accepted, AssignmentActor::Montador).is_err());
    }

    #[test]
    fn closed_assignments_stay_closed() {
        for actor in [AssignmentActor::Company, AssignmentActor::Montador] {
            assert!(assignment_transition(Declined, Accepted, actor).is_err());
            assert!(assignment_transition(Removed, Accepted, actor).is_err());
        }
    }

    #[test]
    fn partner_without_company_has_no_scope() {
        assert!(scope_for(&profile(ProfileRole::Partner, None), false).is_none());

        let company_id = Uuid::new_v4();
        let scope = scope_for(&profile(ProfileRole::Partner, Some(company_id)), false);
        assert!(matches!(scope, Some(ServiceScope::Company(id)) if id == company_id));
    }

    #[test]
    fn montador_scope_respects_assigned_filter() {
        let montador = profile(ProfileRole::Montador, None);
        let scope = scope_for(&montador, true);
        assert!(matches!(
            scope,
            Some(ServiceScope::Montador { profile_id, assigned_only: true }) if profile_id == montador.id
        ));
    }

    #[test]
    fn ownership_is_company_or_admin() {
        let company_id = Uuid::new_v4();
        let job = service(company_id, ServiceStatus::Published, true);

        assert!(owns_service(&profile(ProfileRole::Partner, Some(company_id)), &job));
        assert!(owns_service(&profile(ProfileRole::Admin, None), &job));
        assert!(!owns_service(&profile(ProfileRole::Partner, Some(Uuid::new_v4())), &job));
        assert!(!owns_service(&profile(ProfileRole::Montador, None), &job));
    }

    #[test]
    fn only_open_services_take_montadores() {
        let company_id = Uuid::new_v4();
        assert!(ensure_accepting(&service(company_id, ServiceStatus::Published, true)).is_ok());
        assert!(matches!(
            ensure_accepting(&service(company_id, ServiceStatus::InProgress, false)),
            Err(AppError::ServiceClosed)
        ));
        assert!(matches!(
            ensure_accepting(&service(company_id, ServiceStatus::Draft, true)),
            Err(AppError::ServiceClosed)
        ));
    }
}
