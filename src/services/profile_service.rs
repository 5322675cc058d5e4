// src/services/profile_service.rs

use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProfileRepository,
    models::profile::{MontadorFilter, Profile, ProfileStatus, UpdateProfilePayload},
    services::governance_service::GovernanceService,
};

#[derive(Clone)]
pub struct ProfileService {
    repo: ProfileRepository,
    governance: GovernanceService,
}

impl ProfileService {
    pub fn new(repo: ProfileRepository, governance: GovernanceService) -> Self {
        Self { repo, governance }
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<Profile, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::ProfileNotFound)
    }

    pub async fn update_own_profile(
        &self,
        profile: &Profile,
        payload: &UpdateProfilePayload,
    ) -> Result<Profile, AppError> {
        let updated = self.repo.update_profile(profile.id, payload).await?;

        self.governance
            .log_action(Some(profile.id), "profile.updated", "profile", Some(profile.id), json!({}))
            .await;

        Ok(updated)
    }

    pub async fn list_montadores(&self, filter: &MontadorFilter) -> Result<Vec<Profile>, AppError> {
        self.repo.list_montadores(filter).await
    }

    pub async fn list_pending(&self) -> Result<Vec<Profile>, AppError> {
        self.repo.list_pending().await
    }

    /// Aprovar um perfil já aprovado não muda nada nem gera auditoria.
    pub async fn approve_profile(&self, admin: &Profile, id: Uuid) -> Result<Profile, AppError> {
        self.change_status(admin, id, ProfileStatus::Approved, "profile.approved").await
    }

    pub async fn block_profile(&self, admin: &Profile, id: Uuid) -> Result<Profile, AppError> {
        self.change_status(admin, id, ProfileStatus::Blocked, "profile.blocked").await
    }

    async fn change_status(
        &self,
        admin: &Profile,
        id: Uuid,
        status: ProfileStatus,
        action: &str,
    ) -> Result<Profile, AppError> {
        let current = self.get_profile(id).await?;
        if current.status == status {
            return Ok(current);
        }

        let updated = self.repo.set_status(id, status).await?;

        tracing::info!(profile_id = %id, from = ?current.status, to = ?status, "Status do perfil alterado pelo admin");

        self.governance
            .log_action(
                Some(admin.id),
                action,
                "profile",
                Some(id),
                json!({ "from": current.status, "to": status }),
            )
            .await;

        Ok(updated)
    }
}
