// src/services/governance_service.rs

use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::{db_utils::clamp_limit, error::AppError},
    db::{GovernanceRepository, ProfileRepository},
    models::{
        governance::{AuditLog, AuditLogFilter, FlagFilter, Flag, FlagReport},
        profile::Profile,
    },
};

pub const DEFAULT_AUDIT_LIMIT: i64 = 50;
pub const MAX_AUDIT_LIMIT: i64 = 200;

/// Auditoria e denúncias. Só recomenda bloqueios; quem bloqueia é o admin.
#[derive(Clone)]
pub struct GovernanceService {
    repo: GovernanceRepository,
    profile_repo: ProfileRepository,
    flag_block_threshold: i64,
}

impl GovernanceService {
    pub fn new(
        repo: GovernanceRepository,
        profile_repo: ProfileRepository,
        flag_block_threshold: i64,
    ) -> Self {
        Self { repo, profile_repo, flag_block_threshold }
    }

    /// Grava uma linha de auditoria. Falhas vão para o log e não interrompem quem chamou.
    pub async fn log_action(
        &self,
        actor_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Option<Uuid>,
        details: Value,
    ) {
        if let Err(e) = self
            .repo
            .insert_audit_log(actor_id, action, entity_type, entity_id, &details)
            .await
        {
            tracing::error!(
                action,
                entity_type,
                ?entity_id,
                "Falha ao gravar auditoria: {}",
                e
            );
        }
    }

    pub async fn report_flag(
        &self,
        reporter: &Profile,
        profile_id: Uuid,
        reason: &str,
        service_id: Option<Uuid>,
    ) -> Result<FlagReport, AppError> {
        if reporter.id == profile_id {
            return Err(AppError::CannotFlagSelf);
        }

        self.profile_repo
            .find_by_id(profile_id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let flag = self
            .repo
            .insert_flag(profile_id, reporter.id, service_id, reason)
            .await?;

        self.log_action(
            Some(reporter.id),
            "profile.flagged",
            "profile",
            Some(profile_id),
            json!({ "flagId": flag.id, "serviceId": service_id }),
        )
        .await;

        let total_flags = self.repo.count_flags(profile_id).await?;
        let block_recommended = block_recommended(total_flags, self.flag_block_threshold);

        if block_recommended {
            tracing::warn!(%profile_id, total_flags, "Perfil atingiu o limite de denúncias");
            self.log_action(
                None,
                "profile.block_recommended",
                "profile",
                Some(profile_id),
                json!({ "totalFlags": total_flags, "threshold": self.flag_block_threshold }),
            )
            .await;
        }

        Ok(FlagReport { flag, total_flags, block_recommended })
    }

    pub async fn list_audit_logs(&self, filter: &AuditLogFilter) -> Result<Vec<AuditLog>, AppError> {
        self.repo
            .list_audit_logs(
                filter.entity_type.as_deref(),
                filter.entity_id,
                filter.actor_id,
                clamp_limit(filter.limit, DEFAULT_AUDIT_LIMIT, MAX_AUDIT_LIMIT),
            )
            .await
    }

    pub async fn list_flags(&self, filter: &FlagFilter) -> Result<Vec<Flag>, AppError> {
        self.repo
            .list_flags(
                filter.profile_id,
                clamp_limit(filter.limit, DEFAULT_AUDIT_LIMIT, MAX_AUDIT_LIMIT),
            )
            .await
    }
}

fn block_recommended(total_flags: i64, threshold: i64) -> bool {
    total_flags >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_starts_at_threshold() {
        assert!(!block_recommended(4, 5));
        assert!(block_recommended(5, 5));
        assert!(block_recommended(9, 5));
    }
}
