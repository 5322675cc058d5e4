// src/services/company_service.rs

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, ProfileRepository},
    models::{
        company::{Company, CreateCompanyPayload, UpdateCompanyPayload},
        profile::Profile,
    },
    services::governance_service::GovernanceService,
};

#[derive(Clone)]
pub struct CompanyService {
    repo: CompanyRepository,
    profile_repo: ProfileRepository,
    governance: GovernanceService,
    pool: PgPool,
}

impl CompanyService {
    pub fn new(
        repo: CompanyRepository,
        profile_repo: ProfileRepository,
        governance: GovernanceService,
        pool: PgPool,
    ) -> Self {
        Self { repo, profile_repo, governance, pool }
    }

    /// Cria a empresa e vincula ao perfil do dono na mesma transação.
    pub async fn create_company(
        &self,
        owner: &Profile,
        payload: &CreateCompanyPayload,
    ) -> Result<Company, AppError> {
        if owner.company_id.is_some() {
            return Err(AppError::CompanyAlreadyExists);
        }

        let mut tx = self.pool.begin().await?;

        let company = self.repo.create_company(&mut *tx, owner.id, payload).await?;
        self.profile_repo.set_company(&mut *tx, owner.id, company.id).await?;

        tx.commit().await?;

        self.governance
            .log_action(
                Some(owner.id),
                "company.created",
                "company",
                Some(company.id),
                json!({ "tradingName": company.trading_name }),
            )
            .await;

        Ok(company)
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Company, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::CompanyNotFound)
    }

    pub async fn get_my_company(&self, profile: &Profile) -> Result<Company, AppError> {
        let company_id = profile.company_id.ok_or(AppError::CompanyRequired)?;
        self.get_company(company_id).await
    }

    pub async fn update_company(
        &self,
        actor: &Profile,
        id: Uuid,
        payload: &UpdateCompanyPayload,
    ) -> Result<Company, AppError> {
        let company = self.get_company(id).await?;

        if company.owner_id != actor.id && !actor.is_admin() {
            return Err(AppError::NotResourceOwner);
        }

        let updated = self.repo.update_company(id, payload).await?;

        self.governance
            .log_action(Some(actor.id), "company.updated", "company", Some(id), json!({}))
            .await;

        Ok(updated)
    }
}
