// src/services/review_service.rs

use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, ProfileRepository, ReviewRepository, ServiceRepository},
    models::{
        profile::Profile,
        review::{CreateReviewPayload, ProfileReviews, Review},
        service::{Service, ServiceStatus},
    },
    services::{governance_service::GovernanceService, lifecycle_service::ServiceLifecycle},
};

/// Avaliações só depois que os dois lados confirmaram a conclusão.
pub fn review_window_open(status: ServiceStatus) -> bool {
    matches!(
        status,
        ServiceStatus::CompletedPendingEvaluation | ServiceStatus::Completed
    )
}

#[derive(Clone)]
pub struct ReviewService {
    repo: ReviewRepository,
    service_repo: ServiceRepository,
    company_repo: CompanyRepository,
    profile_repo: ProfileRepository,
    lifecycle: ServiceLifecycle,
    governance: GovernanceService,
}

impl ReviewService {
    pub fn new(
        repo: ReviewRepository,
        service_repo: ServiceRepository,
        company_repo: CompanyRepository,
        profile_repo: ProfileRepository,
        lifecycle: ServiceLifecycle,
        governance: GovernanceService,
    ) -> Self {
        Self { repo, service_repo, company_repo, profile_repo, lifecycle, governance }
    }

    /// A empresa avalia um montador da equipe; o montador avalia o dono da empresa.
    pub async fn create_review(
        &self,
        reviewer: &Profile,
        service_id: Uuid,
        payload: &CreateReviewPayload,
    ) -> Result<Review, AppError> {
        let service = self
            .service_repo
            .find_by_id(service_id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;

        if !review_window_open(service.status) {
            return Err(AppError::ReviewNotAllowed);
        }

        if payload.reviewee_id == reviewer.id {
            return Err(AppError::InvalidReviewee);
        }

        if reviewer.company_id == Some(service.company_id) {
            if !self.is_team_member(&service, payload.reviewee_id).await? {
                return Err(AppError::InvalidReviewee);
            }
        } else if self.is_team_member(&service, reviewer.id).await? {
            let company = self
                .company_repo
                .find_by_id(service.company_id)
                .await?
                .ok_or(AppError::CompanyNotFound)?;
            if payload.reviewee_id != company.owner_id {
                return Err(AppError::InvalidReviewee);
            }
        } else {
            return Err(AppError::NotResourceOwner);
        }

        let review = self.repo.create_review(service_id, reviewer.id, payload).await?;

        self.governance
            .log_action(
                Some(reviewer.id),
                "review.created",
                "service",
                Some(service_id),
                json!({ "reviewId": review.id, "revieweeId": review.reviewee_id }),
            )
            .await;

        self.lifecycle.finalize_if_evaluated(service_id, Some(reviewer.id)).await?;

        Ok(review)
    }

    pub async fn list_for_service(&self, service_id: Uuid) -> Result<Vec<Review>, AppError> {
        self.service_repo
            .find_by_id(service_id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;
        self.repo.list_for_service(service_id).await
    }

    pub async fn profile_reviews(&self, profile_id: Uuid) -> Result<ProfileReviews, AppError> {
        self.profile_repo
            .find_by_id(profile_id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let summary = self.repo.rating_summary(profile_id).await?;
        let reviews = self.repo.list_for_reviewee(profile_id).await?;

        Ok(ProfileReviews { profile_id, summary, reviews })
    }

    async fn is_team_member(&self, service: &Service, profile_id: Uuid) -> Result<bool, AppError> {
        if service.montador_id == Some(profile_id) {
            return Ok(true);
        }
        self.service_repo.is_active_montador(service.id, profile_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reviews_open_only_after_confirmation() {
        assert!(review_window_open(ServiceStatus::CompletedPendingEvaluation));
        assert!(review_window_open(ServiceStatus::Completed));
        assert!(!review_window_open(ServiceStatus::CompletedPendingConfirmation));
        assert!(!review_window_open(ServiceStatus::InProgress));
        assert!(!review_window_open(ServiceStatus::Cancelled));
    }
}
