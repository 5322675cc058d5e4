// src/db/review_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    models::review::{CreateReviewPayload, RatingSummary, Review},
};

#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_review(
        &self,
        service_id: Uuid,
        reviewer_id: Uuid,
        payload: &CreateReviewPayload,
    ) -> Result<Review, AppError> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (
                service_id, reviewer_id, reviewee_id,
                punctuality, quality, communication, professionalism, cleanliness,
                comment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(service_id)
        .bind(reviewer_id)
        .bind(payload.reviewee_id)
        .bind(payload.punctuality)
        .bind(payload.quality)
        .bind(payload.communication)
        .bind(payload.professionalism)
        .bind(payload.cleanliness)
        .bind(payload.comment.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    pub async fn list_for_service(&self, service_id: Uuid) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE service_id = $1 ORDER BY created_at DESC",
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    pub async fn list_for_reviewee(&self, reviewee_id: Uuid) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE reviewee_id = $1 ORDER BY created_at DESC",
        )
        .bind(reviewee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    // AVG de SMALLINT devolve NUMERIC; sem avaliações as médias vêm NULL
    pub async fn rating_summary(&self, reviewee_id: Uuid) -> Result<RatingSummary, AppError> {
        let summary = sqlx::query_as::<_, RatingSummary>(
            r#"
            SELECT
                COUNT(*) AS review_count,
                ROUND(AVG((punctuality + quality + communication + professionalism + cleanliness)::numeric / 5), 2)
                    AS average_overall,
                ROUND(AVG(punctuality), 2) AS average_punctuality,
                ROUND(AVG(quality), 2) AS average_quality,
                ROUND(AVG(communication), 2) AS average_communication,
                ROUND(AVG(professionalism), 2) AS average_professionalism,
                ROUND(AVG(cleanliness), 2) AS average_cleanliness
            FROM reviews
            WHERE reviewee_id = $1
            "#,
        )
        .bind(reviewee_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }

    /// (empresa avaliou, algum montador avaliou) para o serviço.
    pub async fn evaluation_sides(
        &self,
        service_id: Uuid,
        company_id: Uuid,
    ) -> Result<(bool, bool), AppError> {
        let sides = sqlx::query_as::<_, (bool, bool)>(
            r#"
            SELECT
                EXISTS (
                    SELECT 1 FROM reviews r
                    JOIN profiles p ON p.id = r.reviewer_id
                    WHERE r.service_id = $1 AND p.company_id = $2
                ),
                EXISTS (
                    SELECT 1 FROM reviews r
                    JOIN profiles p ON p.id = r.reviewer_id
                    WHERE r.service_id = $1 AND p.role = 'montador'
                )
            "#,
        )
        .bind(service_id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(sides)
    }
}
