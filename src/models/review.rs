// src/models/review.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Avaliação em cinco dimensões (1 a 5)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub service_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    #[schema(example = 5)]
    pub punctuality: i16,
    #[schema(example = 5)]
    pub quality: i16,
    #[schema(example = 4)]
    pub communication: i16,
    #[schema(example = 5)]
    pub professionalism: i16,
    #[schema(example = 4)]
    pub cleanliness: i16,
    #[schema(example = "Montagem rápida e caprichada.")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewPayload {
    pub reviewee_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "rating_range"))]
    pub punctuality: i16,
    #[validate(range(min = 1, max = 5, message = "rating_range"))]
    pub quality: i16,
    #[validate(range(min = 1, max = 5, message = "rating_range"))]
    pub communication: i16,
    #[validate(range(min = 1, max = 5, message = "rating_range"))]
    pub professionalism: i16,
    #[validate(range(min = 1, max = 5, message = "rating_range"))]
    pub cleanliness: i16,
    #[validate(length(max = 2000, message = "too_long"))]
    pub comment: Option<String>,
}

// Médias calculadas pelo Postgres (AVG devolve NUMERIC)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    #[schema(example = 12)]
    pub review_count: i64,
    #[schema(example = "4.75")]
    pub average_overall: Option<Decimal>,
    pub average_punctuality: Option<Decimal>,
    pub average_quality: Option<Decimal>,
    pub average_communication: Option<Decimal>,
    pub average_professionalism: Option<Decimal>,
    pub average_cleanliness: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileReviews {
    pub profile_id: Uuid,
    pub summary: RatingSummary,
    pub reviews: Vec<Review>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(score: i16) -> CreateReviewPayload {
        CreateReviewPayload {
            reviewee_id: Uuid::new_v4(),
            punctuality: score,
            quality: score,
            communication: score,
            professionalism: score,
            cleanliness: score,
            comment: None,
        }
    }

    #[test]
    fn ratings_must_be_between_one_and_five() {
        assert!(payload(1).validate().is_ok());
        assert!(payload(5).validate().is_ok());
        assert_eq!(payload(0).validate().unwrap_err().field_errors().len(), 5);
        assert!(payload(6).validate().is_err());
    }
}
