// src/handlers/reviews.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, json::AppJson},
    models::review::{CreateReviewPayload, Review},
};

#[utoipa::path(
    get,
    path = "/api/services/{id}/reviews",
    tag = "Reviews",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses((status = 200, description = "Avaliações do serviço", body = [Review])),
    security(("api_jwt" = []))
)]
pub async fn list_service_reviews(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reviews = app_state
        .review_service
        .list_for_service(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(reviews))
}

#[utoipa::path(
    post,
    path = "/api/services/{id}/reviews",
    tag = "Reviews",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    request_body = CreateReviewPayload,
    responses(
        (status = 201, description = "Avaliação registrada", body = Review),
        (status = 400, description = "Notas fora de 1..5 ou avaliado inválido"),
        (status = 403, description = "Perfil não participou do serviço"),
        (status = 409, description = "Serviço ainda não concluído ou avaliação repetida")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_review(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CreateReviewPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let review = app_state
        .review_service
        .create_review(&user.profile, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(review)))
}
