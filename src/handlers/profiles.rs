// src/handlers/profiles.rs

use axum::{
    extract::{Path, Query, State},
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
    models::{
        governance::{CreateFlagPayload, FlagReport},
        profile::{MontadorFilter, Profile, UpdateProfilePayload},
        review::ProfileReviews,
    },
};

#[utoipa::path(
    get,
    path = "/api/profiles/me",
    tag = "Profiles",
    responses((status = 200, description = "Perfil da sessão", body = Profile)),
    security(("api_jwt" = []))
)]
pub async fn get_my_profile(user: AuthenticatedUser) -> Json<Profile> {
    Json(user.profile)
}

#[utoipa::path(
    patch,
    path = "/api/profiles/me",
    tag = "Profiles",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = Profile),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "CPF já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_my_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    AppJson(payload): AppJson<UpdateProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let profile = app_state
        .profile_service
        .update_own_profile(&user.profile, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{id}",
    tag = "Profiles",
    params(("id" = Uuid, Path, description = "ID do perfil")),
    responses(
        (status = 200, description = "Perfil", body = Profile),
        (status = 404, description = "Perfil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .profile_service
        .get_profile(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{id}/reviews",
    tag = "Profiles",
    params(("id" = Uuid, Path, description = "ID do perfil avaliado")),
    responses((status = 200, description = "Avaliações recebidas e médias", body = ProfileReviews)),
    security(("api_jwt" = []))
)]
pub async fn get_profile_reviews(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reviews = app_state
        .review_service
        .profile_reviews(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(reviews))
}

#[utoipa::path(
    post,
    path = "/api/profiles/{id}/flags",
    tag = "Profiles",
    params(("id" = Uuid, Path, description = "ID do perfil denunciado")),
    request_body = CreateFlagPayload,
    responses(
        (status = 201, description = "Denúncia registrada", body = FlagReport),
        (status = 400, description = "Denúncia contra si mesmo")
    ),
    security(("api_jwt" = []))
)]
pub async fn report_flag(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CreateFlagPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let report = app_state
        .governance_service
        .report_flag(&user.profile, id, payload.reason.trim(), payload.service_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(report)))
}

// GET /api/montadores
#[utoipa::path(
    get,
    path = "/api/montadores",
    tag = "Profiles",
    params(MontadorFilter),
    responses((status = 200, description = "Montadores aprovados", body = [Profile])),
    security(("api_jwt" = []))
)]
pub async fn list_montadores(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<MontadorFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let montadores = app_state
        .profile_service
        .list_montadores(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(montadores))
}
