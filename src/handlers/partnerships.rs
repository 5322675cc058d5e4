// src/handlers/partnerships.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, json::AppJson},
    models::partnership::{CreatePartnershipPayload, Partnership, UpdatePartnershipPayload},
};

#[utoipa::path(
    get,
    path = "/api/partnerships",
    tag = "Partnerships",
    responses((status = 200, description = "Parcerias do perfil (ou da empresa dele)", body = [Partnership])),
    security(("api_jwt" = []))
)]
pub async fn list_partnerships(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let partnerships = app_state
        .partnership_service
        .list_own(&user.profile)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(partnerships))
}

#[utoipa::path(
    post,
    path = "/api/partnerships",
    tag = "Partnerships",
    request_body = CreatePartnershipPayload,
    responses(
        (status = 201, description = "Proposta enviada", body = Partnership),
        (status = 400, description = "Falta o outro lado da parceria"),
        (status = 409, description = "Parceria já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn propose_partnership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    AppJson(payload): AppJson<CreatePartnershipPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let partnership = app_state
        .partnership_service
        .propose(&user.profile, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(partnership)))
}

#[utoipa::path(
    patch,
    path = "/api/partnerships/{id}",
    tag = "Partnerships",
    params(("id" = Uuid, Path, description = "ID da parceria")),
    request_body = UpdatePartnershipPayload,
    responses(
        (status = 200, description = "Parceria atualizada", body = Partnership),
        (status = 403, description = "Perfil não faz parte da parceria"),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_partnership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdatePartnershipPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let partnership = app_state
        .partnership_service
        .update_status(&user.profile, id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(partnership))
}
