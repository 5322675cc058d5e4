// src/handlers/services.rs

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
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        json::AppJson,
        role::{PartnerOnly, RequireRole},
    },
    models::service::{
        ChangeStatusPayload, ConfirmCompletionPayload, ConfirmationResponse, CreateServicePayload,
        Service, ServiceDetail, ServiceFilter, UpdateServicePayload,
    },
};

// =============================================================================
//  CRUD
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Services",
    request_body = CreateServicePayload,
    responses(
        (status = 201, description = "Serviço criado (rascunho ou publicado)", body = Service),
        (status = 400, description = "Dados inválidos ou parceiro sem empresa"),
        (status = 403, description = "Apenas parceiros")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(user, _): RequireRole<PartnerOnly>,
    AppJson(payload): AppJson<CreateServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let service = app_state
        .job_service
        .create_service(&user.profile, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(service)))
}

#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Services",
    params(ServiceFilter),
    responses((status = 200, description = "Serviços visíveis para o perfil", body = [Service])),
    security(("api_jwt" = []))
)]
pub async fn list_services(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<ServiceFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let services = app_state
        .job_service
        .list_services(&user.profile, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(services))
}

#[utoipa::path(
    get,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses(
        (status = 200, description = "Serviço com equipe e anexos", body = ServiceDetail),
        (status = 404, description = "Serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_service(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .job_service
        .get_service_detail(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detail))
}

#[utoipa::path(
    patch,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    request_body = UpdateServicePayload,
    responses(
        (status = 200, description = "Serviço atualizado", body = Service),
        (status = 403, description = "Não é o dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let service = app_state
        .job_service
        .update_service(&user.profile, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(service))
}

#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses(
        (status = 204, description = "Serviço removido"),
        (status = 403, description = "Não é o dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .job_service
        .delete_service(&user.profile, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  CICLO DE VIDA
// =============================================================================

// Qualquer status pode ser aplicado; a auditoria registra o de/para
#[utoipa::path(
    post,
    path = "/api/services/{id}/status",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    request_body = ChangeStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = Service),
        (status = 403, description = "Não é o dono nem admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ChangeStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let service = app_state
        .job_service
        .change_status(&user.profile, id, payload.status, payload.details)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(service))
}

#[utoipa::path(
    post,
    path = "/api/services/{id}/confirm-completion",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    request_body = ConfirmCompletionPayload,
    responses(
        (status = 200, description = "Confirmação registrada", body = ConfirmationResponse),
        (status = 403, description = "Perfil não representa o lado informado"),
        (status = 409, description = "Status atual não permite confirmação")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_completion(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ConfirmCompletionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let response = app_state
        .lifecycle
        .confirm_completion(id, &user.profile, payload.side)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}
