// src/handlers/attachments.rs

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
    models::service::{CreateAttachmentPayload, ServiceAttachment},
};

#[utoipa::path(
    get,
    path = "/api/services/{id}/attachments",
    tag = "Attachments",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses((status = 200, description = "Anexos do serviço", body = [ServiceAttachment])),
    security(("api_jwt" = []))
)]
pub async fn list_attachments(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let attachments = app_state
        .job_service
        .list_attachments(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(attachments))
}

// Só metadados: o upload do arquivo acontece direto no storage
#[utoipa::path(
    post,
    path = "/api/services/{id}/attachments",
    tag = "Attachments",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    request_body = CreateAttachmentPayload,
    responses(
        (status = 201, description = "Anexo registrado", body = ServiceAttachment),
        (status = 403, description = "Nem dono nem montador escalado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_attachment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CreateAttachmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let attachment = app_state
        .job_service
        .add_attachment(&user.profile, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(attachment)))
}

#[utoipa::path(
    delete,
    path = "/api/services/{id}/attachments/{attachment_id}",
    tag = "Attachments",
    params(
        ("id" = Uuid, Path, description = "ID do serviço"),
        ("attachment_id" = Uuid, Path, description = "ID do anexo")
    ),
    responses(
        (status = 204, description = "Anexo removido"),
        (status = 403, description = "Nem quem enviou nem o dono")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_attachment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path((id, attachment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .job_service
        .delete_attachment(&user.profile, id, attachment_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
