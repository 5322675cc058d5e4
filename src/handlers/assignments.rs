// src/handlers/assignments.rs

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
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        json::AppJson,
        role::{MontadorOnly, PartnerOrAdmin, RequireRole},
    },
    models::service::{InviteMontadorPayload, ServiceAssignment, UpdateAssignmentPayload},
};

#[utoipa::path(
    get,
    path = "/api/services/{id}/assignments",
    tag = "Assignments",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses((status = 200, description = "Equipe do serviço", body = [ServiceAssignment])),
    security(("api_jwt" = []))
)]
pub async fn list_assignments(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let assignments = app_state
        .job_service
        .list_assignments(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(assignments))
}

#[utoipa::path(
    post,
    path = "/api/services/{id}/assignments",
    tag = "Assignments",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    request_body = InviteMontadorPayload,
    responses(
        (status = 201, description = "Montador convidado", body = ServiceAssignment),
        (status = 409, description = "Serviço fechado ou vínculo já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn invite_montador(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(user, _): RequireRole<PartnerOrAdmin>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<InviteMontadorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = app_state
        .job_service
        .invite_montador(&user.profile, id, payload.montador_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(assignment)))
}

#[utoipa::path(
    post,
    path = "/api/services/{id}/apply",
    tag = "Assignments",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses(
        (status = 201, description = "Candidatura registrada", body = ServiceAssignment),
        (status = 403, description = "Apenas montadores"),
        (status = 409, description = "Serviço fechado ou candidatura já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn apply(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(user, _): RequireRole<MontadorOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = app_state
        .job_service
        .apply(&user.profile, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(assignment)))
}

// Aceite dispara a checagem de formação de equipe
#[utoipa::path(
    patch,
    path = "/api/services/{id}/assignments/{assignment_id}",
    tag = "Assignments",
    params(
        ("id" = Uuid, Path, description = "ID do serviço"),
        ("assignment_id" = Uuid, Path, description = "ID do vínculo")
    ),
    request_body = UpdateAssignmentPayload,
    responses(
        (status = 200, description = "Vínculo atualizado", body = ServiceAssignment),
        (status = 409, description = "Transição inválida ou serviço fechado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_assignment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path((id, assignment_id)): Path<(Uuid, Uuid)>,
    AppJson(payload): AppJson<UpdateAssignmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = app_state
        .job_service
        .update_assignment(&user.profile, id, assignment_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(assignment))
}
