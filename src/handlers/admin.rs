// src/handlers/admin.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        role::{AdminOnly, RequireRole},
    },
    models::{
        governance::{AuditLog, AuditLogFilter, Flag, FlagFilter},
        profile::Profile,
    },
};

#[utoipa::path(
    get,
    path = "/api/admin/profiles/pending",
    tag = "Admin",
    responses(
        (status = 200, description = "Perfis aguardando aprovação", body = [Profile]),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pending_profiles(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let profiles = app_state
        .profile_service
        .list_pending()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profiles))
}

// Idempotente: aprovar de novo devolve o perfil sem alterar nada
#[utoipa::path(
    post,
    path = "/api/admin/profiles/{id}/approve",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do perfil")),
    responses(
        (status = 200, description = "Perfil aprovado", body = Profile),
        (status = 404, description = "Perfil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(admin, _): RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .profile_service
        .approve_profile(&admin.profile, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profile))
}

#[utoipa::path(
    post,
    path = "/api/admin/profiles/{id}/block",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do perfil")),
    responses(
        (status = 200, description = "Perfil bloqueado", body = Profile),
        (status = 404, description = "Perfil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn block_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(admin, _): RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .profile_service
        .block_profile(&admin.profile, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/admin/audit-logs",
    tag = "Admin",
    params(AuditLogFilter),
    responses((status = 200, description = "Auditoria, mais recentes primeiro", body = [AuditLog])),
    security(("api_jwt" = []))
)]
pub async fn list_audit_logs(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireRole<AdminOnly>,
    Query(filter): Query<AuditLogFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = app_state
        .governance_service
        .list_audit_logs(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(logs))
}

#[utoipa::path(
    get,
    path = "/api/admin/flags",
    tag = "Admin",
    params(FlagFilter),
    responses((status = 200, description = "Denúncias, mais recentes primeiro", body = [Flag])),
    security(("api_jwt" = []))
)]
pub async fn list_flags(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireRole<AdminOnly>,
    Query(filter): Query<FlagFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let flags = app_state
        .governance_service
        .list_flags(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(flags))
}
