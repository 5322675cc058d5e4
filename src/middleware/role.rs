// src/middleware/role.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::profile::ProfileRole,
};

/// Papel exigido por uma rota.
pub trait RoleDef: Send + Sync + 'static {
    fn roles() -> &'static [ProfileRole];
}

/// Guardião por papel. Devolve o perfil autenticado quando o papel confere.
pub struct RequireRole<T>(pub AuthenticatedUser, pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        if !T::roles().contains(&user.profile.role) {
            return Err(AppError::RoleNotAllowed.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(user, PhantomData))
    }
}

// ---
// PAPÉIS (TIPOS)
// ---

pub struct PartnerOnly;
impl RoleDef for PartnerOnly {
    fn roles() -> &'static [ProfileRole] { &[ProfileRole::Partner] }
}

pub struct MontadorOnly;
impl RoleDef for MontadorOnly {
    fn roles() -> &'static [ProfileRole] { &[ProfileRole::Montador] }
}

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn roles() -> &'static [ProfileRole] { &[ProfileRole::Admin] }
}

// Parceiro dono de empresa ou admin agindo por ele
pub struct PartnerOrAdmin;
impl RoleDef for PartnerOrAdmin {
    fn roles() -> &'static [ProfileRole] { &[ProfileRole::Partner, ProfileRole::Admin] }
}
