// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        auth::User,
        profile::{Profile, ProfileStatus},
    },
};

/// Nome do cookie HttpOnly com o JWT da sessão.
pub const SESSION_COOKIE: &str = "mc_session";

/// Usuário e perfil da sessão, colocados nos extensions pelo `auth_guard`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub profile: Profile,
}

/// Lê o token do `Authorization: Bearer` e, na falta dele, do cookie de sessão.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());
    let reject = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let token = session_token(request.headers()).ok_or_else(|| reject(AppError::InvalidToken))?;

    let (user, profile) = app_state
        .auth_service
        .validate_token(&token)
        .await
        .map_err(reject)?;

    if profile.status == ProfileStatus::Blocked {
        tracing::warn!(profile_id = %profile.id, "Perfil bloqueado tentou acessar a API");
        return Err(reject(AppError::ProfileBlocked));
    }

    request.extensions_mut().insert(AuthenticatedUser { user, profile });
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);
        Err(AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue, StatusCode};
    use sqlx::postgres::PgPoolOptions;

    use crate::config::AppConfig;

    fn lazy_state() -> AppState {
        let config = AppConfig {
            database_url: "postgres://localhost/montador_conecta_unused".into(),
            jwt_secret: "segredo-de-teste".into(),
            bind_addr: "127.0.0.1:0".into(),
            db_max_connections: 1,
            jwt_ttl_days: 7,
            flag_block_threshold: 5,
            session_cookie_secure: false,
            cors_allowed_origin: None,
        };
        let pool = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
        AppState::from_parts(config, pool).unwrap()
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer do-header"));
        headers.insert(header::COOKIE, HeaderValue::from_static("mc_session=do-cookie"));

        assert_eq!(session_token(&headers).as_deref(), Some("do-header"));
    }

    #[test]
    fn falls_back_to_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("tema=escuro; mc_session=do-cookie"));

        assert_eq!(session_token(&headers).as_deref(), Some("do-cookie"));
    }

    #[test]
    fn no_credentials_means_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(session_token(&headers).is_none());
    }

    #[tokio::test]
    async fn extractor_without_session_answers_in_client_language() {
        let state = lazy_state();
        let (mut parts, _) = axum::http::Request::builder()
            .header(header::ACCEPT_LANGUAGE, "pt-BR")
            .body(())
            .unwrap()
            .into_parts();

        let err = AuthenticatedUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.error, "Token de autenticação inválido ou ausente.");
    }
}
