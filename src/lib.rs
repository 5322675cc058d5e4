// src/lib.rs

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

/// Monta o router completo da API. O `main` só liga isso num listener.
pub fn build_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout));

    // Daqui para baixo tudo passa pelo auth_guard
    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let profile_routes = Router::new()
        .route(
            "/me",
            get(handlers::profiles::get_my_profile).patch(handlers::profiles::update_my_profile),
        )
        .route("/{id}", get(handlers::profiles::get_profile))
        .route("/{id}/reviews", get(handlers::profiles::get_profile_reviews))
        .route("/{id}/flags", post(handlers::profiles::report_flag));

    let company_routes = Router::new()
        .route("/", post(handlers::companies::create_company))
        .route("/me", get(handlers::companies::get_my_company))
        .route(
            "/{id}",
            get(handlers::companies::get_company).patch(handlers::companies::update_company),
        );

    let service_routes = Router::new()
        .route(
            "/",
            post(handlers::services::create_service).get(handlers::services::list_services),
        )
        .route(
            "/{id}",
            get(handlers::services::get_service)
                .patch(handlers::services::update_service)
                .delete(handlers::services::delete_service),
        )
        .route("/{id}/status", post(handlers::services::change_status))
        .route("/{id}/confirm-completion", post(handlers::services::confirm_completion))
        .route(
            "/{id}/assignments",
            get(handlers::assignments::list_assignments).post(handlers::assignments::invite_montador),
        )
        .route(
            "/{id}/assignments/{assignment_id}",
            patch(handlers::assignments::update_assignment),
        )
        .route("/{id}/apply", post(handlers::assignments::apply))
        .route(
            "/{id}/attachments",
            get(handlers::attachments::list_attachments).post(handlers::attachments::add_attachment),
        )
        .route(
            "/{id}/attachments/{attachment_id}",
            axum::routing::delete(handlers::attachments::delete_attachment),
        )
        .route(
            "/{id}/reviews",
            get(handlers::reviews::list_service_reviews).post(handlers::reviews::create_review),
        );

    let partnership_routes = Router::new()
        .route(
            "/",
            get(handlers::partnerships::list_partnerships)
                .post(handlers::partnerships::propose_partnership),
        )
        .route("/{id}", patch(handlers::partnerships::update_partnership));

    let admin_routes = Router::new()
        .route("/profiles/pending", get(handlers::admin::list_pending_profiles))
        .route("/profiles/{id}/approve", post(handlers::admin::approve_profile))
        .route("/profiles/{id}/block", post(handlers::admin::block_profile))
        .route("/audit-logs", get(handlers::admin::list_audit_logs))
        .route("/flags", get(handlers::admin::list_flags));

    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/profiles", profile_routes)
        .nest("/companies", company_routes)
        .route("/montadores", get(handlers::profiles::list_montadores))
        .nest("/services", service_routes)
        .nest("/partnerships", partnership_routes)
        .nest("/admin", admin_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let cors = cors_layer(app_state.config.cors_allowed_origin.as_deref());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

// Com origem configurada liberamos credenciais (cookie de sessão); sem ela, só leitura aberta
fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT_LANGUAGE]);

    match allowed_origin.and_then(|origin| HeaderValue::from_str(origin).ok()) {
        Some(origin) => base.allow_origin(origin).allow_credentials(true),
        None => base.allow_origin(tower_http::cors::Any),
    }
}
