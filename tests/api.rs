// tests/api.rs
//
// Exercita o router sem banco: o pool é criado com connect_lazy e nenhuma
// destas rotas chega a abrir conexão.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use montador_conecta::{
    build_router,
    config::{AppConfig, AppState},
};

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/montador_conecta_unused".into(),
        jwt_secret: "segredo-de-teste".into(),
        bind_addr: "127.0.0.1:0".into(),
        db_max_connections: 1,
        jwt_ttl_days: 7,
        flag_block_threshold: 5,
        session_cookie_secure: false,
        cors_allowed_origin: None,
    }
}

fn app() -> Router {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database_url)
        .expect("url válida");
    let state = AppState::from_parts(config, pool).expect("estado da aplicação");
    build_router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_responds_ok() {
    let response = app()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn protected_route_without_session_is_unauthorized() {
    let response = app()
        .oneshot(Request::get("/api/users/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Authentication token is invalid or missing.");
}

#[tokio::test]
async fn unauthorized_message_follows_accept_language() {
    let response = app()
        .oneshot(
            Request::get("/api/services")
                .header(header::ACCEPT_LANGUAGE, "pt-BR,pt;q=0.9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Token de autenticação inválido ou ausente.");
}

#[tokio::test]
async fn forged_bearer_token_is_rejected() {
    let response = app()
        .oneshot(
            Request::get("/api/profiles/me")
                .header(header::AUTHORIZATION, "Bearer nao.e.um.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_session_cookie_is_rejected() {
    let response = app()
        .oneshot(
            Request::get("/api/admin/audit-logs")
                .header(header::COOKIE, "mc_session=qualquer-coisa")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_registration_reports_each_field() {
    let payload = json!({
        "username": "jo",
        "password": "123",
        "role": "admin",
        "fullName": "João",
        "cpf": "11111111111",
        "state": "Sao Paulo"
    });

    let response = app()
        .oneshot(
            Request::post("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let details = body["details"].as_object().expect("detalhes por campo");
    for field in ["username", "password", "role", "cpf", "state"] {
        assert!(details.contains_key(field), "faltou o campo {}", field);
    }
}

#[tokio::test]
async fn login_requires_both_fields() {
    let response = app()
        .oneshot(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "username": "", "password": "" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_body_field_is_a_json_bad_request() {
    let response = app()
        .oneshot(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "username": "abc" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"));

    let body = body_json(response).await;
    assert_eq!(body["error"], "The request body is not valid JSON for this route.");
    assert!(body["details"]["reason"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn malformed_json_message_follows_accept_language() {
    let response = app()
        .oneshot(
            Request::post("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::ACCEPT_LANGUAGE, "pt-BR")
                .body(Body::from("{\"username\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "O corpo da requisição não é um JSON válido para esta rota.");
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let response = app()
        .oneshot(
            Request::post("/api/auth/logout")
                .header(header::COOKIE, "mc_session=token-antigo")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("mc_session="));
}

#[tokio::test]
async fn openapi_document_lists_lifecycle_routes() {
    let response = app()
        .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/services/{id}/confirm-completion"));
    assert!(paths.contains_key("/api/services/{id}/assignments/{assignment_id}"));
    assert!(paths.contains_key("/api/admin/audit-logs"));
    assert!(doc["components"]["securitySchemes"]["api_jwt"].is_object());
}
