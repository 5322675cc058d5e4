// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        CompanyRepository, GovernanceRepository, PartnershipRepository, ProfileRepository,
        ReviewRepository, ServiceRepository, UserRepository,
    },
    services::{
        auth::AuthService, company_service::CompanyService, governance_service::GovernanceService,
        job_service::JobService, lifecycle_service::ServiceLifecycle,
        partnership_service::PartnershipService, profile_service::ProfileService,
        review_service::ReviewService,
    },
};

/// Configuração lida do ambiente (.env em desenvolvimento).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub jwt_ttl_days: i64,
    pub flag_block_threshold: i64,
    pub session_cookie_secure: bool,
    pub cors_allowed_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} deve ser definida", key))
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            jwt_ttl_days: parse_or(&lookup, "JWT_TTL_DAYS", 7)?,
            flag_block_threshold: parse_or(&lookup, "FLAG_BLOCK_THRESHOLD", 5)?,
            session_cookie_secure: parse_or(&lookup, "SESSION_COOKIE_SECURE", false)?,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN").filter(|v| !v.trim().is_empty()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Valor inválido para {}: '{}'", key, raw)),
        None => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub company_service: CompanyService,
    pub job_service: JobService,
    pub lifecycle: ServiceLifecycle,
    pub review_service: ReviewService,
    pub partnership_service: PartnershipService,
    pub governance_service: GovernanceService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = AppConfig::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_parts(config, db_pool)
    }

    /// Monta o gráfico de dependências em cima de um pool já criado.
    pub fn from_parts(config: AppConfig, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = I18nStore::load_embedded()?;

        // --- Repositórios ---
        let user_repo = UserRepository::new(db_pool.clone());
        let profile_repo = ProfileRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let service_repo = ServiceRepository::new(db_pool.clone());
        let review_repo = ReviewRepository::new(db_pool.clone());
        let partnership_repo = PartnershipRepository::new(db_pool.clone());
        let governance_repo = GovernanceRepository::new(db_pool.clone());

        // --- Serviços ---
        let governance_service = GovernanceService::new(
            governance_repo,
            profile_repo.clone(),
            config.flag_block_threshold,
        );
        let lifecycle = ServiceLifecycle::new(
            service_repo.clone(),
            review_repo.clone(),
            governance_service.clone(),
            db_pool.clone(),
        );
        let auth_service = AuthService::new(
            user_repo,
            profile_repo.clone(),
            governance_service.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_days,
            db_pool.clone(),
        );
        let profile_service = ProfileService::new(profile_repo.clone(), governance_service.clone());
        let company_service = CompanyService::new(
            company_repo.clone(),
            profile_repo.clone(),
            governance_service.clone(),
            db_pool.clone(),
        );
        let job_service = JobService::new(
            service_repo.clone(),
            company_repo.clone(),
            profile_repo.clone(),
            lifecycle.clone(),
            governance_service.clone(),
            db_pool.clone(),
        );
        let review_service = ReviewService::new(
            review_repo,
            service_repo,
            company_repo.clone(),
            profile_repo.clone(),
            lifecycle.clone(),
            governance_service.clone(),
        );
        let partnership_service = PartnershipService::new(
            partnership_repo,
            company_repo,
            profile_repo,
            governance_service.clone(),
        );

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store: Arc::new(i18n_store),
            auth_service,
            profile_service,
            company_service,
            job_service,
            lifecycle,
            review_service,
            partnership_service,
            governance_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/mc"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_ttl_days, 7);
        assert_eq!(config.flag_block_threshold, 5);
        assert!(!config.session_cookie_secure);
        assert!(config.cors_allowed_origin.is_none());
    }

    #[test]
    fn missing_secret_fails() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/mc")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn invalid_number_fails_with_context() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/mc"),
            ("JWT_SECRET", "segredo"),
            ("FLAG_BLOCK_THRESHOLD", "muitos"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("FLAG_BLOCK_THRESHOLD"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/mc"),
            ("JWT_SECRET", "segredo"),
            ("FLAG_BLOCK_THRESHOLD", "3"),
            ("SESSION_COOKIE_SECURE", "true"),
            ("CORS_ALLOWED_ORIGIN", "https://app.montadorconecta.com.br"),
        ]))
        .unwrap();

        assert_eq!(config.flag_block_threshold, 3);
        assert!(config.session_cookie_secure);
        assert_eq!(config.cors_allowed_origin.as_deref(), Some("https://app.montadorconecta.com.br"));
    }
}
