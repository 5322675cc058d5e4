// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{profile_repo::NewProfile, ProfileRepository, UserRepository},
    models::{
        auth::{AuthResponse, Claims, RegisterUserPayload, User},
        profile::{Profile, ProfileStatus},
    },
    services::governance_service::GovernanceService,
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    profile_repo: ProfileRepository,
    governance: GovernanceService,
    jwt_secret: String,
    jwt_ttl_days: i64,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        profile_repo: ProfileRepository,
        governance: GovernanceService,
        jwt_secret: String,
        jwt_ttl_days: i64,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, profile_repo, governance, jwt_secret, jwt_ttl_days, pool }
    }

    /// Cria usuário e perfil na mesma transação e já devolve a sessão.
    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<AuthResponse, AppError> {
        // Hash fora da transação: não toca no banco
        let password = payload.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .create_user(&mut *tx, payload.username.trim(), &password_hash)
            .await?;

        // Se o perfil falhar (CPF repetido, por exemplo) o usuário some junto no rollback
        let profile = self
            .profile_repo
            .create_profile(
                &mut *tx,
                NewProfile {
                    user_id: user.id,
                    role: payload.role,
                    full_name: payload.full_name.trim(),
                    cpf: payload.cpf.as_deref(),
                    phone: payload.phone.as_deref(),
                    city: payload.city.as_deref(),
                    state: payload.state.as_deref(),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, role = ?profile.role, "Novo cadastro");

        self.governance
            .log_action(
                Some(profile.id),
                "user.registered",
                "profile",
                Some(profile.id),
                json!({ "username": user.username, "role": profile.role }),
            )
            .await;

        let token = self.create_token(user.id)?;
        Ok(AuthResponse { token, profile })
    }

    pub async fn login_user(&self, username: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_username(username.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();

        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let profile = self
            .profile_repo
            .find_by_user_id(user.id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        if profile.status == ProfileStatus::Blocked {
            return Err(AppError::ProfileBlocked);
        }

        let token = self.create_token(user.id)?;
        Ok(AuthResponse { token, profile })
    }

    /// Valida o JWT e carrega usuário e perfil da sessão.
    pub async fn validate_token(&self, token: &str) -> Result<(User, Profile), AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        let profile = self
            .profile_repo
            .find_by_user_id(user.id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        Ok((user, profile))
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.jwt_ttl_days);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::GovernanceRepository;
    use sqlx::postgres::PgPoolOptions;

    // O pool nunca conecta: create_token/validate_token falham antes de tocar no banco
    fn service(secret: &str) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/montador_conecta_unused")
            .expect("url válida");
        let governance = GovernanceService::new(
            GovernanceRepository::new(pool.clone()),
            ProfileRepository::new(pool.clone()),
            5,
        );
        AuthService::new(
            UserRepository::new(pool.clone()),
            ProfileRepository::new(pool.clone()),
            governance,
            secret.to_string(),
            7,
            pool,
        )
    }

    #[tokio::test]
    async fn token_carries_user_and_expiry() {
        let auth = service("segredo-de-teste");
        let user_id = Uuid::new_v4();
        let token = auth.create_token(user_id).unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"segredo-de-teste"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(data.claims.sub, user_id);
        assert_eq!(data.claims.exp - data.claims.iat, 7 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let token = service("outro-segredo").create_token(Uuid::new_v4()).unwrap();
        let result = service("segredo-de-teste").validate_token(&token).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let result = service("segredo-de-teste").validate_token("nao.e.jwt").await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
