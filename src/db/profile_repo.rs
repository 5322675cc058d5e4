// src/db/profile_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    models::profile::{MontadorFilter, Profile, ProfileRole, ProfileStatus, UpdateProfilePayload},
};

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

pub struct NewProfile<'a> {
    pub user_id: Uuid,
    pub role: ProfileRole,
    pub full_name: &'a str,
    pub cpf: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        new: NewProfile<'_>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, role, full_name, cpf, phone, city, state)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(new.role)
        .bind(new.full_name)
        .bind(new.cpf)
        .bind(new.phone)
        .bind(new.city)
        .bind(new.state)
        .fetch_one(executor)
        .await
        .map_err(map_unique_violation)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    pub async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    // COALESCE: campo ausente no payload mantém o valor atual
    pub async fn update_profile(
        &self,
        id: Uuid,
        payload: &UpdateProfilePayload,
    ) -> Result<Profile, AppError> {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles SET
                full_name = COALESCE($2, full_name),
                cpf = COALESCE($3, cpf),
                phone = COALESCE($4, phone),
                city = COALESCE($5, city),
                state = COALESCE($6, state),
                bio = COALESCE($7, bio),
                specialties = COALESCE($8, specialties),
                experience_years = COALESCE($9, experience_years),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.full_name.as_deref())
        .bind(payload.cpf.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.city.as_deref())
        .bind(payload.state.as_deref())
        .bind(payload.bio.as_deref())
        .bind(payload.specialties.as_deref())
        .bind(payload.experience_years)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    /// Vincula o perfil à empresa recém-criada (roda dentro da transação de criação).
    pub async fn set_company<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        company_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE profiles SET company_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(company_id)
            .bind(profile_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn set_status(&self, id: Uuid, status: ProfileStatus) -> Result<Profile, AppError> {
        sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ProfileNotFound)
    }

    pub async fn list_pending(&self) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE status = 'pending' ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    // Apenas montadores aprovados aparecem na busca
    pub async fn list_montadores(&self, filter: &MontadorFilter) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT * FROM profiles
            WHERE role = 'montador'
              AND status = 'approved'
              AND ($1::text IS NULL OR city ILIKE $1)
              AND ($2::text IS NULL OR state = $2)
              AND ($3::text IS NULL OR $3 = ANY(specialties))
            ORDER BY full_name ASC
            "#,
        )
        .bind(filter.city.as_deref())
        .bind(filter.state.as_deref())
        .bind(filter.specialty.as_deref())
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }
}
