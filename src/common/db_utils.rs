use crate::common::error::AppError;

// ---
// Helper de Unicidade: traduz o nome da constraint em um erro de domínio
// ---
/// Converte violações de unicidade conhecidas em variantes específicas do `AppError`.
/// Os nomes batem com os definidos em `migrations/`.
pub(crate) fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            if let Some(constraint) = db_err.constraint() {
                return match constraint {
                    "users_username_key" => AppError::UsernameAlreadyExists,
                    "profiles_cpf_key" | "companies_cnpj_key" => AppError::DocumentAlreadyExists,
                    "companies_owner_id_key" => AppError::CompanyAlreadyExists,
                    _ => AppError::UniqueConstraintViolation(constraint.to_string()),
                };
            }
        }
    }
    e.into()
}

/// Limita o `limit` vindo da query string.
pub(crate) fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_applies_default_and_bounds() {
        assert_eq!(clamp_limit(None, 50, 200), 50);
        assert_eq!(clamp_limit(Some(0), 50, 200), 1);
        assert_eq!(clamp_limit(Some(1000), 50, 200), 200);
        assert_eq!(clamp_limit(Some(20), 50, 200), 20);
    }

    #[test]
    fn non_database_errors_pass_through() {
        let mapped = map_unique_violation(sqlx::Error::RowNotFound);
        assert!(matches!(mapped, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }
}
