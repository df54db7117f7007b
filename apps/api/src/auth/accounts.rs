use std::sync::OnceLock;

use anyhow::Context;
use email_address::EmailAddress;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRow;

pub const MIN_PASSWORD_LEN: usize = 6;

pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub target_role: &'a str,
    /// `None` confirms the account immediately.
    pub confirmation_token: Option<&'a str>,
}

/// Lowercases and trims an email, rejecting anything that is not a valid address.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if !EmailAddress::is_valid(&email) {
        return Err(AppError::Validation(format!("'{raw}' is not a valid email address")));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password should be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Hashes on a blocking thread; argon2 is deliberately slow.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || password_auth::generate_hash(password))
        .await
        .context("Password hashing task failed")
        .map_err(AppError::Internal)
}

/// Hash checked when no account matches, so unknown emails cost the same argon2 work.
fn dummy_hash() -> &'static str {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    DUMMY_HASH.get_or_init(|| password_auth::generate_hash("jobhunter-no-such-account"))
}

/// Verifies against `hash`, or against a dummy hash when it is `None`.
/// `None` always yields `false`.
pub async fn verify_password(password: String, hash: Option<String>) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => password_auth::verify_password(password, &hash).is_ok(),
        None => {
            let _ = password_auth::verify_password(password, dummy_hash());
            false
        }
    })
    .await
    .context("Password verification task failed")
    .map_err(AppError::Internal)
}

pub async fn create_account(pool: &PgPool, account: NewAccount<'_>) -> Result<UserRow, AppError> {
    let result = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users
            (id, email, password_hash, full_name, target_role,
             email_confirmed_at, confirmation_token)
        VALUES ($1, $2, $3, $4, $5, CASE WHEN $6::TEXT IS NULL THEN NOW() ELSE NULL END, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(account.email)
    .bind(account.password_hash)
    .bind(account.full_name)
    .bind(account.target_role)
    .bind(account.confirmation_token)
    .fetch_one(pool)
    .await;

    match result {
        Ok(user) => Ok(user),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(AppError::Conflict("User already registered".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, AppError> {
    Ok(
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRow>, AppError> {
    Ok(
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Marks the account owning `token` as confirmed. Tokens are single-use.
pub async fn confirm_email(pool: &PgPool, token: &str) -> Result<Option<UserRow>, AppError> {
    Ok(sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET email_confirmed_at = NOW(), confirmation_token = NULL
        WHERE confirmation_token = $1
        RETURNING *
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Ada@Example.COM ").unwrap(),
            "ada@example.com"
        );
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("correct horse".to_string()).await.unwrap();
        assert!(verify_password("correct horse".to_string(), Some(hash.clone()))
            .await
            .unwrap());
        assert!(!verify_password("wrong".to_string(), Some(hash)).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_account_runs_dummy_check_and_fails() {
        assert!(!verify_password("correct horse".to_string(), None)
            .await
            .unwrap());
        assert!(!verify_password("jobhunter-no-such-account".to_string(), None)
            .await
            .unwrap());
        assert!(password_auth::verify_password("jobhunter-no-such-account", dummy_hash()).is_ok());
    }
}
