//! Repository for the `verification_tokens` table.

use authgate_core::types::DbId;
use sqlx::PgPool;

use crate::models::verification_token::{
    CreateVerificationToken, VerificationPurpose, VerificationToken,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, purpose, email, token, is_used, is_expired, expires_at, \
                       created_at, updated_at";

/// Provides CRUD operations for verification tokens.
pub struct VerificationTokenRepo;

impl VerificationTokenRepo {
    /// Insert a new token, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateVerificationToken,
    ) -> Result<VerificationToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO verification_tokens (user_id, purpose, email, token, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VerificationToken>(&query)
            .bind(input.user_id)
            .bind(input.purpose.as_str())
            .bind(&input.email)
            .bind(&input.token)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find the newest token a user holds for the given purpose.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
        purpose: VerificationPurpose,
    ) -> Result<Option<VerificationToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM verification_tokens
             WHERE user_id = $1 AND purpose = $2
             ORDER BY created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, VerificationToken>(&query)
            .bind(user_id)
            .bind(purpose.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Find a token by its exact string value and purpose.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
        purpose: VerificationPurpose,
    ) -> Result<Option<VerificationToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM verification_tokens WHERE token = $1 AND purpose = $2"
        );
        sqlx::query_as::<_, VerificationToken>(&query)
            .bind(token)
            .bind(purpose.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete a token by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM verification_tokens WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
