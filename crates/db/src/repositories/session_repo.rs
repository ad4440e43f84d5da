//! Repository for the `sessions` table.

use authgate_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_type, provider, access_token, refresh_token, \
                       access_expires_at, refresh_expires_at, is_revoked, revoked_at, \
                       created_at, updated_at";

/// Provides CRUD operations for login sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, token_type, provider, access_token, refresh_token,
                                   access_expires_at, refresh_expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.token_type)
            .bind(&input.provider)
            .bind(&input.access_token)
            .bind(&input.refresh_token)
            .bind(input.access_expires_at)
            .bind(input.refresh_expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find the newest non-revoked session for a user.
    ///
    /// Expired rows are still returned; the caller decides what expiry means.
    pub async fn find_current_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE user_id = $1 AND is_revoked = false
             ORDER BY created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a session by ID regardless of revocation state.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a single session. Returns `true` if the row was updated.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_revoked = true, revoked_at = NOW()
             WHERE id = $1 AND is_revoked = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete a single session. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete sessions revoked before `cutoff` or whose refresh token expired
    /// before `cutoff`. Returns the count of deleted rows.
    pub async fn delete_stale(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM sessions
             WHERE (is_revoked = true AND revoked_at < $1)
                OR refresh_expires_at < $1",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        tracing::debug!(deleted = result.rows_affected(), %cutoff, "Stale sessions deleted");
        Ok(result.rows_affected())
    }
}
