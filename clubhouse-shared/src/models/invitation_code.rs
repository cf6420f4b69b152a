/// Invitation code model
///
/// Registration is gated by single-use invitation codes. A code is created
/// by an admin (web or CLI), carries the role the new account will receive,
/// and is consumed exactly once. Consumption is a single conditional UPDATE
/// so two concurrent registrations cannot both redeem the same code.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE invitation_codes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     code VARCHAR(50) NOT NULL UNIQUE,
///     is_used BOOLEAN NOT NULL DEFAULT FALSE,
///     used_by_user_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     role user_role NOT NULL DEFAULT 'user',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::Role;

/// Length of generated invitation codes
const CODE_LENGTH: usize = 22;

/// Invitation code model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InvitationCode {
    /// Unique ID
    pub id: Uuid,

    /// The redeemable code string
    pub code: String,

    /// Whether the code has been consumed
    pub is_used: bool,

    /// The user created with this code, once consumed
    pub used_by_user_id: Option<Uuid>,

    /// Role granted to the account registered with this code
    pub role: Role,

    /// When the code was created
    pub created_at: DateTime<Utc>,
}

impl InvitationCode {
    /// Generates a random URL-safe code string
    pub fn generate_code() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CODE_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Creates a new unused invitation code granting `role`
    pub async fn create(pool: &PgPool, role: Role) -> Result<Self, sqlx::Error> {
        let code = Self::generate_code();

        let invite = sqlx::query_as::<_, InvitationCode>(
            r#"
            INSERT INTO invitation_codes (code, role)
            VALUES ($1, $2)
            RETURNING id, code, is_used, used_by_user_id, role, created_at
            "#,
        )
        .bind(code)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(invite)
    }

    /// Atomically consumes an unused code inside an open transaction
    ///
    /// Returns the consumed code (with the granted role) or None when the
    /// code doesn't exist or was already used. The conditional UPDATE makes
    /// double redemption impossible even under concurrent registration.
    pub async fn consume(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invite = sqlx::query_as::<_, InvitationCode>(
            r#"
            UPDATE invitation_codes
            SET is_used = TRUE
            WHERE code = $1 AND is_used = FALSE
            RETURNING id, code, is_used, used_by_user_id, role, created_at
            "#,
        )
        .bind(code)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(invite)
    }

    /// Records which user redeemed the code, inside the same transaction
    pub async fn mark_used_by(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE invitation_codes SET used_by_user_id = $2 WHERE id = $1")
            .bind(id)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Lists all codes, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let codes = sqlx::query_as::<_, InvitationCode>(
            r#"
            SELECT id, code, is_used, used_by_user_id, role, created_at
            FROM invitation_codes
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(codes)
    }

    /// Deletes a code by ID
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invitation_codes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_length_and_charset() {
        let code = InvitationCode::generate_code();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_code_is_random() {
        let a = InvitationCode::generate_code();
        let b = InvitationCode::generate_code();
        assert_ne!(a, b);
    }
}
