/// Payment model and status workflow
///
/// Tracks the monetary-settlement status for a (user, activity) pair.
///
/// # Status transitions
///
/// ```text
/// unpaid ──initiate──> pending_verification ──approve──> paid
///    ^                        │                            │
///    └────────reject──────────┴──────────reject────────────┘
/// ```
///
/// There is no way out of `paid` except an explicit admin rejection. In
/// particular a repeated `initiate` leaves a paid payment paid: the upsert
/// refuses to demote it back to `pending_verification`.
///
/// Approve and reject commit the durable transition first and hand back a
/// [`NotificationIntent`] for the dispatcher; a failed email never rolls the
/// status back.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE payment_status AS ENUM ('unpaid', 'pending_verification', 'paid');
///
/// CREATE TABLE payments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     activity_id UUID NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
///     status payment_status NOT NULL DEFAULT 'unpaid',
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT uq_payment_user_activity UNIQUE (user_id, activity_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::external::intent::NotificationIntent;
use crate::models::activity::Activity;
use crate::models::user::User;

/// Payment settlement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No settlement recorded (also the post-rejection state)
    Unpaid,

    /// Member reported a transfer; awaiting admin verification
    PendingVerification,

    /// Admin confirmed receipt
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::PendingVerification => "pending_verification",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// Payment model for one (user, activity) pair
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    /// Unique payment ID
    pub id: Uuid,

    /// Paying user
    pub user_id: Uuid,

    /// Activity being paid for
    pub activity_id: Uuid,

    /// Current settlement status
    pub status: PaymentStatus,

    /// When the status last changed
    pub updated_at: DateTime<Utc>,
}

/// Result of an approve/reject call
///
/// `changed` is false when the payment was already in the target state; the
/// caller reports that as informational, not as an error, and no
/// notification is re-sent.
#[derive(Debug, Clone)]
pub struct PaymentTransition {
    /// The payment after the call
    pub payment: Payment,

    /// Whether a state transition actually happened
    pub changed: bool,

    /// Email to dispatch after commit; None when nothing changed
    pub notification: Option<NotificationIntent>,
}

impl Payment {
    /// Initiates (or re-initiates) payment verification for a pair
    ///
    /// Single atomic upsert on the `(user_id, activity_id)` uniqueness
    /// constraint: creates the row in `pending_verification` or moves an
    /// existing non-paid row there. A row already in `paid` is returned
    /// unchanged rather than silently demoted.
    ///
    /// Callers must only invoke this for activities with a positive cost;
    /// free activities never get a payment row.
    pub async fn initiate(
        pool: &PgPool,
        user_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let upserted = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (user_id, activity_id, status)
            VALUES ($1, $2, 'pending_verification')
            ON CONFLICT (user_id, activity_id) DO UPDATE
                SET status = 'pending_verification', updated_at = NOW()
                WHERE payments.status <> 'paid'
            RETURNING id, user_id, activity_id, status, updated_at
            "#,
        )
        .bind(user_id)
        .bind(activity_id)
        .fetch_optional(pool)
        .await?;

        match upserted {
            Some(payment) => Ok(payment),
            // The DO UPDATE WHERE clause filtered the row out: it is paid.
            None => {
                let existing = Self::find(pool, user_id, activity_id).await?;
                existing.ok_or(sqlx::Error::RowNotFound)
            }
        }
    }

    /// Approves a payment and produces the confirmation notification
    ///
    /// No-op when already `paid` (`changed = false`, no notification).
    /// The status update commits before the intent is handed to any
    /// dispatcher, so a failed email cannot undo the approval.
    pub async fn approve(
        pool: &PgPool,
        payment: Payment,
        user: &User,
        activity: &Activity,
    ) -> Result<PaymentTransition, sqlx::Error> {
        if payment.status == PaymentStatus::Paid {
            return Ok(PaymentTransition {
                payment,
                changed: false,
                notification: None,
            });
        }

        let updated = Self::set_status(pool, payment.id, PaymentStatus::Paid).await?;
        let notification =
            NotificationIntent::payment_approved(&user.username, &user.email, activity);

        Ok(PaymentTransition {
            payment: updated,
            changed: true,
            notification: Some(notification),
        })
    }

    /// Rejects a payment and produces the rejection notification
    ///
    /// No-op when already `unpaid`. Rejection is the only way out of `paid`.
    pub async fn reject(
        pool: &PgPool,
        payment: Payment,
        user: &User,
        activity: &Activity,
    ) -> Result<PaymentTransition, sqlx::Error> {
        if payment.status == PaymentStatus::Unpaid {
            return Ok(PaymentTransition {
                payment,
                changed: false,
                notification: None,
            });
        }

        let updated = Self::set_status(pool, payment.id, PaymentStatus::Unpaid).await?;
        let notification =
            NotificationIntent::payment_rejected(&user.username, &user.email, activity);

        Ok(PaymentTransition {
            payment: updated,
            changed: true,
            notification: Some(notification),
        })
    }

    async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Payment, sqlx::Error> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, activity_id, status, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(pool)
        .await?;

        Ok(payment)
    }

    /// Finds a payment by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, user_id, activity_id, status, updated_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }

    /// Finds the payment for a (user, activity) pair
    pub async fn find(
        pool: &PgPool,
        user_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, user_id, activity_id, status, updated_at
            FROM payments
            WHERE user_id = $1 AND activity_id = $2
            "#,
        )
        .bind(user_id)
        .bind(activity_id)
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }

    /// Lists all payments recorded for an activity
    pub async fn list_for_activity(
        pool: &PgPool,
        activity_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, user_id, activity_id, status, updated_at
            FROM payments
            WHERE activity_id = $1
            "#,
        )
        .bind(activity_id)
        .fetch_all(pool)
        .await?;

        Ok(payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(PaymentStatus::Unpaid.as_str(), "unpaid");
        assert_eq!(
            PaymentStatus::PendingVerification.as_str(),
            "pending_verification"
        );
        assert_eq!(PaymentStatus::Paid.as_str(), "paid");
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::PendingVerification).unwrap(),
            "\"pending_verification\""
        );
        let parsed: PaymentStatus = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Paid);
    }

    // Transition behavior against a live database is covered in
    // clubhouse-api/tests/workflow_tests.rs
}
