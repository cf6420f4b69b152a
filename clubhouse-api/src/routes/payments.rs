/// Payment verification endpoints
///
/// Admins confirm or reject reported bank transfers. The status transition
/// commits first; the member notification email is dispatched afterwards
/// and a mail failure surfaces as a `warning` on the success response.
/// Approving an already-paid payment (or rejecting an already-unpaid one)
/// is an informational no-op and sends no email.
///
/// # Endpoints
///
/// - `POST /v1/payments/:id/approve` - Mark paid (admin)
/// - `POST /v1/payments/:id/reject` - Back to unpaid (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use clubhouse_shared::{
    auth::{authorization::require_admin, session::Principal},
    models::{
        activity::Activity,
        payment::{Payment, PaymentTransition},
        user::User,
    },
};
use serde::Serialize;
use uuid::Uuid;

/// Payment transition response
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// The payment after the call
    pub payment: Payment,

    /// False when the payment was already in the target state
    pub changed: bool,

    /// Present when the notification email could not be sent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Approves a payment
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: Unknown payment
pub async fn approve_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PaymentResponse>> {
    require_admin(principal.as_ref())?;

    let (payment, user, activity) = load_payment_context(&state, id).await?;
    let transition = Payment::approve(&state.db, payment, &user, &activity).await?;

    finish_transition(&state, transition, "Payment approved").await
}

/// Rejects a payment, returning it to `unpaid`
///
/// Rejection is also the only way out of `paid`, covering the case where a
/// confirmation turns out to be mistaken.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: Unknown payment
pub async fn reject_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PaymentResponse>> {
    require_admin(principal.as_ref())?;

    let (payment, user, activity) = load_payment_context(&state, id).await?;
    let transition = Payment::reject(&state.db, payment, &user, &activity).await?;

    finish_transition(&state, transition, "Payment rejected").await
}

/// Loads the payment with the user and activity its notification needs
async fn load_payment_context(
    state: &AppState,
    id: Uuid,
) -> Result<(Payment, User, Activity), ApiError> {
    let payment = Payment::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Payment not found".to_string()))?;

    let user = User::find_by_id(&state.db, payment.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Payment user not found".to_string()))?;

    let activity = Activity::find_by_id(&state.db, payment.activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Payment activity not found".to_string()))?;

    Ok((payment, user, activity))
}

/// Dispatches the post-commit notification and builds the response
async fn finish_transition(
    state: &AppState,
    transition: PaymentTransition,
    log_message: &'static str,
) -> ApiResult<Json<PaymentResponse>> {
    let warning = match &transition.notification {
        Some(intent) => state.dispatcher.dispatch_notification(intent).await,
        None => None,
    };

    if transition.changed {
        tracing::info!(payment_id = %transition.payment.id, "{}", log_message);
    }

    Ok(Json(PaymentResponse {
        payment: transition.payment,
        changed: transition.changed,
        warning,
    }))
}
