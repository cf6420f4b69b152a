/// Signup endpoints
///
/// The signup route is the core workflow: an idempotent, capacity-guarded
/// registration followed by payment initiation when the activity has a
/// cost. A full activity aborts only the signup; an existing signup is a
/// no-op, and payment initiation still runs for it so a member can
/// re-report a transfer.
///
/// # Endpoints
///
/// - `POST   /v1/activities/:id/signup` - Register the caller
/// - `DELETE /v1/signups/:id` - Remove a signup (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use clubhouse_shared::{
    auth::{
        authorization::{require_admin, require_authenticated},
        session::Principal,
    },
    models::{
        activity::Activity,
        payment::{Payment, PaymentStatus},
        signup::{Signup, SignupOutcome},
    },
};
use serde::Serialize;
use uuid::Uuid;

/// Bank transfer instructions included when a payment is due
#[derive(Debug, Serialize)]
pub struct PaymentInstructions {
    /// Amount due in euros
    pub amount: f64,

    /// Account holder name, when configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,

    /// Account number, when configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
}

/// Signup response
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    /// The caller's signup row
    pub signup: Signup,

    /// False when the caller was already on the roster
    pub newly_registered: bool,

    /// Payment status after initiation; absent for free activities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,

    /// How to settle the payment; absent for free activities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_instructions: Option<PaymentInstructions>,
}

/// Response confirming a roster removal
#[derive(Debug, Serialize)]
pub struct DeleteSignupResponse {
    pub deleted: bool,
}

/// Registers the caller for an activity
///
/// Registration locks the activity row for the duration of its transaction,
/// so concurrent callers can never push the roster past the limit; the
/// loser of the race on the last spot gets `409 capacity_exceeded`. Signing up
/// twice is a no-op reported with `newly_registered = false`.
///
/// For activities with a cost, a payment row moves to
/// `pending_verification` (a payment already `paid` stays `paid`), and the
/// response carries the club's bank transfer instructions.
///
/// # Errors
///
/// - `401 Unauthorized`: Not logged in
/// - `404 Not Found`: Unknown activity
/// - `409 Conflict` (`capacity_exceeded`): Activity is full
pub async fn signup(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
    Path(activity_id): Path<Uuid>,
) -> ApiResult<Json<SignupResponse>> {
    let caller = require_authenticated(principal.as_ref())?;

    let activity = Activity::find_by_id(&state.db, activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    let outcome = Signup::register(&state.db, activity_id, &caller.username).await?;

    let (signup, newly_registered) = match outcome {
        SignupOutcome::Registered(signup) => (signup, true),
        SignupOutcome::AlreadyRegistered(signup) => (signup, false),
        SignupOutcome::CapacityExceeded => return Err(ApiError::CapacityExceeded),
    };

    // Free activities never get a payment row
    let (payment_status, payment_instructions) = if activity.requires_payment() {
        let payment = Payment::initiate(&state.db, caller.user_id, activity_id).await?;
        let instructions = PaymentInstructions {
            amount: activity.cost.unwrap_or(0.0),
            account_name: state.config.club.bank_account_name.clone(),
            account_number: state.config.club.bank_account_number.clone(),
        };
        (Some(payment.status), Some(instructions))
    } else {
        (None, None)
    };

    tracing::info!(
        activity_id = %activity_id,
        participant = %caller.username,
        newly_registered,
        "Signup processed"
    );

    Ok(Json(SignupResponse {
        signup,
        newly_registered,
        payment_status,
        payment_instructions,
    }))
}

/// Removes a signup from a roster
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: Unknown signup
pub async fn delete_signup(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteSignupResponse>> {
    require_admin(principal.as_ref())?;

    let deleted = Signup::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Signup not found".to_string()));
    }

    tracing::info!(signup_id = %id, "Signup removed");

    Ok(Json(DeleteSignupResponse { deleted }))
}
