/// Public membership request endpoint
///
/// Guests ask to join the club through this form; the message is relayed
/// to the configured admin address. The relay is best-effort like every
/// other outbound email: a failure or missing configuration comes back as
/// a `warning`, and the request itself still succeeds.
///
/// # Endpoint
///
/// - `POST /v1/contact`

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use clubhouse_shared::external::intent::NotificationIntent;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Membership request form
#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    /// Name of the aspiring member
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Reply address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Free-form message
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub message: String,
}

/// Contact response
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: String,

    /// Present when the relay to the admin address failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Relays a membership request to the admin address
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
pub async fn contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<Json<ContactResponse>> {
    req.validate()?;

    let warning = match &state.config.club.admin_email {
        Some(admin_email) => {
            let intent = NotificationIntent::membership_request(
                &req.name,
                &req.email,
                &req.message,
                admin_email,
            );
            state.dispatcher.dispatch_notification(&intent).await
        }
        None => {
            tracing::warn!("No admin email configured; membership request not relayed");
            Some("Request received but could not be relayed: no admin address configured".to_string())
        }
    };

    tracing::info!(sender = %req.email, "Membership request received");

    Ok(Json(ContactResponse {
        message: "Thank you for your interest! We will get back to you soon.".to_string(),
        warning,
    }))
}
