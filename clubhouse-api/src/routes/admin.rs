/// Administration endpoints
///
/// User management, the full activity history, and invitation code
/// handling. Every handler here requires the admin role.
///
/// # Endpoints
///
/// - `GET    /v1/admin/users` - List accounts
/// - `PUT    /v1/admin/users/:id` - Change email or reset password
/// - `DELETE /v1/admin/users/:id` - Delete an account (not your own)
/// - `GET    /v1/admin/activities` - All activities including past
/// - `POST   /v1/admin/invite-codes` - Mint an invitation code
/// - `GET    /v1/admin/invite-codes` - List codes
/// - `DELETE /v1/admin/invite-codes/:id` - Revoke an unused code

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use clubhouse_shared::{
    auth::{authorization::require_admin, password, session::Principal},
    models::{
        activity::Activity,
        invitation_code::InvitationCode,
        user::{Role, User},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User listing entry; the password hash never leaves the server
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// User update request; both fields optional, absent means unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

/// Response confirming a deletion
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Invitation code creation request
#[derive(Debug, Deserialize)]
pub struct CreateInviteCodeRequest {
    /// Role the code grants; defaults to the plain member role
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

/// Lists all user accounts
pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    require_admin(principal.as_ref())?;

    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

/// Updates a user's email address or resets their password
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: Unknown user
/// - `409 Conflict`: Email already in use
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserSummary>> {
    require_admin(principal.as_ref())?;
    req.validate()?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if let Some(email) = &req.email {
        // The unique constraint turns a duplicate into a 409
        User::update_email(&state.db, user.id, email).await?;
    }

    if let Some(new_password) = &req.password {
        let password_hash = password::hash_password(new_password)?;
        User::update_password_hash(&state.db, user.id, &password_hash).await?;
    }

    let updated = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %id, "User updated");

    Ok(Json(UserSummary::from(updated)))
}

/// Deletes a user account
///
/// Admins cannot delete their own account; signups keyed by the username
/// remain on rosters, payments cascade.
///
/// # Errors
///
/// - `400 Bad Request`: Attempted self-deletion
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: Unknown user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    let caller = require_admin(principal.as_ref())?;

    if caller.user_id == id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, "User deleted");

    Ok(Json(DeleteResponse { deleted }))
}

/// Lists all activities including past ones, newest date first
pub async fn list_all_activities(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
) -> ApiResult<Json<Vec<Activity>>> {
    require_admin(principal.as_ref())?;

    let activities = Activity::list_all(&state.db).await?;
    Ok(Json(activities))
}

/// Mints a new single-use invitation code
pub async fn create_invite_code(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
    Json(req): Json<CreateInviteCodeRequest>,
) -> ApiResult<Json<InvitationCode>> {
    require_admin(principal.as_ref())?;

    let code = InvitationCode::create(&state.db, req.role).await?;

    tracing::info!(code_id = %code.id, role = %req.role.as_str(), "Invitation code created");

    Ok(Json(code))
}

/// Lists all invitation codes, newest first
pub async fn list_invite_codes(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
) -> ApiResult<Json<Vec<InvitationCode>>> {
    require_admin(principal.as_ref())?;

    let codes = InvitationCode::list(&state.db).await?;
    Ok(Json(codes))
}

/// Deletes an invitation code
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: Unknown code
pub async fn delete_invite_code(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    require_admin(principal.as_ref())?;

    let deleted = InvitationCode::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Invitation code not found".to_string()));
    }

    tracing::info!(code_id = %id, "Invitation code deleted");

    Ok(Json(DeleteResponse { deleted }))
}
