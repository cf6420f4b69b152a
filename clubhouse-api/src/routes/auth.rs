/// Authentication endpoints
///
/// Registration is gated by single-use invitation codes: the code decides
/// the role of the new account, and code consumption and user creation
/// commit in one transaction so a code can never be redeemed twice.
///
/// Login verifies the password and hands back a signed session token; the
/// server keeps no session state, so logout is purely client-side (the
/// endpoint exists so clients have an explicit call to drop the token).
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register with an invitation code
/// - `POST /v1/auth/login` - Login and get a session token
/// - `POST /v1/auth/logout` - Acknowledge logout

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use clubhouse_shared::{
    auth::{password, session::Principal},
    models::{
        invitation_code::InvitationCode,
        user::{CreateUser, Role, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username, also shown on activity rosters
    #[validate(length(min = 3, max = 80, message = "Username must be 3-80 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Invitation code handed out by an admin
    #[validate(length(min = 1, message = "Invitation code is required"))]
    pub invitation_code: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub user_id: String,

    /// Role granted by the invitation code
    pub role: Role,

    /// Session token for subsequent requests
    pub session_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: String,

    /// Username
    pub username: String,

    /// Role at login time
    pub role: Role,

    /// Session token for subsequent requests
    pub session_token: String,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Register a new user with an invitation code
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "hunter2hunter2",
///   "invitation_code": "q3vR7..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown or already-used invitation code
/// - `409 Conflict`: Username or email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    req.validate()?;

    // Hash before opening the transaction; Argon2 is deliberately slow
    let password_hash = password::hash_password(&req.password)?;

    let mut tx = state.db.begin().await.map_err(ApiError::from)?;

    // Consuming the code is a conditional UPDATE, so a code redeemed by a
    // concurrent registration comes back None here
    let invite = InvitationCode::consume(&mut tx, &req.invitation_code)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("Invalid or already used invitation code".to_string())
        })?;

    let user = User::create_in_tx(
        &mut tx,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            role: invite.role,
        },
    )
    .await?;

    InvitationCode::mark_used_by(&mut tx, invite.id, user.id).await?;

    tx.commit().await.map_err(ApiError::from)?;

    let principal = Principal::new(user.id, user.username.clone(), user.role);
    let session_token = state.session_key.sign(&principal)?;

    tracing::info!(user_id = %user.id, role = %user.role.as_str(), "User registered");

    Ok(Json(RegisterResponse {
        user_id: user.id.to_string(),
        role: user.role,
        session_token,
    }))
}

/// Login endpoint
///
/// Authenticates a user and returns a signed session token.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid username or password
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    // Same error for unknown user and wrong password
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let principal = Principal::new(user.id, user.username.clone(), user.role);
    let session_token = state.session_key.sign(&principal)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        user_id: user.id.to_string(),
        username: user.username,
        role: user.role,
        session_token,
    }))
}

/// Logout endpoint
///
/// Sessions are stateless signed tokens; there is nothing to invalidate
/// server-side. Clients call this and discard their token.
pub async fn logout() -> ApiResult<Json<LogoutResponse>> {
    Ok(Json(LogoutResponse {
        message: "Logged out".to_string(),
    }))
}
