/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use clubhouse_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config)?;
/// let app = clubhouse_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use clubhouse_shared::auth::session::{Principal, SessionKey};
use clubhouse_shared::external::calendar::RestCalendar;
use clubhouse_shared::external::dispatcher::Dispatcher;
use clubhouse_shared::external::mailer::HttpMailer;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Session token signing key
    pub session_key: SessionKey,

    /// Post-commit executor for mail and calendar side effects
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Creates new application state
    ///
    /// Builds the side-effect dispatcher from whichever collaborators are
    /// configured; an unconfigured mail relay or calendar leaves that slot
    /// empty and the dispatcher degrades it to warnings.
    ///
    /// # Errors
    ///
    /// Returns an error when the session secret is too short or an HTTP
    /// client cannot be constructed.
    pub fn new(db: PgPool, config: Config) -> anyhow::Result<Self> {
        let session_key = SessionKey::new(&config.session_secret)?;

        let mailer = match &config.mail {
            Some(mail_config) => Some(Arc::new(HttpMailer::new(mail_config.clone())?)
                as Arc<dyn clubhouse_shared::external::mailer::Mailer>),
            None => None,
        };

        let calendar = match &config.calendar {
            Some(calendar_config) => Some(Arc::new(RestCalendar::new(calendar_config.clone())?)
                as Arc<dyn clubhouse_shared::external::calendar::CalendarSync>),
            None => None,
        };

        Ok(Self {
            db,
            config: Arc::new(config),
            session_key,
            dispatcher: Dispatcher::new(mailer, calendar),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── /v1/                             # API v1 (versioned)
/// │   ├── /auth/                       # Authentication
/// │   │   ├── POST /register           # Invitation-code registration
/// │   │   ├── POST /login
/// │   │   └── POST /logout
/// │   ├── /activities/                 # Activity catalog and signups
/// │   │   ├── GET    /                 # Upcoming (authenticated)
/// │   │   ├── GET    /public           # Upcoming public subset (guest)
/// │   │   ├── POST   /                 # Create (organizer)
/// │   │   ├── GET    /:id              # Detail with roster and payments
/// │   │   ├── PUT    /:id              # Edit (organizer)
/// │   │   ├── DELETE /:id              # Delete (admin)
/// │   │   └── POST   /:id/signup       # Register the caller
/// │   ├── /signups/
/// │   │   └── DELETE /:id              # Remove a signup (admin)
/// │   ├── /payments/
/// │   │   ├── POST /:id/approve        # Mark paid (admin)
/// │   │   └── POST /:id/reject         # Back to unpaid (admin)
/// │   ├── /admin/                      # Administration (admin)
/// │   │   ├── GET    /users
/// │   │   ├── PUT    /users/:id        # Change email / reset password
/// │   │   ├── DELETE /users/:id
/// │   │   ├── GET    /activities       # Full history incl. past
/// │   │   ├── POST   /invite-codes
/// │   │   ├── GET    /invite-codes
/// │   │   └── DELETE /invite-codes/:id
/// │   └── POST /contact                # Membership request (public)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Session decoding (all /v1 routes; handlers enforce roles)
pub fn build_router(state: AppState) -> Router {
    // Import route handlers
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout));

    // Activity catalog, signups and payment workflow
    let activity_routes = Router::new()
        .route("/", get(routes::activities::list_activities))
        .route("/public", get(routes::activities::list_public_activities))
        .route("/", post(routes::activities::create_activity))
        .route("/:id", get(routes::activities::get_activity))
        .route("/:id", put(routes::activities::update_activity))
        .route("/:id", delete(routes::activities::delete_activity))
        .route("/:id/signup", post(routes::signups::signup));

    let signup_routes =
        Router::new().route("/:id", delete(routes::signups::delete_signup));

    let payment_routes = Router::new()
        .route("/:id/approve", post(routes::payments::approve_payment))
        .route("/:id/reject", post(routes::payments::reject_payment));

    // Administration (handlers require the admin role)
    let admin_routes = Router::new()
        .route("/users", get(routes::admin::list_users))
        .route("/users/:id", put(routes::admin::update_user))
        .route("/users/:id", delete(routes::admin::delete_user))
        .route("/activities", get(routes::admin::list_all_activities))
        .route("/invite-codes", post(routes::admin::create_invite_code))
        .route("/invite-codes", get(routes::admin::list_invite_codes))
        .route("/invite-codes/:id", delete(routes::admin::delete_invite_code));

    // Build complete v1 API; the session layer runs for every v1 route and
    // leaves an Option<Principal> in the request extensions
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/activities", activity_routes)
        .nest("/signups", signup_routes)
        .nest("/payments", payment_routes)
        .nest("/admin", admin_routes)
        .route("/contact", post(routes::contact::contact))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_layer,
        ));

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Session decoding middleware layer
///
/// Decodes the Bearer session token when one is present and injects
/// `Option<Principal>` into request extensions. Anonymous requests pass
/// through with `None`; role checks live in the handlers, not here, so
/// public and guarded routes can share one layer. A token that is present
/// but fails verification is rejected outright.
async fn session_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let principal: Option<Principal> = match token {
        Some(token) => Some(state.session_key.verify(token)?),
        None => None,
    };

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        // Compile-time check: handlers clone the state per request
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
