/// Activity catalog endpoints
///
/// CRUD over the activity catalog with best-effort calendar mirroring.
/// Every mutation commits locally first; the matching calendar intent is
/// dispatched afterwards and a failure surfaces as a `warning` field on the
/// otherwise-successful response, never as an error.
///
/// # Endpoints
///
/// - `GET    /v1/activities` - Upcoming activities (authenticated)
/// - `GET    /v1/activities/public` - Upcoming public activities (guest)
/// - `GET    /v1/activities/:id` - Detail with roster and payment info
/// - `POST   /v1/activities` - Create (organizer)
/// - `PUT    /v1/activities/:id` - Edit (organizer)
/// - `DELETE /v1/activities/:id` - Delete (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use clubhouse_shared::{
    auth::{
        authorization::{require_admin, require_authenticated, require_organizer},
        session::Principal,
    },
    external::intent::SyncIntent,
    models::{
        activity::{Activity, CreateActivity, UpdateActivity},
        payment::{Payment, PaymentStatus},
        signup::Signup,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Activity create/edit request
#[derive(Debug, Deserialize, Validate)]
pub struct ActivityRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Date the activity takes place on
    pub date: NaiveDate,

    /// Optional start time (HH:MM)
    #[validate(length(max = 50, message = "Start time too long"))]
    pub start_time: Option<String>,

    /// Optional end time (HH:MM)
    #[validate(length(max = 50, message = "End time too long"))]
    pub end_time: Option<String>,

    /// Participant limit; absent means unlimited
    #[validate(range(min = 1, message = "Participant limit must be positive"))]
    pub max_participants: Option<i32>,

    /// Optional location
    #[validate(length(max = 200, message = "Location too long"))]
    pub location: Option<String>,

    /// Whether guests can see the activity
    #[serde(default)]
    pub is_public: bool,

    /// Cost in euros; absent or 0 means free
    #[validate(range(min = 0.0, message = "Cost cannot be negative"))]
    pub cost: Option<f64>,
}

/// Response wrapping an activity plus the non-fatal sync warning
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub activity: Activity,

    /// Present when the calendar mirror could not be updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// One entry in an activity listing
#[derive(Debug, Serialize)]
pub struct ActivityListEntry {
    #[serde(flatten)]
    pub activity: Activity,

    /// Committed signup count
    pub signup_count: i64,
}

/// Activity detail response
#[derive(Debug, Serialize)]
pub struct ActivityDetailResponse {
    #[serde(flatten)]
    pub activity: Activity,

    /// Committed signup count
    pub signup_count: i64,

    /// Roster, oldest signup first
    pub signups: Vec<Signup>,

    /// Whether the caller is on the roster
    pub signed_up: bool,

    /// The caller's payment status, when the activity has a cost
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,

    /// All payment rows for the activity; admins only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<Payment>>,
}

/// Response confirming a deletion
#[derive(Debug, Serialize)]
pub struct DeleteActivityResponse {
    pub deleted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Lists upcoming activities for members
pub async fn list_activities(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
) -> ApiResult<Json<Vec<ActivityListEntry>>> {
    require_authenticated(principal.as_ref())?;

    let activities = Activity::list_upcoming(&state.db, Utc::now().date_naive()).await?;
    let entries = with_signup_counts(&state, activities).await?;

    Ok(Json(entries))
}

/// Lists upcoming activities visible without logging in
pub async fn list_public_activities(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ActivityListEntry>>> {
    let activities = Activity::list_public_upcoming(&state.db, Utc::now().date_naive()).await?;
    let entries = with_signup_counts(&state, activities).await?;

    Ok(Json(entries))
}

async fn with_signup_counts(
    state: &AppState,
    activities: Vec<Activity>,
) -> Result<Vec<ActivityListEntry>, ApiError> {
    let mut entries = Vec::with_capacity(activities.len());
    for activity in activities {
        let signup_count = Activity::signup_count(&state.db, activity.id).await?;
        entries.push(ActivityListEntry {
            activity,
            signup_count,
        });
    }
    Ok(entries)
}

/// Fetches one activity with roster and payment information
///
/// Members see the roster and their own payment status; admins additionally
/// get every payment row for the activity.
///
/// # Errors
///
/// - `401 Unauthorized`: Not logged in
/// - `404 Not Found`: Unknown activity
pub async fn get_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ActivityDetailResponse>> {
    let caller = require_authenticated(principal.as_ref())?;

    let activity = Activity::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    let signups = Signup::list_for_activity(&state.db, id).await?;
    let signed_up = signups
        .iter()
        .any(|s| s.participant_name == caller.username);

    let payment_status = if activity.requires_payment() {
        Payment::find(&state.db, caller.user_id, id)
            .await?
            .map(|p| p.status)
            .or(Some(PaymentStatus::Unpaid))
    } else {
        None
    };

    let payments = if require_admin(principal.as_ref()).is_ok() {
        Some(Payment::list_for_activity(&state.db, id).await?)
    } else {
        None
    };

    Ok(Json(ActivityDetailResponse {
        signup_count: signups.len() as i64,
        signups,
        signed_up,
        payment_status,
        payments,
        activity,
    }))
}

/// Creates an activity and mirrors it to the calendar
///
/// The row commits first; the calendar create runs afterwards and, when it
/// succeeds, the returned external event id is recorded on the row. A sync
/// failure leaves `calendar_event_id` NULL and sets the response warning.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an organizer
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
    Json(req): Json<ActivityRequest>,
) -> ApiResult<Json<ActivityResponse>> {
    require_organizer(principal.as_ref())?;
    req.validate()?;

    let mut activity = Activity::create(
        &state.db,
        CreateActivity {
            name: req.name,
            description: req.description,
            date: req.date,
            start_time: req.start_time,
            end_time: req.end_time,
            max_participants: req.max_participants,
            location: req.location,
            is_public: req.is_public,
            cost: req.cost,
        },
    )
    .await?;

    let result = state
        .dispatcher
        .dispatch_sync(&SyncIntent::Create {
            activity: activity.clone(),
        })
        .await;

    if let Some(event_id) = &result.created_event_id {
        Activity::set_calendar_event_id(&state.db, activity.id, Some(event_id)).await?;
        activity.calendar_event_id = Some(event_id.clone());
    }

    tracing::info!(activity_id = %activity.id, "Activity created");

    Ok(Json(ActivityResponse {
        activity,
        warning: result.warning,
    }))
}

/// Edits an activity and mirrors the change to the calendar
///
/// When the activity has a recorded external event id the mirror is an
/// update; otherwise a create is attempted (covers activities whose initial
/// sync failed) and the new id is recorded on success.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an organizer
/// - `404 Not Found`: Unknown activity
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ActivityRequest>,
) -> ApiResult<Json<ActivityResponse>> {
    require_organizer(principal.as_ref())?;
    req.validate()?;

    let mut activity = Activity::update(
        &state.db,
        id,
        UpdateActivity {
            name: req.name,
            description: req.description,
            date: req.date,
            start_time: req.start_time,
            end_time: req.end_time,
            max_participants: req.max_participants,
            location: req.location,
            is_public: req.is_public,
            cost: req.cost,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    let intent = match &activity.calendar_event_id {
        Some(event_id) => SyncIntent::Update {
            activity: activity.clone(),
            event_id: event_id.clone(),
        },
        None => SyncIntent::Create {
            activity: activity.clone(),
        },
    };

    let result = state.dispatcher.dispatch_sync(&intent).await;

    if let Some(event_id) = &result.created_event_id {
        Activity::set_calendar_event_id(&state.db, activity.id, Some(event_id)).await?;
        activity.calendar_event_id = Some(event_id.clone());
    }

    tracing::info!(activity_id = %activity.id, "Activity updated");

    Ok(Json(ActivityResponse {
        activity,
        warning: result.warning,
    }))
}

/// Deletes an activity
///
/// Signups and payments cascade at the storage layer. When an external
/// event id is recorded, exactly one remote delete is attempted after the
/// local delete; its failure only produces a warning.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: Unknown activity
pub async fn delete_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Option<Principal>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteActivityResponse>> {
    require_admin(principal.as_ref())?;

    let activity = Activity::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    let deleted = Activity::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Activity not found".to_string()));
    }

    let warning = match activity.calendar_event_id {
        Some(event_id) => {
            let result = state
                .dispatcher
                .dispatch_sync(&SyncIntent::Delete {
                    activity_id: id,
                    event_id,
                })
                .await;
            result.warning
        }
        None => None,
    };

    tracing::info!(activity_id = %id, "Activity deleted");

    Ok(Json(DeleteActivityResponse { deleted, warning }))
}
