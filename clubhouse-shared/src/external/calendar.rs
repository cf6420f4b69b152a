/// Calendar sync adapter
///
/// Mirrors activity create/update/delete to an external calendar service.
/// Activities with both a start and end time become timed events in a fixed
/// time zone; activities with only a date become all-day events.
///
/// Sync is always best-effort: the adapter reports failures, and the
/// dispatcher turns them into warnings. The local activity mutation has
/// already committed by the time any of these calls run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::models::activity::Activity;

/// Fixed time zone for timed events
pub const EVENT_TIME_ZONE: &str = "Europe/Amsterdam";

/// Request timeout for calendar calls; a slow calendar service must not
/// stall a request handler
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for calendar operations
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    /// Transport-level failure (unreachable, timeout, TLS)
    #[error("Calendar request failed: {0}")]
    Transport(String),

    /// The calendar service rejected the call
    #[error("Calendar service returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// Response could not be decoded
    #[error("Unexpected calendar response: {0}")]
    BadResponse(String),
}

/// When an event takes place: a whole day or a bounded time range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventSchedule {
    /// All-day event on a single date (YYYY-MM-DD)
    AllDay { date: String },

    /// Timed event with RFC 3339 local start/end in [`EVENT_TIME_ZONE`]
    Timed { start: String, end: String },
}

/// The portable event shape sent to the calendar service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub schedule: EventSchedule,
}

impl CalendarEvent {
    /// Builds the event for an activity
    ///
    /// Both start and end time must be present for a timed event; anything
    /// less falls back to an all-day event, matching how the activities are
    /// entered (a bare date, or a full time range).
    pub fn from_activity(activity: &Activity) -> Self {
        let date = activity.date.format("%Y-%m-%d").to_string();

        let schedule = match (&activity.start_time, &activity.end_time) {
            (Some(start), Some(end)) => EventSchedule::Timed {
                start: format!("{}T{}:00", date, start),
                end: format!("{}T{}:00", date, end),
            },
            _ => EventSchedule::AllDay { date },
        };

        CalendarEvent {
            summary: activity.name.clone(),
            location: activity.location.clone(),
            description: activity.description.clone(),
            schedule,
        }
    }

    /// Serializes the event into the calendar service's wire shape
    pub fn to_body(&self) -> serde_json::Value {
        let (start, end) = match &self.schedule {
            EventSchedule::AllDay { date } => (
                json!({ "date": date }),
                json!({ "date": date }),
            ),
            EventSchedule::Timed { start, end } => (
                json!({ "dateTime": start, "timeZone": EVENT_TIME_ZONE }),
                json!({ "dateTime": end, "timeZone": EVENT_TIME_ZONE }),
            ),
        };

        json!({
            "summary": self.summary,
            "location": self.location,
            "description": self.description,
            "start": start,
            "end": end,
        })
    }
}

/// Contract for mirroring activities to an external calendar
#[async_trait]
pub trait CalendarSync: Send + Sync {
    /// Creates a remote event, returning its opaque external id
    async fn create(&self, event: &CalendarEvent) -> Result<String, CalendarError>;

    /// Updates the remote event with the given external id
    async fn update(&self, event_id: &str, event: &CalendarEvent) -> Result<(), CalendarError>;

    /// Deletes the remote event with the given external id
    async fn delete(&self, event_id: &str) -> Result<(), CalendarError>;
}

/// Configuration for the REST calendar client
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// Base URL of the calendar API
    pub base_url: String,

    /// Target calendar id
    pub calendar_id: String,

    /// Bearer token for the service account
    pub token: String,
}

/// REST implementation of [`CalendarSync`]
pub struct RestCalendar {
    client: reqwest::Client,
    config: CalendarConfig,
}

/// Event-creation response: only the external id matters
#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: String,
}

impl RestCalendar {
    /// Creates a REST calendar client with a bounded request timeout
    pub fn new(config: CalendarConfig) -> Result<Self, CalendarError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CalendarError::Transport(e.to_string()))?;

        Ok(RestCalendar { client, config })
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.config.base_url.trim_end_matches('/'),
            self.config.calendar_id
        )
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), event_id)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, CalendarError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(CalendarError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CalendarSync for RestCalendar {
    async fn create(&self, event: &CalendarEvent) -> Result<String, CalendarError> {
        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(&self.config.token)
            .json(&event.to_body())
            .send()
            .await
            .map_err(|e| CalendarError::Transport(e.to_string()))?;

        let created: CreatedEvent = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::BadResponse(e.to_string()))?;

        Ok(created.id)
    }

    async fn update(&self, event_id: &str, event: &CalendarEvent) -> Result<(), CalendarError> {
        let response = self
            .client
            .put(self.event_url(event_id))
            .bearer_auth(&self.config.token)
            .json(&event.to_body())
            .send()
            .await
            .map_err(|e| CalendarError::Transport(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, event_id: &str) -> Result<(), CalendarError> {
        let response = self
            .client
            .delete(self.event_url(event_id))
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(|e| CalendarError::Transport(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn activity(start: Option<&str>, end: Option<&str>) -> Activity {
        Activity {
            id: Uuid::new_v4(),
            name: "Summer barbecue".to_string(),
            description: Some("Annual club barbecue".to_string()),
            date: NaiveDate::from_ymd_opt(2026, 7, 4).unwrap(),
            start_time: start.map(String::from),
            end_time: end.map(String::from),
            max_participants: None,
            location: Some("Club garden".to_string()),
            calendar_event_id: None,
            is_public: true,
            cost: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_timed_event_requires_both_times() {
        let timed = CalendarEvent::from_activity(&activity(Some("14:00"), Some("18:00")));
        assert_eq!(
            timed.schedule,
            EventSchedule::Timed {
                start: "2026-07-04T14:00:00".to_string(),
                end: "2026-07-04T18:00:00".to_string(),
            }
        );

        // Only a start time still syncs as all-day
        let half = CalendarEvent::from_activity(&activity(Some("14:00"), None));
        assert_eq!(
            half.schedule,
            EventSchedule::AllDay {
                date: "2026-07-04".to_string()
            }
        );

        let bare = CalendarEvent::from_activity(&activity(None, None));
        assert_eq!(
            bare.schedule,
            EventSchedule::AllDay {
                date: "2026-07-04".to_string()
            }
        );
    }

    #[test]
    fn test_all_day_body_uses_date_fields() {
        let event = CalendarEvent::from_activity(&activity(None, None));
        let body = event.to_body();

        assert_eq!(body["summary"], "Summer barbecue");
        assert_eq!(body["start"]["date"], "2026-07-04");
        assert_eq!(body["end"]["date"], "2026-07-04");
        assert!(body["start"].get("dateTime").is_none());
    }

    #[test]
    fn test_timed_body_uses_datetime_and_timezone() {
        let event = CalendarEvent::from_activity(&activity(Some("14:00"), Some("18:00")));
        let body = event.to_body();

        assert_eq!(body["start"]["dateTime"], "2026-07-04T14:00:00");
        assert_eq!(body["end"]["dateTime"], "2026-07-04T18:00:00");
        assert_eq!(body["start"]["timeZone"], EVENT_TIME_ZONE);
        assert_eq!(body["end"]["timeZone"], EVENT_TIME_ZONE);
        assert!(body["start"].get("date").is_none());
    }
}
