/// Post-commit intent dispatcher
///
/// Executes the side-effect intents the workflow produced, strictly after
/// the local transaction has committed. Every outcome here is non-fatal:
/// the dispatcher logs a warning, hands the caller a human-readable warning
/// string to attach to the otherwise-successful response, and never rolls
/// anything back or retries.
///
/// When a collaborator is not configured (missing credentials in the
/// environment), its intents degrade to the same warning path the original
/// failure modes use.

use std::sync::Arc;
use tracing::{info, warn};

use super::calendar::{CalendarEvent, CalendarSync};
use super::intent::{NotificationIntent, SyncIntent};
use super::mailer::Mailer;

/// Result of executing a sync intent
#[derive(Debug, Clone, Default)]
pub struct SyncResult {
    /// External event id returned by a successful create; the caller
    /// records it on the activity row
    pub created_event_id: Option<String>,

    /// Non-fatal warning describing what went wrong, if anything
    pub warning: Option<String>,
}

/// Executes notification and sync intents after commit
#[derive(Clone)]
pub struct Dispatcher {
    mailer: Option<Arc<dyn Mailer>>,
    calendar: Option<Arc<dyn CalendarSync>>,
}

impl Dispatcher {
    /// Creates a dispatcher; None for either collaborator disables it
    pub fn new(
        mailer: Option<Arc<dyn Mailer>>,
        calendar: Option<Arc<dyn CalendarSync>>,
    ) -> Self {
        Dispatcher { mailer, calendar }
    }

    /// Sends a notification email, best-effort
    ///
    /// Returns a warning string on failure (or when mail is unconfigured),
    /// None on success.
    pub async fn dispatch_notification(&self, intent: &NotificationIntent) -> Option<String> {
        let Some(mailer) = &self.mailer else {
            warn!(subject = %intent.subject, "Mail not configured; notification skipped");
            return Some("Notification email was not sent: mail is not configured".to_string());
        };

        match mailer
            .send(&intent.subject, &intent.recipients, &intent.body)
            .await
        {
            Ok(()) => {
                info!(subject = %intent.subject, "Notification email sent");
                None
            }
            Err(e) => {
                warn!(subject = %intent.subject, error = %e, "Notification email failed");
                Some(format!("Notification email could not be sent: {}", e))
            }
        }
    }

    /// Executes a calendar sync intent, best-effort
    ///
    /// A delete intent issues exactly one remote delete call regardless of
    /// its outcome; creates and updates likewise make a single attempt.
    pub async fn dispatch_sync(&self, intent: &SyncIntent) -> SyncResult {
        let Some(calendar) = &self.calendar else {
            warn!("Calendar not configured; sync skipped");
            return SyncResult {
                created_event_id: None,
                warning: Some("Calendar was not updated: sync is not configured".to_string()),
            };
        };

        match intent {
            SyncIntent::Create { activity } => {
                let event = CalendarEvent::from_activity(activity);
                match calendar.create(&event).await {
                    Ok(event_id) => {
                        info!(activity_id = %activity.id, event_id = %event_id, "Calendar event created");
                        SyncResult {
                            created_event_id: Some(event_id),
                            warning: None,
                        }
                    }
                    Err(e) => {
                        warn!(activity_id = %activity.id, error = %e, "Calendar create failed");
                        SyncResult {
                            created_event_id: None,
                            warning: Some(format!("Calendar event was not created: {}", e)),
                        }
                    }
                }
            }
            SyncIntent::Update { activity, event_id } => {
                let event = CalendarEvent::from_activity(activity);
                match calendar.update(event_id, &event).await {
                    Ok(()) => {
                        info!(activity_id = %activity.id, event_id = %event_id, "Calendar event updated");
                        SyncResult::default()
                    }
                    Err(e) => {
                        warn!(activity_id = %activity.id, error = %e, "Calendar update failed");
                        SyncResult {
                            created_event_id: None,
                            warning: Some(format!("Calendar event was not updated: {}", e)),
                        }
                    }
                }
            }
            SyncIntent::Delete {
                activity_id,
                event_id,
            } => match calendar.delete(event_id).await {
                Ok(()) => {
                    info!(activity_id = %activity_id, event_id = %event_id, "Calendar event deleted");
                    SyncResult::default()
                }
                Err(e) => {
                    warn!(activity_id = %activity_id, error = %e, "Calendar delete failed");
                    SyncResult {
                        created_event_id: None,
                        warning: Some(format!("Calendar event was not deleted: {}", e)),
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::calendar::CalendarError;
    use crate::external::mailer::MailError;
    use crate::models::activity::Activity;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(
            &self,
            subject: &str,
            _recipients: &[String],
            _body: &str,
        ) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(subject.to_string());
            if self.fail {
                return Err(MailError::Remote {
                    status: 502,
                    message: "relay down".to_string(),
                });
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingCalendar {
        deletes: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl CalendarSync for RecordingCalendar {
        async fn create(&self, _event: &CalendarEvent) -> Result<String, CalendarError> {
            if self.fail {
                return Err(CalendarError::Transport("unreachable".to_string()));
            }
            Ok("evt-123".to_string())
        }

        async fn update(&self, _event_id: &str, _event: &CalendarEvent) -> Result<(), CalendarError> {
            if self.fail {
                return Err(CalendarError::Transport("unreachable".to_string()));
            }
            Ok(())
        }

        async fn delete(&self, event_id: &str) -> Result<(), CalendarError> {
            self.deletes.lock().unwrap().push(event_id.to_string());
            if self.fail {
                return Err(CalendarError::Remote {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    fn activity() -> Activity {
        Activity {
            id: Uuid::new_v4(),
            name: "Pub quiz".to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2026, 11, 5).unwrap(),
            start_time: None,
            end_time: None,
            max_participants: None,
            location: None,
            calendar_event_id: Some("evt-123".to_string()),
            is_public: false,
            cost: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn intent() -> NotificationIntent {
        NotificationIntent {
            subject: "Test".to_string(),
            recipients: vec!["a@example.com".to_string()],
            body: "Body".to_string(),
        }
    }

    #[tokio::test]
    async fn test_notification_success_has_no_warning() {
        let mailer = Arc::new(RecordingMailer::default());
        let dispatcher = Dispatcher::new(Some(mailer.clone()), None);

        let warning = dispatcher.dispatch_notification(&intent()).await;
        assert!(warning.is_none());
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_notification_failure_is_warning_not_error() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let dispatcher = Dispatcher::new(Some(mailer), None);

        let warning = dispatcher.dispatch_notification(&intent()).await;
        assert!(warning.unwrap().contains("could not be sent"));
    }

    #[tokio::test]
    async fn test_unconfigured_mail_degrades_to_warning() {
        let dispatcher = Dispatcher::new(None, None);

        let warning = dispatcher.dispatch_notification(&intent()).await;
        assert!(warning.unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn test_create_sync_returns_event_id() {
        let calendar = Arc::new(RecordingCalendar::default());
        let dispatcher = Dispatcher::new(None, Some(calendar));

        let result = dispatcher
            .dispatch_sync(&SyncIntent::Create {
                activity: activity(),
            })
            .await;

        assert_eq!(result.created_event_id.as_deref(), Some("evt-123"));
        assert!(result.warning.is_none());
    }

    #[tokio::test]
    async fn test_failed_create_sync_leaves_event_id_unset() {
        let calendar = Arc::new(RecordingCalendar {
            fail: true,
            ..Default::default()
        });
        let dispatcher = Dispatcher::new(None, Some(calendar));

        let result = dispatcher
            .dispatch_sync(&SyncIntent::Create {
                activity: activity(),
            })
            .await;

        assert!(result.created_event_id.is_none());
        assert!(result.warning.unwrap().contains("not created"));
    }

    #[tokio::test]
    async fn test_delete_sync_attempts_exactly_one_remote_call() {
        for fail in [false, true] {
            let calendar = Arc::new(RecordingCalendar {
                fail,
                ..Default::default()
            });
            let dispatcher = Dispatcher::new(None, Some(calendar.clone()));

            let result = dispatcher
                .dispatch_sync(&SyncIntent::Delete {
                    activity_id: Uuid::new_v4(),
                    event_id: "evt-123".to_string(),
                })
                .await;

            // One attempt regardless of outcome, never a retry
            assert_eq!(calendar.deletes.lock().unwrap().len(), 1);
            assert_eq!(result.warning.is_some(), fail);
        }
    }
}
