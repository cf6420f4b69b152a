/// Side-effect intents produced by the core workflow
///
/// Workflow operations never call the mail or calendar services themselves.
/// They return plain intent values describing the side effect, and the
/// dispatcher executes those intents only after the local transaction has
/// committed. A failed side effect therefore never rolls back a durable
/// state transition.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::activity::Activity;

/// A deferred description of one plain-text email to send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationIntent {
    /// Email subject line
    pub subject: String,

    /// Recipient addresses
    pub recipients: Vec<String>,

    /// Plain-text body
    pub body: String,
}

impl NotificationIntent {
    /// Builds the payment-approved confirmation email
    pub fn payment_approved(username: &str, email: &str, activity: &Activity) -> Self {
        let mut body = format!(
            "Dear {username},\n\n\
             Great news! Your payment for '{name}' has been received and approved.\n\
             Your signup is now final.\n\n\
             Activity: {name}\n\
             Date: {date}\n",
            username = username,
            name = activity.name,
            date = activity.date.format("%d-%m-%Y"),
        );
        if let Some(start) = &activity.start_time {
            body.push_str(&format!("Time: {}\n", start));
        }
        if let Some(location) = &activity.location {
            body.push_str(&format!("Location: {}\n", location));
        }
        body.push_str("\nWe look forward to seeing you!\n\nThe Clubhouse team\n");

        NotificationIntent {
            subject: format!("Your payment for '{}' has been approved!", activity.name),
            recipients: vec![email.to_string()],
            body,
        }
    }

    /// Builds the payment-rejected email
    pub fn payment_rejected(username: &str, email: &str, activity: &Activity) -> Self {
        let mut body = format!(
            "Dear {username},\n\n\
             Unfortunately your payment for '{name}' could not be verified or was\n\
             rejected. Please check your payment details and try again from the\n\
             activity page.\n\n\
             Activity: {name}\n\
             Date: {date}\n",
            username = username,
            name = activity.name,
            date = activity.date.format("%d-%m-%Y"),
        );
        if let Some(cost) = activity.cost {
            body.push_str(&format!("Cost: EUR {:.2}\n", cost));
        }
        body.push_str("\nOur apologies for the inconvenience.\n\nThe Clubhouse team\n");

        NotificationIntent {
            subject: format!("Status of your payment for '{}'", activity.name),
            recipients: vec![email.to_string()],
            body,
        }
    }

    /// Builds the membership-request email sent to the admin address
    pub fn membership_request(name: &str, email: &str, message: &str, admin_email: &str) -> Self {
        NotificationIntent {
            subject: format!("New membership request from {}", name),
            recipients: vec![admin_email.to_string()],
            body: format!(
                "A new membership request was received.\n\n\
                 Name: {name}\n\
                 Email: {email}\n\n\
                 Message:\n{message}\n",
            ),
        }
    }
}

/// A deferred calendar mutation mirroring a local activity change
#[derive(Debug, Clone, PartialEq)]
pub enum SyncIntent {
    /// Create a remote event for a newly created activity; on success the
    /// returned external id is recorded on the activity row
    Create { activity: Activity },

    /// Update the remote event recorded for an edited activity
    Update {
        activity: Activity,
        event_id: String,
    },

    /// Delete the remote event recorded for a removed activity
    Delete { activity_id: Uuid, event_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn activity() -> Activity {
        Activity {
            id: Uuid::new_v4(),
            name: "Wine tasting".to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
            start_time: Some("19:00".to_string()),
            end_time: Some("22:00".to_string()),
            max_participants: Some(20),
            location: Some("The cellar".to_string()),
            calendar_event_id: None,
            is_public: false,
            cost: Some(12.5),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_payment_approved_intent_names_activity_and_user() {
        let intent = NotificationIntent::payment_approved("alice", "alice@example.com", &activity());

        assert!(intent.subject.contains("Wine tasting"));
        assert_eq!(intent.recipients, vec!["alice@example.com".to_string()]);
        assert!(intent.body.contains("Dear alice"));
        assert!(intent.body.contains("Date: 12-09-2026"));
        assert!(intent.body.contains("Time: 19:00"));
        assert!(intent.body.contains("Location: The cellar"));
    }

    #[test]
    fn test_payment_approved_intent_skips_missing_fields() {
        let mut a = activity();
        a.start_time = None;
        a.location = None;

        let intent = NotificationIntent::payment_approved("bob", "bob@example.com", &a);
        assert!(!intent.body.contains("Time:"));
        assert!(!intent.body.contains("Location:"));
    }

    #[test]
    fn test_payment_rejected_intent_includes_cost() {
        let intent = NotificationIntent::payment_rejected("alice", "alice@example.com", &activity());

        assert!(intent.subject.contains("payment"));
        assert!(intent.body.contains("Cost: EUR 12.50"));
    }

    #[test]
    fn test_membership_request_goes_to_admin() {
        let intent = NotificationIntent::membership_request(
            "Carol",
            "carol@example.com",
            "I would like to join.",
            "board@club.example",
        );

        assert_eq!(intent.recipients, vec!["board@club.example".to_string()]);
        assert!(intent.body.contains("carol@example.com"));
        assert!(intent.body.contains("I would like to join."));
    }
}
