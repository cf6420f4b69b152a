/// Activity model and database operations
///
/// An activity is a scheduled club event members can sign up for. Activities
/// own their signups: deleting an activity cascades to its signup rows.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE activities (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     description TEXT,
///     date DATE NOT NULL,
///     start_time VARCHAR(50),
///     end_time VARCHAR(50),
///     max_participants INTEGER,
///     location VARCHAR(200),
///     calendar_event_id VARCHAR(255) UNIQUE,
///     is_public BOOLEAN NOT NULL DEFAULT FALSE,
///     cost DOUBLE PRECISION,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `max_participants` NULL means unlimited capacity; `cost` NULL or 0 means
/// the activity is free and never produces a payment row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Activity model representing a scheduled club event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
    /// Unique activity ID (UUID v4)
    pub id: Uuid,

    /// Display name of the activity
    pub name: String,

    /// Optional long-form description
    pub description: Option<String>,

    /// Calendar date the activity takes place on
    pub date: NaiveDate,

    /// Optional start time as an HH:MM string
    pub start_time: Option<String>,

    /// Optional end time as an HH:MM string
    pub end_time: Option<String>,

    /// Maximum number of participants (None = unlimited)
    pub max_participants: Option<i32>,

    /// Optional location
    pub location: Option<String>,

    /// Opaque external calendar event id, set when calendar sync succeeded
    pub calendar_event_id: Option<String>,

    /// Whether the activity is visible to guests
    pub is_public: bool,

    /// Cost in euros (None or 0 = free)
    pub cost: Option<f64>,

    /// When the activity was created
    pub created_at: DateTime<Utc>,

    /// When the activity was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivity {
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub max_participants: Option<i32>,
    pub location: Option<String>,
    pub is_public: bool,
    pub cost: Option<f64>,
}

/// Input for updating an existing activity
///
/// Unlike partial-update inputs elsewhere, edits replace the full set of
/// editable fields: the edit form always submits every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateActivity {
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub max_participants: Option<i32>,
    pub location: Option<String>,
    pub is_public: bool,
    pub cost: Option<f64>,
}

impl Activity {
    /// Returns true when the activity has a cost that must be settled
    pub fn requires_payment(&self) -> bool {
        matches!(self.cost, Some(c) if c > 0.0)
    }

    /// Creates a new activity
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateActivity) -> Result<Self, sqlx::Error> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities
                (name, description, date, start_time, end_time, max_participants,
                 location, is_public, cost)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, description, date, start_time, end_time,
                      max_participants, location, calendar_event_id, is_public,
                      cost, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.max_participants)
        .bind(data.location)
        .bind(data.is_public)
        .bind(data.cost)
        .fetch_one(pool)
        .await?;

        Ok(activity)
    }

    /// Finds an activity by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, name, description, date, start_time, end_time,
                   max_participants, location, calendar_event_id, is_public,
                   cost, created_at, updated_at
            FROM activities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(activity)
    }

    /// Lists upcoming activities (today or later), soonest first
    pub async fn list_upcoming(pool: &PgPool, today: NaiveDate) -> Result<Vec<Self>, sqlx::Error> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, name, description, date, start_time, end_time,
                   max_participants, location, calendar_event_id, is_public,
                   cost, created_at, updated_at
            FROM activities
            WHERE date >= $1
            ORDER BY date ASC
            "#,
        )
        .bind(today)
        .fetch_all(pool)
        .await?;

        Ok(activities)
    }

    /// Lists upcoming activities visible to guests
    pub async fn list_public_upcoming(
        pool: &PgPool,
        today: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, name, description, date, start_time, end_time,
                   max_participants, location, calendar_event_id, is_public,
                   cost, created_at, updated_at
            FROM activities
            WHERE is_public = TRUE AND date >= $1
            ORDER BY date ASC
            "#,
        )
        .bind(today)
        .fetch_all(pool)
        .await?;

        Ok(activities)
    }

    /// Lists all activities, newest date first (admin overview, includes past)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, name, description, date, start_time, end_time,
                   max_participants, location, calendar_event_id, is_public,
                   cost, created_at, updated_at
            FROM activities
            ORDER BY date DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(activities)
    }

    /// Updates an activity's editable fields
    ///
    /// # Returns
    ///
    /// The updated activity if found, None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateActivity,
    ) -> Result<Option<Self>, sqlx::Error> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            UPDATE activities
            SET name = $2, description = $3, date = $4, start_time = $5,
                end_time = $6, max_participants = $7, location = $8,
                is_public = $9, cost = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, date, start_time, end_time,
                      max_participants, location, calendar_event_id, is_public,
                      cost, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.max_participants)
        .bind(data.location)
        .bind(data.is_public)
        .bind(data.cost)
        .fetch_optional(pool)
        .await?;

        Ok(activity)
    }

    /// Records the external calendar event id after a successful sync
    pub async fn set_calendar_event_id(
        pool: &PgPool,
        id: Uuid,
        event_id: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE activities SET calendar_event_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(event_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes an activity (signups cascade at the storage layer)
    ///
    /// # Returns
    ///
    /// True if the activity was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts committed signups for an activity
    pub async fn signup_count(pool: &PgPool, id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM signups WHERE activity_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_activity(cost: Option<f64>) -> Activity {
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
            cost,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_requires_payment() {
        assert!(sample_activity(Some(12.5)).requires_payment());
        assert!(!sample_activity(Some(0.0)).requires_payment());
        assert!(!sample_activity(None).requires_payment());
    }

    #[test]
    fn test_create_activity_struct() {
        let create = CreateActivity {
            name: "Game night".to_string(),
            description: Some("Board games".to_string()),
            date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            start_time: None,
            end_time: None,
            max_participants: None,
            location: None,
            is_public: true,
            cost: None,
        };

        assert_eq!(create.name, "Game night");
        assert!(create.max_participants.is_none());
    }

    // Integration tests for database operations are in
    // clubhouse-api/tests/workflow_tests.rs
}
