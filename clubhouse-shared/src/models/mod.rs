/// Database models for Clubhouse
///
/// This module contains all database models and their operations, including
/// the capacity-guarded signup registration and the payment workflow.
///
/// # Models
///
/// - `activity`: Club activities members can sign up for
/// - `signup`: Capacity-guarded, idempotent activity registrations
/// - `user`: User accounts with role-based privileges
/// - `invitation_code`: Single-use registration codes carrying a role grant
/// - `payment`: Per-(user, activity) payment status workflow
///
/// # Example
///
/// ```no_run
/// use clubhouse_shared::models::activity::{Activity, CreateActivity};
/// use clubhouse_shared::db::pool::{create_pool, DatabaseConfig};
/// use chrono::NaiveDate;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let activity = Activity::create(&pool, CreateActivity {
///     name: "Wine tasting".to_string(),
///     description: None,
///     date: NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
///     start_time: Some("19:00".to_string()),
///     end_time: Some("22:00".to_string()),
///     max_participants: Some(20),
///     location: Some("The cellar".to_string()),
///     is_public: false,
///     cost: Some(12.50),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod activity;
pub mod invitation_code;
pub mod payment;
pub mod signup;
pub mod user;
