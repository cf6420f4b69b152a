/// External collaborators: calendar sync and mail, plus the dispatcher
///
/// All calls out of the process are best-effort side effects. The core
/// workflow produces intent values ([`intent`]); the [`dispatcher`] executes
/// them after the local transaction has committed, converting every failure
/// into a warning instead of an error. No external failure ever blocks or
/// rolls back a local state change, and nothing here retries.
///
/// # Modules
///
/// - [`intent`]: `NotificationIntent` and `SyncIntent` value objects
/// - [`calendar`]: `CalendarSync` trait and REST implementation
/// - [`mailer`]: `Mailer` trait and HTTP relay implementation
/// - [`dispatcher`]: post-commit executor for intents

pub mod calendar;
pub mod dispatcher;
pub mod intent;
pub mod mailer;
