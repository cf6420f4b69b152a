/// Configuration management for the API server
///
/// Loads configuration from environment variables into a type-safe struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `SESSION_SECRET`: Session signing secret, at least 32 bytes (required)
/// - `ADMIN_EMAIL`: Recipient for membership requests (optional)
/// - `BANK_ACCOUNT_NAME` / `BANK_ACCOUNT_NUMBER`: Shown as payment
///   instructions on paid signups (optional)
/// - `MAIL_ENDPOINT` / `MAIL_TOKEN` / `MAIL_SENDER`: HTTP mail relay; all
///   three must be set for mail to be enabled
/// - `CALENDAR_API_BASE` / `CALENDAR_TOKEN` / `CALENDAR_ID`: external
///   calendar; all three must be set for sync to be enabled
///
/// Missing mail or calendar configuration does not prevent startup: the
/// corresponding side effects degrade to warnings, exactly like a failing
/// remote call.

use serde::{Deserialize, Serialize};
use std::env;

use clubhouse_shared::external::calendar::CalendarConfig;
use clubhouse_shared::external::mailer::MailConfig;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session signing secret
    pub session_secret: String,

    /// Club-specific settings (admin contact, payment instructions)
    pub club: ClubConfig,

    /// Mail relay configuration, when enabled
    pub mail: Option<MailConfig>,

    /// Calendar sync configuration, when enabled
    pub calendar: Option<CalendarConfig>,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Club-specific settings surfaced in responses and notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubConfig {
    /// Recipient address for membership requests
    pub admin_email: Option<String>,

    /// Account holder name for bank-transfer payment instructions
    pub bank_account_name: Option<String>,

    /// Account number for bank-transfer payment instructions
    pub bank_account_number: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;

        if session_secret.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 characters long");
        }

        let club = ClubConfig {
            admin_email: env::var("ADMIN_EMAIL").ok(),
            bank_account_name: env::var("BANK_ACCOUNT_NAME").ok(),
            bank_account_number: env::var("BANK_ACCOUNT_NUMBER").ok(),
        };

        let mail = match (
            env::var("MAIL_ENDPOINT"),
            env::var("MAIL_TOKEN"),
            env::var("MAIL_SENDER"),
        ) {
            (Ok(endpoint), Ok(token), Ok(sender)) => Some(MailConfig {
                endpoint,
                token,
                sender,
            }),
            _ => None,
        };

        let calendar = match (
            env::var("CALENDAR_API_BASE"),
            env::var("CALENDAR_TOKEN"),
            env::var("CALENDAR_ID"),
        ) {
            (Ok(base_url), Ok(token), Ok(calendar_id)) => Some(CalendarConfig {
                base_url,
                calendar_id,
                token,
            }),
            _ => None,
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session_secret,
            club,
            mail,
            calendar,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/clubhouse_test".to_string(),
                max_connections: 10,
            },
            session_secret: "test-session-secret-at-least-32-bytes!".to_string(),
            club: ClubConfig {
                admin_email: Some("board@club.example".to_string()),
                bank_account_name: Some("Clubhouse".to_string()),
                bank_account_number: Some("NL00BANK0123456789".to_string()),
            },
            mail: None,
            calendar: None,
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(sample_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_optional_collaborators_default_off() {
        let config = sample_config();
        assert!(config.mail.is_none());
        assert!(config.calendar.is_none());
    }
}
