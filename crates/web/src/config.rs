//! CRM configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CRM_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `CRM_BASE_URL` - Public URL of the application
//! - `SMTP_HOST` - SMTP server hostname
//! - `SMTP_USERNAME` - SMTP authentication username
//! - `SMTP_PASSWORD` - SMTP authentication password
//! - `SMTP_FROM` - Notification sender address
//!
//! ## Optional
//! - `CRM_HOST` - Bind address (default: 127.0.0.1)
//! - `CRM_PORT` - Listen port (default: 3000)
//! - `CRM_LOG_JSON` - Emit JSON logs when set
//! - `SMTP_PORT` - SMTP port (default: 587)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Variable source: `std::env` in production, a map in tests.
pub type Lookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// CRM application configuration.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, decides whether session cookies are `Secure`
    pub base_url: String,
    /// Outgoing mail configuration
    pub email: EmailConfig,
    /// Emit JSON-formatted logs instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Email (SMTP) configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl CrmConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration from any variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(env: &Lookup<'_>) -> Result<Self, ConfigError> {
        let database_url = get_database_url(env, "CRM_DATABASE_URL")?;
        let host = get_env_or_default(env, "CRM_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CRM_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default(env, "CRM_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CRM_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env(env, "CRM_BASE_URL")?;
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("CRM_BASE_URL".to_string(), e.to_string()))?;

        let email = EmailConfig::from_lookup(env)?;
        let log_json = get_optional_env(env, "CRM_LOG_JSON").is_some();
        let sentry_dsn = get_optional_env(env, "SENTRY_DSN");
        let sentry_environment = get_optional_env(env, "SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env(env, "SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env(env, "SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            email,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the application is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl EmailConfig {
    fn from_lookup(env: &Lookup<'_>) -> Result<Self, ConfigError> {
        let smtp_port = get_env_or_default(env, "SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            smtp_host: get_required_env(env, "SMTP_HOST")?,
            smtp_port,
            smtp_username: get_required_env(env, "SMTP_USERNAME")?,
            smtp_password: SecretString::from(get_required_env(env, "SMTP_PASSWORD")?),
            from_address: get_required_env(env, "SMTP_FROM")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_required_env(env: &Lookup<'_>, key: &str) -> Result<String, ConfigError> {
    env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(env: &Lookup<'_>, primary_key: &str) -> Result<SecretString, ConfigError> {
    env(primary_key)
        .or_else(|| env("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

fn get_optional_env(env: &Lookup<'_>, key: &str) -> Option<String> {
    env(key).filter(|v| !v.is_empty())
}

fn get_env_or_default(env: &Lookup<'_>, key: &str, default: &str) -> String {
    env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn email_config() -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.mailhost.test".to_string(),
            smtp_port: 587,
            smtp_username: "crm-mailer".to_string(),
            smtp_password: SecretString::from("hunter2-smtp-pass"),
            from_address: "crm@mailhost.test".to_string(),
        }
    }

    fn required_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("CRM_DATABASE_URL", "postgres://localhost/crm"),
            ("CRM_BASE_URL", "https://crm.internal.test"),
            ("SMTP_HOST", "smtp.mailhost.test"),
            ("SMTP_USERNAME", "crm-mailer"),
            ("SMTP_PASSWORD", "hunter2-smtp-pass"),
            ("SMTP_FROM", "crm@mailhost.test"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<CrmConfig, ConfigError> {
        CrmConfig::from_lookup(&|key| vars.get(key).map(ToString::to_string))
    }

    #[test]
    fn test_required_vars_are_enough() {
        let config = load(&required_vars()).unwrap();

        assert_eq!(config.socket_addr(), "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.email.smtp_port, 587);
        assert!(!config.log_json);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_smtp_host_is_reported() {
        let mut vars = required_vars();
        vars.remove("SMTP_HOST");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::MissingEnvVar(key)) if key == "SMTP_HOST"
        ));
    }

    #[test]
    fn test_database_url_falls_back() {
        let mut vars = required_vars();
        vars.remove("CRM_DATABASE_URL");
        assert!(load(&vars).is_err());

        vars.insert("DATABASE_URL", "postgres://db.internal/crm");
        assert!(load(&vars).is_ok());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut vars = required_vars();
        vars.insert("CRM_PORT", "eighty");
        assert!(matches!(load(&vars), Err(ConfigError::InvalidEnvVar(..))));
    }

    #[test]
    fn test_socket_addr_and_secure_flag() {
        let config = CrmConfig {
            database_url: SecretString::from("postgres://localhost/crm"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://crm.internal.test".to_string(),
            email: email_config(),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        };

        assert_eq!(config.socket_addr().port(), 3000);
        assert!(config.is_secure());
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let debug_output = format!("{:?}", email_config());
        assert!(debug_output.contains("smtp.mailhost.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2-smtp-pass"));
    }
}
