use authgate_auth::TokenConfig;
use authgate_mail::EmailConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except `database_url` and the token secrets have defaults
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for background tasks to stop after the server drains.
    pub shutdown_timeout_secs: u64,
    /// Budget for a single login or logout attempt (default: `5`).
    pub login_timeout_secs: u64,
    /// How often stale sessions are purged (default: `3600`).
    pub session_cleanup_interval_secs: u64,
    /// How long revoked or lapsed sessions are retained (default: `30`).
    pub session_retention_days: i64,
    /// Postgres connection string.
    pub database_url: String,
    /// Redis connection string; `None` selects the in-process session cache.
    pub redis_url: Option<String>,
    /// Signing secrets and token lifetimes.
    pub tokens: TokenConfig,
    /// SMTP settings; `None` disables outbound mail.
    pub email: Option<EmailConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3000`                  |
    /// | `CORS_ORIGINS`                  | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`         | `30`                    |
    /// | `LOGIN_TIMEOUT_SECS`            | `5`                     |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                  |
    /// | `SESSION_RETENTION_DAYS`        | `30`                    |
    /// | `DATABASE_URL`                  | required                |
    /// | `REDIS_URL`                     | unset                   |
    ///
    /// Token settings come from [`TokenConfig::from_env`] and SMTP settings
    /// from [`EmailConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let redis_url = std::env::var("REDIS_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env_number("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_number("SHUTDOWN_TIMEOUT_SECS", 30),
            login_timeout_secs: env_number("LOGIN_TIMEOUT_SECS", 5),
            session_cleanup_interval_secs: env_number("SESSION_CLEANUP_INTERVAL_SECS", 3600),
            session_retention_days: env_number("SESSION_RETENTION_DAYS", 30),
            database_url,
            redis_url,
            tokens: TokenConfig::from_env(),
            email: EmailConfig::from_env(),
        }
    }
}

/// Read a numeric variable, falling back to `default` when unset.
///
/// Panics on a value that does not parse, so misconfiguration fails at startup.
fn env_number<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid number: {e}")),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
