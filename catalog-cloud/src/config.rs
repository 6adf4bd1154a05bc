//! Catalog server configuration

use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; unset in development selects the in-memory store
    pub database_url: Option<String>,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret for bearer tokens on write routes
    pub jwt_secret: String,
    /// Upper bound on a single request's store work
    pub request_timeout: Duration,
    pub db_max_connections: u32,
}

impl Config {
    /// Secrets may fall back to a placeholder only in development
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let dev = environment == "development";
        match std::env::var(name) {
            Ok(v) if !v.is_empty() => Ok(v),
            _ if dev => Ok(format!("dev-{}-placeholder", name.to_lowercase())),
            Ok(_) => Err(format!("{name} is empty ({environment})").into()),
            Err(_) => Err(format!("{name} is required outside development ({environment})").into()),
        }
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            http_port: Self::parse_or("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            request_timeout: Duration::from_secs(Self::parse_or("REQUEST_TIMEOUT_SECS", 30)),
            db_max_connections: Self::parse_or("DB_MAX_CONNECTIONS", 10),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
