// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for production deployment

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use foodgram_core::constants::{pagination, ports};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

/// Minimum accepted length of a configured JWT secret
const MIN_JWT_SECRET_LEN: usize = 32;

/// Lowest bcrypt cost, used for tests and debug builds (~60x faster than the default)
const FAST_BCRYPT_COST: u32 = 4;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages (default)
    #[default]
    Info,
    /// Debug information
    Debug,
    /// Very verbose tracing
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (default)
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string
    ///
    /// Accepts `sqlite:<path>`, `sqlite::memory:` and bare file paths.
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s.strip_prefix("sqlite://").or_else(|| s.strip_prefix("sqlite:")).unwrap_or(s);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/foodgram.db"),
        }
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign JWTs
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// Bcrypt work factor for password hashes
    pub bcrypt_cost: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origins, or `*`
    pub allowed_origins: String,
}

/// List endpoint page sizes
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size when `limit` is absent
    pub default_page_size: u32,
    /// Upper bound on `limit`
    pub max_page_size: u32,
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Authentication settings
    pub auth: AuthConfig,
    /// Public origin used in short links, redirects and image URLs, without trailing slash
    pub public_base_url: String,
    /// Directory where uploaded images are stored
    pub media_root: PathBuf,
    /// CORS settings
    pub cors: CorsConfig,
    /// Pagination settings
    pub pagination: PaginationConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unparseable value, if
    /// `JWT_SECRET` is missing in production, or if validation fails
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let environment = Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment.is_production() => {
                return Err(anyhow::anyhow!("JWT_SECRET must be set in production"));
            }
            Err(_) => {
                warn!("JWT_SECRET not set, generating an ephemeral secret; tokens will not survive restarts");
                generate_jwt_secret()
            }
        };

        let config = Self {
            host: env_var_or("HOST", "127.0.0.1"),
            http_port: env_var_or("HTTP_PORT", &ports::DEFAULT_HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            log_level: LogLevel::from_str_or_default(&env_var_or("RUST_LOG", "info")),
            environment,
            database_url: env::var("DATABASE_URL")
                .map(|url| DatabaseUrl::parse_url(&url))
                .unwrap_or_default(),
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: env_var_or("JWT_EXPIRY_HOURS", "24")
                    .parse()
                    .context("Invalid JWT_EXPIRY_HOURS value")?,
                bcrypt_cost: match env::var("BCRYPT_COST") {
                    Ok(cost) => cost.parse().context("Invalid BCRYPT_COST value")?,
                    Err(_) => default_bcrypt_cost(environment),
                },
            },
            public_base_url: env_var_or("PUBLIC_BASE_URL", "http://localhost:8000")
                .trim_end_matches('/')
                .to_owned(),
            media_root: PathBuf::from(env_var_or("MEDIA_ROOT", "./media")),
            cors: CorsConfig {
                allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*"),
            },
            pagination: PaginationConfig {
                default_page_size: env_var_or(
                    "DEFAULT_PAGE_SIZE",
                    &pagination::DEFAULT_PAGE_SIZE.to_string(),
                )
                .parse()
                .context("Invalid DEFAULT_PAGE_SIZE value")?,
                max_page_size: env_var_or("MAX_PAGE_SIZE", &pagination::MAX_PAGE_SIZE.to_string())
                    .parse()
                    .context("Invalid MAX_PAGE_SIZE value")?,
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Configuration for tests: in-memory database, fixed secret
    #[must_use]
    pub fn for_testing(media_root: PathBuf) -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            http_port: ports::DEFAULT_HTTP_PORT,
            log_level: LogLevel::Warn,
            environment: Environment::Testing,
            database_url: DatabaseUrl::Memory,
            auth: AuthConfig {
                jwt_secret: "test-secret-test-secret-test-secret-0123".to_owned(),
                jwt_expiry_hours: 24,
                bcrypt_cost: FAST_BCRYPT_COST,
            },
            public_base_url: "http://testserver".to_owned(),
            media_root,
            cors: CorsConfig {
                allowed_origins: "*".to_owned(),
            },
            pagination: PaginationConfig {
                default_page_size: pagination::DEFAULT_PAGE_SIZE,
                max_page_size: pagination::MAX_PAGE_SIZE,
            },
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters"
            ));
        }

        if self.auth.jwt_expiry_hours <= 0 {
            return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }

        if !(FAST_BCRYPT_COST..=31).contains(&self.auth.bcrypt_cost) {
            return Err(anyhow::anyhow!("BCRYPT_COST must be between 4 and 31"));
        }

        if self.pagination.default_page_size == 0
            || self.pagination.default_page_size > self.pagination.max_page_size
        {
            return Err(anyhow::anyhow!(
                "DEFAULT_PAGE_SIZE must be between 1 and MAX_PAGE_SIZE"
            ));
        }

        let base = Url::parse(&self.public_base_url).context("Invalid PUBLIC_BASE_URL value")?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!("PUBLIC_BASE_URL must be an absolute http(s) URL"));
        }

        if self.environment.is_production() && self.database_url.is_memory() {
            warn!("Production environment is running on an in-memory database");
        }

        Ok(())
    }

    /// Socket address string to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Foodgram Server Configuration:\n\
             - Environment: {}\n\
             - Bind Address: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - Public URL: {}\n\
             - Media Root: {}\n\
             - CORS Origins: {}\n\
             - Page Size: {} (max {})\n\
             - JWT Expiry: {}h",
            self.environment,
            self.bind_address(),
            self.log_level,
            self.database_url,
            self.public_base_url,
            self.media_root.display(),
            self.cors.allowed_origins,
            self.pagination.default_page_size,
            self.pagination.max_page_size,
            self.auth.jwt_expiry_hours,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn default_bcrypt_cost(environment: Environment) -> u32 {
    if environment == Environment::Testing || cfg!(debug_assertions) {
        FAST_BCRYPT_COST
    } else {
        bcrypt::DEFAULT_COST
    }
}

/// Generate a random development JWT secret
fn generate_jwt_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("bogus"), LogLevel::Info);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("whatever"),
            Environment::Development
        );
    }

    #[test]
    fn test_database_url_parsing() {
        assert_eq!(DatabaseUrl::parse_url("sqlite::memory:"), DatabaseUrl::Memory);
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:./data/app.db"),
            DatabaseUrl::SQLite {
                path: PathBuf::from("./data/app.db")
            }
        );
        assert_eq!(
            DatabaseUrl::parse_url("/var/lib/foodgram.db").to_connection_string(),
            "sqlite:/var/lib/foodgram.db"
        );
    }

    #[test]
    fn test_testing_config_is_valid() {
        let config = ServerConfig::for_testing(PathBuf::from("/tmp/media"));
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = ServerConfig::for_testing(PathBuf::from("/tmp/media"));
        config.auth.jwt_secret = "short".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        env::set_var("HTTP_PORT", "9100");
        env::set_var("DATABASE_URL", "sqlite::memory:");
        env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");
        env::set_var("DEFAULT_PAGE_SIZE", "10");

        let config = ServerConfig::from_env().unwrap();

        env::remove_var("HTTP_PORT");
        env::remove_var("DATABASE_URL");
        env::remove_var("JWT_SECRET");
        env::remove_var("DEFAULT_PAGE_SIZE");

        assert_eq!(config.http_port, 9100);
        assert!(config.database_url.is_memory());
        assert_eq!(config.pagination.default_page_size, 10);
    }
}
