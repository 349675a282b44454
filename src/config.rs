//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::services::scope::{RootSpec, RootSuite};

/// HTTP header carrying the dashboard session id.
pub const SESSION_ID_HEADER: &str = "X-Session-Id";

/// HTTP header the Qase API reads the API token from.
pub const QASE_TOKEN_HEADER: &str = "Token";

/// Development default values.
pub mod defaults {
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8080;
    pub const QASE_API_BASE: &str = "https://api.qase.io/v1";
    pub const QASE_PROJECT_CODE: &str = "MA";
    pub const ROOT_SUITE: &str = "9";
    pub const ROOT_SUITE_NAME: &str = "PAS (Root)";
    pub const REQUIRED_SUITE_IDS: &str = "96";
    pub const PAGE_SIZE: u32 = 100; // Qase caps `limit` at 100
    pub const SUITE_BATCH_SIZE: usize = 10; // In-flight suite requests per batch
}

/// Runtime environment, from `RUST_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        *self == Self::Development
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidValue(
                "RUST_ENV must be 'development' or 'production'",
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for talking to the Qase API.
#[derive(Debug, Clone)]
pub struct QaseSettings {
    /// Base URL including the API version, without trailing slash
    pub api_base: String,
    /// Project code the dashboard reads from
    pub project_code: String,
    /// Page size for test case pagination
    pub page_size: u32,
    /// Maximum concurrent suite requests per batch
    pub suite_batch_size: usize,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Qase API settings
    pub qase: QaseSettings,
    /// Suite the dashboard is scoped to
    pub root_suite: RootSuite,
    /// Suite ids always resolved even without direct test cases
    pub required_suite_ids: Vec<i64>,
    /// Directory for static frontend assets
    pub static_dir: Option<PathBuf>,
    /// Additional CORS origins allowed in production
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `QD_HOST`: Server host (default: 127.0.0.1)
    /// - `QD_PORT`: Server port (default: 8080)
    /// - `QASE_API_BASE`: Qase API base URL (default: https://api.qase.io/v1)
    /// - `QASE_PROJECT_CODE`: Qase project code (default: MA)
    /// - `QD_ROOT_SUITE`: Root suite id or title fragment (default: 9)
    /// - `QD_ROOT_SUITE_NAME`: Title for a synthesized root (default: "PAS (Root)")
    /// - `QD_REQUIRED_SUITE_IDS`: Comma-separated suite ids to always resolve (default: 96)
    /// - `QD_PAGE_SIZE`: Test case page size, 1..=100 (default: 100)
    /// - `QD_SUITE_BATCH_SIZE`: Concurrent suite requests per batch (default: 10)
    /// - `QD_STATIC_DIR`: Static assets directory for the dashboard SPA
    /// - `QD_CORS_ORIGINS`: Comma-separated extra CORS origins
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment: Environment = env::var("RUST_ENV")
            .map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?
            .parse()?;

        let host = env_or("QD_HOST", defaults::DEV_HOST);

        let port = env_or("QD_PORT", &defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("QD_PORT must be a valid port number"))?;

        let api_base = env_or("QASE_API_BASE", defaults::QASE_API_BASE)
            .trim_end_matches('/')
            .to_string();

        let project_code = env_or("QASE_PROJECT_CODE", defaults::QASE_PROJECT_CODE);
        if project_code.trim().is_empty() {
            return Err(ConfigError::InvalidValue("QASE_PROJECT_CODE must not be empty"));
        }

        let page_size = env_or("QD_PAGE_SIZE", &defaults::PAGE_SIZE.to_string())
            .parse::<u32>()
            .ok()
            .filter(|n| (1..=100).contains(n))
            .ok_or(ConfigError::InvalidValue(
                "QD_PAGE_SIZE must be a number between 1 and 100",
            ))?;

        let suite_batch_size = env_or("QD_SUITE_BATCH_SIZE", &defaults::SUITE_BATCH_SIZE.to_string())
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::InvalidValue(
                "QD_SUITE_BATCH_SIZE must be a positive number",
            ))?;

        let root_spec = RootSpec::parse(&env_or("QD_ROOT_SUITE", defaults::ROOT_SUITE))
            .ok_or(ConfigError::InvalidValue("QD_ROOT_SUITE must not be empty"))?;
        let root_name = env_or("QD_ROOT_SUITE_NAME", defaults::ROOT_SUITE_NAME);

        let required_suite_ids = parse_id_list(&env_or(
            "QD_REQUIRED_SUITE_IDS",
            defaults::REQUIRED_SUITE_IDS,
        ))
        .ok_or(ConfigError::InvalidValue(
            "QD_REQUIRED_SUITE_IDS must be a comma-separated list of suite ids",
        ))?;

        let static_dir = env::var("QD_STATIC_DIR").ok().map(PathBuf::from);

        let cors_origins = env_or("QD_CORS_ORIGINS", "")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let config = Config {
            environment,
            host,
            port,
            qase: QaseSettings {
                api_base,
                project_code,
                page_size,
                suite_batch_size,
            },
            root_suite: RootSuite::new(root_spec, root_name),
            required_suite_ids,
            static_dir,
            cors_origins,
        };

        if !environment.is_development() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate settings that are only acceptable during development.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !self.qase.api_base.starts_with("https://") {
            errors.push(format!(
                "QASE_API_BASE '{}' is not HTTPS. API tokens must not travel in cleartext.",
                self.qase.api_base
            ));
        }

        if self.host == defaults::DEV_HOST && self.static_dir.is_none() {
            errors.push(
                "QD_HOST is loopback-only and QD_STATIC_DIR is unset; the dashboard would be unreachable."
                    .to_string(),
            );
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse a comma-separated list of suite ids. Empty input is an empty list.
fn parse_id_list(raw: &str) -> Option<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().ok())
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
