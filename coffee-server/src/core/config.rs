use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::{JwtConfig, JwtError};

/// Which halves of the service this process runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// HTTP API and job processor
    All,
    /// HTTP API only; jobs are processed elsewhere
    Api,
    /// Job processor only
    Worker,
}

impl RunMode {
    pub fn runs_api(&self) -> bool {
        matches!(self, RunMode::All | RunMode::Api)
    }

    pub fn runs_worker(&self) -> bool {
        matches!(self, RunMode::All | RunMode::Worker)
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(RunMode::All),
            "api" => Ok(RunMode::Api),
            "worker" => Ok(RunMode::Worker),
            other => Err(format!("unknown RUN_MODE: {other}")),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::All => write!(f, "all"),
            RunMode::Api => write!(f, "api"),
            RunMode::Worker => write!(f, "worker"),
        }
    }
}

/// SMTP settings for the mail worker
#[derive(Debug, Clone, Default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// `From` address
    pub sender: String,
}

/// Job processor tuning
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub poll_interval: Duration,
    /// Max jobs executing at once
    pub concurrency: usize,
}

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default |
/// |----------|---------|
/// | HTTP_PORT | 3000 |
/// | ENVIRONMENT | development |
/// | DATABASE_URL | rocksdb://./data/coffee.db |
/// | DATABASE_NAMESPACE | coffee |
/// | DATABASE_NAME | shop |
/// | JWT_SECRET | random outside production, required in production |
/// | JWT_EXPIRATION_MINUTES | 1440 |
/// | JWT_ISSUER / JWT_AUDIENCE | coffee-server / coffee-clients |
/// | SMTP_HOST / SMTP_PORT | - / 587 |
/// | SMTP_USERNAME / SMTP_PASSWORD / SMTP_SENDER | - |
/// | S3_BUCKET_NAME | - |
/// | APP_URL | http://localhost:3000 |
/// | RUN_MODE | all |
/// | WORKER_POLL_INTERVAL_MS | 1000 |
/// | WORKER_CONCURRENCY | 10 |
/// | LOG_LEVEL / LOG_JSON / LOG_DIR | - / false / - |
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub database_url: String,
    pub database_namespace: String,
    pub database_name: String,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
    pub s3_bucket: String,
    /// Base URL of verification and reset links
    pub app_url: String,
    pub run_mode: RunMode,
    pub worker: WorkerConfig,
    pub log_level: Option<String>,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, JwtError> {
        let environment = env_or("ENVIRONMENT", "development");
        let jwt = JwtConfig::from_env(environment == "production")?;

        Ok(Self {
            http_port: env_parse("HTTP_PORT", 3000),
            database_url: env_or("DATABASE_URL", "rocksdb://./data/coffee.db"),
            database_namespace: env_or("DATABASE_NAMESPACE", "coffee"),
            database_name: env_or("DATABASE_NAME", "shop"),
            jwt,
            smtp: SmtpConfig {
                host: env_or("SMTP_HOST", ""),
                port: env_parse("SMTP_PORT", 587),
                username: env_or("SMTP_USERNAME", ""),
                password: env_or("SMTP_PASSWORD", ""),
                sender: env_or("SMTP_SENDER", ""),
            },
            s3_bucket: env_or("S3_BUCKET_NAME", ""),
            app_url: env_or("APP_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            run_mode: env_parse("RUN_MODE", RunMode::All),
            worker: WorkerConfig {
                poll_interval: Duration::from_millis(env_parse("WORKER_POLL_INTERVAL_MS", 1000)),
                concurrency: env_parse("WORKER_CONCURRENCY", 10usize).max(1),
            },
            log_level: std::env::var("LOG_LEVEL").ok(),
            log_json: env_parse("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok(),
            environment,
        })
    }

    /// In-memory database and fixed JWT settings
    ///
    /// Used by tests.
    pub fn with_overrides(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            http_port: 0,
            environment: "test".to_string(),
            database_url: database_url.into(),
            database_namespace: "coffee".to_string(),
            database_name: "test".to_string(),
            jwt: JwtConfig {
                secret: jwt_secret.into(),
                expiration_minutes: 60,
                issuer: "coffee-server".to_string(),
                audience: "coffee-clients".to_string(),
            },
            smtp: SmtpConfig::default(),
            s3_bucket: "coffee-test".to_string(),
            app_url: "http://localhost:3000".to_string(),
            run_mode: RunMode::Api,
            worker: WorkerConfig {
                poll_interval: Duration::from_millis(50),
                concurrency: 4,
            },
            log_level: None,
            log_json: false,
            log_dir: None,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
