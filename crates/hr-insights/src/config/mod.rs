use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_ATTRITION_URL: &str = "https://hr-analytics-attrition.onrender.com";
const DEFAULT_PERFORMANCE_URL: &str = "https://hr-analytics-performance-retention.onrender.com";
const DEFAULT_HISTORY_PATH: &str = "prediction_history.json";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub predictions: PredictionServiceConfig,
    pub history: HistoryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let attrition_url = service_url("HR_ATTRITION_URL", DEFAULT_ATTRITION_URL)?;
        let performance_url = service_url("HR_PERFORMANCE_URL", DEFAULT_PERFORMANCE_URL)?;
        let timeout_secs = env::var("HR_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let history_path = env::var("HR_HISTORY_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HISTORY_PATH.to_string());
        let rulebook_path = env::var("HR_RULEBOOK_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            predictions: PredictionServiceConfig {
                attrition_url,
                performance_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            history: HistoryConfig {
                path: PathBuf::from(history_path),
                rulebook_path,
            },
        })
    }
}

fn service_url(key: &'static str, default: &str) -> Result<String, ConfigError> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidServiceUrl { key, value: raw })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Base URLs of the remote prediction services. Performance and retention share a host.
#[derive(Debug, Clone)]
pub struct PredictionServiceConfig {
    pub attrition_url: String,
    pub performance_url: String,
    pub timeout: Duration,
}

/// Where prediction history and rule overrides live on disk.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub path: PathBuf,
    pub rulebook_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
    InvalidServiceUrl { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "HR_REQUEST_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidServiceUrl { key, value } => {
                write!(f, "{key} must be an http(s) URL, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidServiceUrl { .. } => None,
        }
    }
}
