use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

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
    pub matcher: MatcherConfig,
    pub roster: RosterConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            matcher: MatcherConfig::from_env()?,
            roster: RosterConfig::from_env(),
        })
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for the eligibility matcher and its preview sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherConfig {
    /// Quiet period before a scheduled preview is computed.
    pub debounce: Duration,
    /// Upper bound on records returned by the eligibility query.
    pub result_cap: usize,
    pub include_vacancies: bool,
    /// Allow "contains"-style name resolution as a last resort. Off unless explicitly enabled.
    pub substring_fallback: bool,
    /// Base URL of a remote eligibility service; the local roster is used when unset.
    pub eligibility_url: Option<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1100),
            result_cap: 50,
            include_vacancies: true,
            substring_fallback: false,
            eligibility_url: None,
        }
    }
}

impl MatcherConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let debounce = match env::var("MATCHER_DEBOUNCE_MS") {
            Ok(raw) => Duration::from_millis(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidDebounce)?,
            ),
            Err(_) => defaults.debounce,
        };

        let result_cap = match env::var("MATCHER_RESULT_CAP") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(cap) if cap > 0 => cap,
                _ => return Err(ConfigError::InvalidResultCap),
            },
            Err(_) => defaults.result_cap,
        };

        let include_vacancies = flag_from_env("MATCHER_INCLUDE_VACANCIES", true)?;
        let substring_fallback = flag_from_env("MATCHER_SUBSTRING_FALLBACK", false)?;

        let eligibility_url = env::var("ELIGIBILITY_SERVICE_URL")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            debounce,
            result_cap,
            include_vacancies,
            substring_fallback,
            eligibility_url,
        })
    }
}

/// Where the roster snapshot is loaded from at startup.
#[derive(Debug, Clone, Default)]
pub struct RosterConfig {
    pub csv_path: Option<PathBuf>,
}

impl RosterConfig {
    fn from_env() -> Self {
        let csv_path = env::var("ROSTER_CSV")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        Self { csv_path }
    }
}

fn flag_from_env(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { name }),
        },
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDebounce,
    InvalidResultCap,
    InvalidFlag { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDebounce => {
                write!(f, "MATCHER_DEBOUNCE_MS must be a whole number of milliseconds")
            }
            ConfigError::InvalidResultCap => {
                write!(f, "MATCHER_RESULT_CAP must be a positive integer")
            }
            ConfigError::InvalidFlag { name } => {
                write!(f, "{name} must be one of true/false/yes/no/1/0")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
