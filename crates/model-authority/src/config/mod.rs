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
    pub scoring: ScoringConfig,
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

        let audit_timeout_secs = env::var("MAI_AUDIT_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_AUDIT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout)?;
        if audit_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let gateway_url = env::var("MAI_GATEWAY_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let data_dir = env::var("MAI_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let public_base_url = env::var("MAI_PUBLIC_BASE_URL")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_string());
        let require_api_token = env::var("MAI_API_TOKEN_REQUIRED")
            .map(|value| parse_flag(&value))
            .unwrap_or(false);

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                require_api_token,
            },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig {
                audit_timeout_secs,
                gateway_url,
                data_dir,
                public_base_url,
            },
        })
    }
}

pub const DEFAULT_AUDIT_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_PUBLIC_BASE_URL: &str = "https://somarush.com";

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub require_api_token: bool,
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

/// Collaborator endpoints and storage used by the scoring pipeline.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub audit_timeout_secs: u64,
    pub gateway_url: Option<String>,
    /// JSON-file history logs live here when set; in-memory logs otherwise.
    pub data_dir: Option<PathBuf>,
    pub public_base_url: String,
}

impl ScoringConfig {
    pub fn audit_timeout(&self) -> Duration {
        Duration::from_secs(self.audit_timeout_secs)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            audit_timeout_secs: DEFAULT_AUDIT_TIMEOUT_SECS,
            gateway_url: None,
            data_dir: None,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidTimeout,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidTimeout => {
                write!(f, "MAI_AUDIT_TIMEOUT_SECS must be a positive integer")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "MAI_AUDIT_TIMEOUT_SECS",
            "MAI_GATEWAY_URL",
            "MAI_DATA_DIR",
            "MAI_PUBLIC_BASE_URL",
            "MAI_API_TOKEN_REQUIRED",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert!(!config.server.require_api_token);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.scoring.audit_timeout(), Duration::from_secs(8));
        assert!(config.scoring.gateway_url.is_none());
        assert!(config.scoring.data_dir.is_none());
        assert_eq!(config.scoring.public_base_url, "https://somarush.com");
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn rejects_zero_audit_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MAI_AUDIT_TIMEOUT_SECS", "0");
        let err = AppConfig::load().expect_err("zero timeout rejected");
        assert!(matches!(err, ConfigError::InvalidTimeout));
        reset_env();
    }

    #[test]
    fn reads_scoring_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MAI_PUBLIC_BASE_URL", "https://badges.example.com/");
        env::set_var("MAI_API_TOKEN_REQUIRED", "yes");
        env::set_var("MAI_DATA_DIR", "/var/lib/mai");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.scoring.public_base_url, "https://badges.example.com");
        assert!(config.server.require_api_token);
        assert_eq!(config.scoring.data_dir, Some(PathBuf::from("/var/lib/mai")));
        reset_env();
    }
}
