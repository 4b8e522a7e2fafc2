use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::underwriting::{MiningConfig, DEFAULT_APPROVAL_THRESHOLD};

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
    pub underwriting: UnderwritingConfig,
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

        let approval_threshold = match env::var("APP_APPROVAL_THRESHOLD") {
            Ok(raw) => {
                let parsed = raw.trim().parse::<f64>().ok();
                parsed
                    .filter(|value| value.is_finite())
                    .ok_or(ConfigError::InvalidApprovalThreshold { value: raw })?
            }
            Err(_) => DEFAULT_APPROVAL_THRESHOLD,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            underwriting: UnderwritingConfig { approval_threshold },
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Defaults applied to mined candidate profiles.
#[derive(Debug, Clone)]
pub struct UnderwritingConfig {
    pub approval_threshold: f64,
}

impl UnderwritingConfig {
    /// Overrides the loaded threshold. Non-finite values are rejected as they are for
    /// `APP_APPROVAL_THRESHOLD`.
    pub fn set_approval_threshold(&mut self, value: f64) -> Result<(), ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::InvalidApprovalThreshold {
                value: value.to_string(),
            });
        }
        self.approval_threshold = value;
        Ok(())
    }

    pub fn mining_config(&self) -> MiningConfig {
        MiningConfig {
            approval_threshold: self.approval_threshold,
            ..MiningConfig::default()
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidApprovalThreshold { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidApprovalThreshold { value } => {
                write!(f, "approval threshold must be a finite number (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidApprovalThreshold { .. } => None,
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
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_APPROVAL_THRESHOLD");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.underwriting.approval_threshold, 50.0);
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
    fn approval_threshold_reads_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_APPROVAL_THRESHOLD", " 65.5 ");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.underwriting.approval_threshold, 65.5);
        assert_eq!(config.underwriting.mining_config().approval_threshold, 65.5);
        reset_env();
    }

    #[test]
    fn rejects_non_finite_approval_threshold() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_APPROVAL_THRESHOLD", "NaN");
        let err = AppConfig::load().expect_err("NaN threshold rejected");
        assert!(matches!(err, ConfigError::InvalidApprovalThreshold { .. }));
        reset_env();
    }

    #[test]
    fn threshold_override_must_be_finite() {
        let mut underwriting = UnderwritingConfig {
            approval_threshold: DEFAULT_APPROVAL_THRESHOLD,
        };

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = underwriting
                .set_approval_threshold(value)
                .expect_err("non-finite threshold rejected");
            assert!(matches!(err, ConfigError::InvalidApprovalThreshold { .. }));
        }
        assert_eq!(underwriting.approval_threshold, DEFAULT_APPROVAL_THRESHOLD);

        underwriting.set_approval_threshold(35.0).expect("finite threshold");
        assert_eq!(underwriting.approval_threshold, 35.0);
    }

    #[test]
    fn rejects_invalid_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PORT", "eighty");
        let err = AppConfig::load().expect_err("port must parse");
        assert_eq!(err.to_string(), "APP_PORT must be a valid u16");
        reset_env();
    }
}
