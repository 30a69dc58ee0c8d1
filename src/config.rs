//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the ticketing backend (e.g., "https://desk.example.com/api")
    pub base_url: String,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Request timeout in seconds; unset leaves the transport default
    pub timeout_seconds: Option<u64>,
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// File holding the access token between runs
    pub token_path: PathBuf,
}

/// Dashboard defaults used by the binary
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Initial filter: "all", "active" or "resolved"
    pub default_filter: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub fn filter_directive(&self) -> String {
        format!("maintenance_desk={}", self.level.trim().to_ascii_lowercase())
    }

    pub fn is_json(&self) -> bool {
        self.format.trim().eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (MAINTENANCE_DESK__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Environment, File};

        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("MAINTENANCE_DESK")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, crate::error::AppError> {
        Ok(config::Config::builder()
            .set_default("api.base_url", "http://127.0.0.1:3000")?
            .set_default("api.user_agent", "MaintenanceDesk/0.1.0")?
            .set_default("session.token_path", ".maintenance-desk/access_token")?
            .set_default("dashboard.default_filter", "all")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, crate::error::AppError> {
        let config = builder
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        let base = url::Url::parse(self.api.base_url.trim()).map_err(|e| {
            crate::error::AppError::Config(format!("api.base_url is not a valid URL: {}", e))
        })?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(crate::error::AppError::Config(format!(
                "api.base_url must use http or https, got {}",
                base.scheme()
            )));
        }

        if base.scheme() == "http" && !is_local_host(&base) {
            tracing::warn!(
                base_url = %self.api.base_url,
                "Access tokens will be sent over plain http"
            );
        }

        if self
            .dashboard
            .default_filter
            .parse::<crate::service::TicketFilter>()
            .is_err()
        {
            return Err(crate::error::AppError::Config(format!(
                "dashboard.default_filter must be all, active or resolved, got {}",
                self.dashboard.default_filter
            )));
        }

        if !matches!(
            self.logging.format.trim().to_ascii_lowercase().as_str(),
            "pretty" | "json"
        ) {
            return Err(crate::error::AppError::Config(format!(
                "logging.format must be pretty or json, got {}",
                self.logging.format
            )));
        }

        if self.api.timeout_seconds == Some(0) {
            return Err(crate::error::AppError::Config(
                "api.timeout_seconds must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_local_host(url: &url::Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(host)) => host == "localhost" || host.ends_with(".localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback() || ip.is_unspecified(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback() || ip.is_unspecified(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            api: ApiConfig {
                base_url: "http://127.0.0.1:3000".to_string(),
                user_agent: "MaintenanceDesk/test".to_string(),
                timeout_seconds: None,
            },
            session: SessionConfig {
                token_path: PathBuf::from("/tmp/maintenance-desk-test/token"),
            },
            dashboard: DashboardConfig {
                default_filter: "all".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_local_http() {
        let config = valid_config();
        assert!(config.validate().is_ok());
        assert!(config.api.timeout().is_none());
    }

    #[test]
    fn validate_rejects_unparsable_base_url() {
        let mut config = valid_config();
        config.api.base_url = "not a url".to_string();

        let error = config.validate().expect_err("garbage base url must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message) if message.contains("api.base_url")
        ));
    }

    #[test]
    fn validate_rejects_non_http_scheme() {
        let mut config = valid_config();
        config.api.base_url = "ftp://desk.example.com".to_string();

        let error = config.validate().expect_err("ftp must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message) if message.contains("http or https")
        ));
    }

    #[test]
    fn validate_rejects_unknown_filter() {
        let mut config = valid_config();
        config.dashboard.default_filter = "urgent".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = valid_config();
        config.api.timeout_seconds = Some(0);
        assert!(config.validate().is_err());

        config.api.timeout_seconds = Some(15);
        assert!(config.validate().is_ok());
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn logging_section_is_read_from_config_files() {
        use config::{File, FileFormat};

        let builder = AppConfig::defaults().unwrap().add_source(File::from_str(
            "[logging]\nlevel = \"DEBUG\"\nformat = \"json\"\n",
            FileFormat::Toml,
        ));
        let config = AppConfig::from_builder(builder).unwrap();

        assert!(config.logging.is_json());
        assert_eq!(config.logging.filter_directive(), "maintenance_desk=debug");
        assert_eq!(config.dashboard.default_filter, "all");
    }

    #[test]
    fn validate_rejects_unknown_log_format() {
        let mut config = valid_config();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
        assert!(!config.logging.is_json());
    }
}
