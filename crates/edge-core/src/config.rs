//! Storefront configuration, layered from a TOML file and the environment.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variables that override file settings.
pub const ENV_STORE_DOMAIN: &str = "PUBLIC_STORE_DOMAIN";
pub const ENV_API_VERSION: &str = "PUBLIC_STOREFRONT_API_VERSION";
pub const ENV_ACCESS_TOKEN: &str = "PUBLIC_STOREFRONT_API_TOKEN";
pub const ENV_PORT: &str = "PORT";
pub const ENV_TIMEOUT_MS: &str = "STOREFRONT_TIMEOUT_MS";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Config file location, when not given on the command line.
pub const ENV_CONFIG_PATH: &str = "STOREFRONT_CONFIG";
/// Config file picked up from the working directory if present.
pub const DEFAULT_CONFIG_FILE: &str = "storefront.toml";

/// Errors while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format (for production/log aggregation).
    #[default]
    Json,
    /// Human-readable format (for development).
    Human,
}

/// Unknown log format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown log format '{0}' (expected 'json' or 'human')")]
pub struct ParseLogFormatError(String);

impl FromStr for LogFormat {
    type Err = ParseLogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "human" | "pretty" | "text" => Ok(Self::Human),
            other => Err(ParseLogFormatError(other.to_string())),
        }
    }
}

/// Storefront runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Shop domain, e.g. `my-shop.myshopify.com`.
    #[serde(default)]
    pub store_domain: String,

    /// Storefront API version segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Public storefront access token.
    #[serde(default)]
    pub public_access_token: String,

    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Total timeout for backend queries. Unset means no client-side timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,

    /// Log output format (`json`, or `human` and its aliases `pretty`/`text`).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_api_version() -> String {
    "2025-01".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            store_domain: String::new(),
            api_version: default_api_version(),
            public_access_token: String::new(),
            listen_addr: default_listen_addr(),
            request_timeout_ms: None,
            log_format: default_log_format(),
        }
    }
}

impl StorefrontConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Load config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&content, &display)
    }

    /// Resolve the config file and layer the environment on top.
    ///
    /// An explicit path wins over `STOREFRONT_CONFIG`, which wins over
    /// `./storefront.toml`. With none of them, built-in defaults are used.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from))
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.is_file().then_some(local)
            });

        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env()
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(domain) = lookup(ENV_STORE_DOMAIN) {
            self.store_domain = domain;
        }
        if let Some(version) = lookup(ENV_API_VERSION) {
            self.api_version = version;
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN) {
            self.public_access_token = token;
        }
        if let Some(port) = lookup(ENV_PORT) {
            let port: u16 = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_PORT,
                value: port.clone(),
            })?;
            let host = self
                .listen_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.listen_addr = format!("{}:{}", host, port);
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            let ms: u64 = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TIMEOUT_MS,
                value: timeout.clone(),
            })?;
            self.request_timeout_ms = Some(ms);
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log_format = format;
        }
        Ok(self)
    }

    /// Check that the settings needed to reach the backend are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_domain.trim().is_empty() {
            return Err(ConfigError::Missing("store_domain"));
        }
        self.log_format()?;
        Ok(())
    }

    /// Parsed log format.
    pub fn log_format(&self) -> Result<LogFormat, ConfigError> {
        self.log_format
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "log_format",
                value: self.log_format.clone(),
            })
    }

    /// GraphQL endpoint for the configured shop.
    pub fn graphql_endpoint(&self) -> String {
        let domain = self
            .store_domain
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        format!("https://{}/api/{}/graphql.json", domain, self.api_version)
    }

    /// Backend timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}
