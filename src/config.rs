use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub mod catalog;

pub use catalog::{FormCatalog, Role, RoleCatalog, ToastMessages, ValidationMessages};

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value `{value}`")]
    InvalidVar { name: &'static str, value: String },
    #[error("failed to read catalog file {path}: {source}")]
    ReadCatalog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file {path}: {source}")]
    ParseCatalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("the role catalog must contain at least one role")]
    EmptyRoles,
}

/// Process-wide settings, read from the environment (and `.env`) at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the users API, without the `/api/users` suffix.
    pub api_base_url: String,
    /// Whole-request timeout for the HTTP client. `None` keeps the client default.
    pub http_timeout: Option<Duration>,
    /// Optional JSON file overriding the role and message catalogs.
    pub catalog_path: Option<PathBuf>,
    /// Bind host for the stub server.
    pub host: String,
    /// Bind port for the stub server.
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout: None,
            catalog_path: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let http_timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                    name: "HTTP_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let port = match lookup("APP_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: "APP_PORT",
                value: raw.clone(),
            })?,
            None => defaults.port,
        };

        Ok(Self {
            api_base_url: lookup("API_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base_url),
            http_timeout,
            catalog_path: lookup("FORM_CATALOG_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            host: lookup("APP_HOST").unwrap_or(defaults.host),
            port,
        })
    }

    /// Load the form catalog, applying the override file when one is configured.
    pub fn load_catalog(&self) -> Result<FormCatalog, ConfigError> {
        let Some(path) = &self.catalog_path else {
            return Ok(FormCatalog::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadCatalog {
            path: path.clone(),
            source,
        })?;
        let catalog =
            FormCatalog::from_json_str(&raw).map_err(|source| ConfigError::ParseCatalog {
                path: path.clone(),
                source,
            })?;
        tracing::info!(
            path = %path.display(),
            roles = catalog.roles.iter().count(),
            "Loaded form catalog"
        );
        Ok(catalog)
    }

    pub fn users_url(&self) -> String {
        format!("{}/api/users", self.api_base_url)
    }
}
