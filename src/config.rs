//! Configuration for the Artifactory lookup.
//!
//! Mirrors the application config tree the lookup reads:
//!
//! ```toml
//! [jfrog.artifactory]
//! url = "https://acme.jfrog.io"
//! proxy_path = "/artifactory-proxy/"
//!
//! [backend]
//! base_url = "http://localhost:7007"
//! ```
//!
//! The camelCase spellings `proxyPath` and `baseUrl` are accepted too. The
//! configuration is passed explicitly to whoever needs it; there is no global
//! instance.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Proxy mount point used when `jfrog.artifactory.proxy_path` is unset
pub const DEFAULT_PROXY_PATH: &str = "/artifactory-proxy/";

pub const ENV_ARTIFACTORY_URL: &str = "LIBVER_ARTIFACTORY_URL";
pub const ENV_BACKEND_BASE_URL: &str = "LIBVER_BACKEND_BASE_URL";
pub const ENV_PROXY_PATH: &str = "LIBVER_PROXY_PATH";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Required configuration key is absent or empty
    #[error("Missing required configuration value: {key}")]
    Missing { key: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub jfrog: JfrogConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JfrogConfig {
    pub artifactory: ArtifactoryConfig,
}

/// `jfrog.artifactory`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactoryConfig {
    /// Public Artifactory URL, used for browse links
    pub url: Option<String>,
    /// Mount point of the Artifactory proxy on the backend
    #[serde(alias = "proxyPath")]
    pub proxy_path: Option<String>,
}

/// `backend`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    #[serde(alias = "baseUrl")]
    pub base_url: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse configuration handed over as JSON, e.g. by an embedding
    /// application. `null` yields the defaults.
    pub fn from_json(value: Option<serde_json::Value>) -> Result<Self, ConfigError> {
        match value {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Self::default()),
        }
    }

    /// Read a TOML file and apply environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Overlay `LIBVER_*` environment variables; empty values are ignored
    pub fn apply_env_overrides(&mut self) {
        let read = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());

        if let Some(url) = read(ENV_ARTIFACTORY_URL) {
            self.jfrog.artifactory.url = Some(url);
        }
        if let Some(base_url) = read(ENV_BACKEND_BASE_URL) {
            self.backend.base_url = Some(base_url);
        }
        if let Some(proxy_path) = read(ENV_PROXY_PATH) {
            self.jfrog.artifactory.proxy_path = Some(proxy_path);
        }
    }

    /// Check that the keys needed for a lookup are present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if non_empty(self.backend.base_url.as_ref()).is_none() {
            return Err(ConfigError::Missing {
                key: "backend.baseUrl",
            });
        }
        if non_empty(self.jfrog.artifactory.url.as_ref()).is_none() {
            return Err(ConfigError::Missing {
                key: "jfrog.artifactory.url",
            });
        }
        Ok(())
    }

    pub fn proxy_path(&self) -> &str {
        non_empty(self.jfrog.artifactory.proxy_path.as_ref()).unwrap_or(DEFAULT_PROXY_PATH)
    }

    /// `{backend.baseUrl}/api/proxy{proxyPath}`, the root every Artifactory
    /// call goes through
    pub fn proxy_base_url(&self) -> Result<String, ConfigError> {
        let base_url = non_empty(self.backend.base_url.as_ref()).ok_or(ConfigError::Missing {
            key: "backend.baseUrl",
        })?;
        let proxy_path = self.proxy_path();
        let separator = if proxy_path.starts_with('/') { "" } else { "/" };
        Ok(format!(
            "{}/api/proxy{separator}{proxy_path}",
            base_url.trim_end_matches('/')
        ))
    }

    pub fn artifactory_url(&self) -> Result<&str, ConfigError> {
        non_empty(self.jfrog.artifactory.url.as_ref()).ok_or(ConfigError::Missing {
            key: "jfrog.artifactory.url",
        })
    }
}
