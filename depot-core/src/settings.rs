use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ClientError;
use crate::http::{HttpClient, DEFAULT_API_PREFIX};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;

pub const DEFAULT_SERVER: &str = "http://localhost:8080";

#[derive(Debug, Deserialize, Clone)]
pub struct ClientSettings {
    pub server: String,
    pub api_prefix: String,
    pub items_per_page: usize,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Where the credential and the optional config file live
    #[serde(default)]
    pub config_dir: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            server: DEFAULT_SERVER.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            request_timeout_secs: None,
            config_dir: None,
        }
    }
}

impl ClientSettings {
    pub fn get_environment() -> Environment {
        Environment::default()
            .prefix("DEPOT")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    /// Defaults, then `config.{toml,yaml}` in the config directory (or
    /// `config_file` when given), then `DEPOT__*` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server", DEFAULT_SERVER)?
            .set_default("api_prefix", DEFAULT_API_PREFIX)?
            .set_default("items_per_page", DEFAULT_ITEMS_PER_PAGE as u64)?;

        match config_file {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Ok(dir) = default_config_dir() {
                    builder = builder.add_source(File::from(dir.join("config")).required(false));
                }
            }
        }

        builder
            .add_source(Self::get_environment())
            .build()?
            .try_deserialize()
    }

    /// Reject settings that cannot produce a working client
    pub fn validate(&self) -> Result<(), ClientError> {
        url::Url::parse(&self.server).map_err(|e| {
            ClientError::validation(format!("Invalid server URL {}: {}", self.server, e))
        })?;
        if self.items_per_page == 0 {
            return Err(ClientError::validation(
                "items_per_page must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn config_dir(&self) -> Result<PathBuf, ClientError> {
        match &self.config_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_config_dir(),
        }
    }

    pub fn http_client(&self) -> Result<HttpClient, ClientError> {
        self.validate()?;
        HttpClient::builder(&self.server)
            .with_api_prefix(&self.api_prefix)
            .with_timeout(self.request_timeout())
            .build()
    }
}

/// `~/.config/depotctl`, independent of platform conventions
pub fn default_config_dir() -> Result<PathBuf, ClientError> {
    let home_dir = std::env::var("HOME").map_err(|_| {
        ClientError::Storage(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "HOME is not set",
        ))
    })?;
    Ok(PathBuf::from(home_dir).join(".config").join("depotctl"))
}
