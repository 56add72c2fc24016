use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{LiftLogError, Result};

pub const APP_DIR_NAME: &str = "liftlog";
pub const BACKEND_URL_ENV: &str = "LIFTLOG_BACKEND_URL";

/// Application settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend base URL; the REST API lives under `<backend_url>/api`.
    pub backend_url: String,
    pub request_timeout_secs: u64,
    /// Whether OS-level notifications may be shown.
    pub notifications_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 15,
            notifications_enabled: true,
        }
    }
}

impl AppConfig {
    /// Default location: `<config_dir>/liftlog/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
    }

    /// Load from `path`, falling back to defaults when the file is absent,
    /// then apply the `LIFTLOG_BACKEND_URL` override.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) if p.exists() => Self::from_file(p)?,
            Some(p) => {
                debug!("No config file at {:?}, using defaults", p);
                Self::default()
            }
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            config.apply_backend_override(&url);
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LiftLogError::Config(format!("Failed to read {:?}: {}", path, e)))?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| LiftLogError::Config(format!("Failed to parse {:?}: {}", path, e)))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Replace the backend URL unless the override is blank.
    pub fn apply_backend_override(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            debug!("Backend URL overridden: {}", url);
            self.backend_url = url.to_string();
        }
    }

    /// `<backend_url>/api`, with any trailing slash on the base ignored.
    pub fn api_root(&self) -> Result<Url> {
        let mut url = Url::parse(self.backend_url.trim()).map_err(|e| {
            LiftLogError::Config(format!("Invalid backend URL '{}': {}", self.backend_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                LiftLogError::Config(format!("Backend URL cannot be a base: {}", self.backend_url))
            })?
            .pop_if_empty()
            .push("api");
        Ok(url)
    }
}
