use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const CONFIG_PATH_ENV: &str = "EVENTPLAN_CONFIG";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub temperature: Option<f32>,
    pub listen: SocketAddr,
    pub log_level: String,
    /// Seconds a session may sit idle before it is dropped.
    pub session_idle_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: eventplan_gemini::DEFAULT_MODEL.to_string(),
            endpoint: eventplan_gemini::DEFAULT_ENDPOINT.to_string(),
            temperature: None,
            listen: SocketAddr::from(([127, 0, 0, 1], 8501)),
            log_level: "info".to_string(),
            session_idle_secs: crate::session::DEFAULT_IDLE_TTL.as_secs(),
        }
    }
}

impl Config {
    /// Defaults, then the config file (explicit path or `EVENTPLAN_CONFIG`), then environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.trim().is_empty());
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => match env_path {
                Some(p) => Self::load_from_file(Path::new(&p))?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a `.toml` or `.json` file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents).map_err(|source| ConfigError::Toml { source })?
        } else {
            serde_json::from_str(&contents).map_err(|source| ConfigError::Json { source })?
        };
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Overlay values from an environment lookup. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(model) = get("EVENTPLAN_MODEL") {
            self.model = model;
        }
        if let Some(endpoint) = get("EVENTPLAN_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(level) = get("EVENTPLAN_LOG") {
            self.log_level = level;
        }
        if let Some(listen) = get("EVENTPLAN_LISTEN") {
            self.listen = listen.parse().map_err(|_| ConfigError::InvalidValue {
                field: "listen".to_string(),
                value: listen.clone(),
            })?;
        }
        if let Some(secs) = get("EVENTPLAN_SESSION_IDLE_SECS") {
            self.session_idle_secs =
                secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: "session_idle_secs".to_string(),
                    value: secs.clone(),
                })?;
        }
        Ok(())
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingField { field: API_KEY_ENV.to_string() })
    }
}
