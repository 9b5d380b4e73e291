use thiserror::Error;

use crate::client::GenerationError;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session not found: {id}")]
    SessionNotFound { id: String },

    #[error("Invalid session id: {id}")]
    InvalidSessionId { id: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {field}")]
    MissingField { field: String },

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON config: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML config: {source}")]
    Toml {
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, PlannerError>;
