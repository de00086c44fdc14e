use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WiltError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error at {path}: {message}")]
    Storage { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, WiltError>;
