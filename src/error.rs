//! @acp:module "Errors"
//! @acp:summary "Crate error type and result alias"
//! @acp:domain core
//! @acp:layer model

use std::path::PathBuf;

use thiserror::Error;

/// @acp:summary "Errors surfaced by the comment craft library"
#[derive(Debug, Error)]
pub enum CraftError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A tag or user-supplied search pattern failed to compile
    #[error("Invalid pattern for {tag}: {source}")]
    InvalidPattern {
        tag: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(#[from] glob::PatternError),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("Watch error on {path}: {message}")]
    Watch { path: PathBuf, message: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CraftError>;
