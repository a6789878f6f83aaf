//! Error types for the double-slit engine

use std::path::PathBuf;
use thiserror::Error;

/// Reasons an engine entry point declined to act.
///
/// None of these are fatal: the engine state is untouched and the call can be
/// retried once the precondition holds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No drawing surface is attached.
    #[error("no drawing surface attached")]
    NoSurface,
}

/// Errors raised while loading or validating a [`SceneConfig`](crate::config::SceneConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
