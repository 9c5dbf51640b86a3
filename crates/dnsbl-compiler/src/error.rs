//! Error types for the dnsbl compiler.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors loading the source catalog. These are fatal for a run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read source config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse source config {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse source config {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("source config {path:?} defines no sources")]
    Empty { path: PathBuf },

    #[error("source name cannot be empty")]
    EmptySourceName,
}

/// Errors reading a raw feed or intermediate file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors writing an output artifact.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize rule set for {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
