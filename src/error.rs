//! Error types for proxyhelper
//!
//! Only store, configuration and client-construction failures reach callers
//! as [`Error`]. Source failures are [`FetchError`]s and are absorbed by the
//! aggregator; probe failures never become errors at all.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for proxyhelper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Hard failures surfaced to the caller
#[derive(Error, Debug)]
pub enum Error {
    /// The cache file could not be written or moved into place
    #[error("cache store error at {}: {source}", .path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache table could not be encoded
    #[error("cache encoding error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid or unreadable settings
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Log sink could not be opened
    #[error("logging setup error: {0}")]
    Logging(String),
}

impl Error {
    /// Create a store error for `path`
    pub fn store(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Store {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a logging error
    pub fn logging(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }
}

/// A single source could not deliver its candidate list
#[derive(Error, Debug)]
pub enum FetchError {
    /// Origin answered with a non-2xx status
    #[error("{provider} answered with status {status}")]
    Status {
        provider: String,
        status: reqwest::StatusCode,
    },

    /// Connection, TLS, timeout or body read failure
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    /// Origin answered but the document was not usable
    #[error("{provider} returned an unusable document: {message}")]
    Parse { provider: String, message: String },
}

impl FetchError {
    pub fn transport(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            provider: provider.into(),
            source,
        }
    }

    pub fn parse(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
