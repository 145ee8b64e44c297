use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown cycle '{0}'")]
    UnknownCycle(String),
    #[error("unknown data category '{0}'")]
    UnknownCategory(String),
}

/// Failures raised by catalog and file collaborators.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level failure (connection, timeout, TLS).
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// The remote answered with a non-success status.
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Local file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The resource does not exist.
    #[error("resource not found: {origin}")]
    NotFound { origin: String },

    /// A catalog payload could not be turned into a table.
    #[error("failed to parse {origin}: {message}")]
    Parse { origin: String, message: String },

    /// A data file payload could not be decoded.
    #[error("failed to decode {origin}: {message}")]
    Decode { origin: String, message: String },
}

impl SourceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub fn decode(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            origin: origin.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
