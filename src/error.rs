// src/error.rs
use std::{fmt, path::PathBuf, time::Duration};

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ProductLocator,
    LinkResolver,
    Download,
    HeaderLocator,
    TickerExtractor,
    Output,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ProductLocator => "product locator",
            Stage::LinkResolver => "download link resolver",
            Stage::Download => "holdings download",
            Stage::HeaderLocator => "header locator",
            Stage::TickerExtractor => "ticker extractor",
            Stage::Output => "output writer",
        };
        f.write_str(name)
    }
}

/// Coarse error classes, one exit code each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parse,
    Data,
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Network => 2,
            ErrorKind::Parse => 3,
            ErrorKind::Data => 4,
            ErrorKind::Io => 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{stage}: GET {url} timed out after {timeout:?}")]
    Timeout {
        stage: Stage,
        url: String,
        timeout: Duration,
    },

    #[error("{stage}: GET {url} failed: {source}")]
    Network {
        stage: Stage,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{stage}: GET {url} returned {status}")]
    Status {
        stage: Stage,
        url: String,
        status: StatusCode,
    },

    /// An expected element, row or column is missing; the upstream layout changed.
    #[error("{stage}: expected {expected} in {source_name}, found none")]
    Parse {
        stage: Stage,
        source_name: String,
        expected: String,
    },

    /// Nothing matched the slug or keyword we were resolving.
    #[error("{stage}: nothing matched {what} '{needle}' in {source_name}")]
    NotFound {
        stage: Stage,
        what: &'static str,
        needle: String,
        source_name: String,
    },

    #[error("{stage}: {action} {path}: {source}")]
    Io {
        stage: Stage,
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Timeout { .. } | Error::Network { .. } | Error::Status { .. } => {
                ErrorKind::Network
            }
            Error::Parse { .. } => ErrorKind::Parse,
            Error::NotFound { .. } => ErrorKind::Data,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Error::Timeout { stage, .. }
            | Error::Network { stage, .. }
            | Error::Status { stage, .. }
            | Error::Parse { stage, .. }
            | Error::NotFound { stage, .. }
            | Error::Io { stage, .. } => *stage,
        }
    }

    /// Classify a transport error, splitting timeouts out from other failures.
    pub(crate) fn from_reqwest(
        stage: Stage,
        url: &str,
        timeout: Duration,
        source: reqwest::Error,
    ) -> Self {
        if source.is_timeout() {
            Error::Timeout {
                stage,
                url: url.to_string(),
                timeout,
            }
        } else if let Some(status) = source.status() {
            Error::Status {
                stage,
                url: url.to_string(),
                status,
            }
        } else {
            Error::Network {
                stage,
                url: url.to_string(),
                source,
            }
        }
    }
}
