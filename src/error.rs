use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the seed and trigger handlers and the clients beneath them
#[derive(Debug, Error)]
pub enum Error {
    /// The managed identity endpoint could not supply a token
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The input data file is missing, unreadable or not a JSON array
    #[error("could not load data file {path:?}: {reason}")]
    File { path: PathBuf, reason: String },

    /// The document database was unreachable or rejected a request
    #[error("{message} ({written} item(s) written before the failure)")]
    Connection { message: String, written: usize },

    /// The trigger request never produced an HTTP response
    #[error("network failure calling {url}")]
    UnclassifiedNetworkFault {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A command-line value failed validation
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub(crate) fn file(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::File {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn connection(message: impl Into<String>) -> Self {
        Error::Connection {
            message: message.into(),
            written: 0,
        }
    }

    /// Record how many items were confirmed before a connection failure
    pub(crate) fn with_written(self, written: usize) -> Self {
        match self {
            Error::Connection { message, .. } => Error::Connection { message, written },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
