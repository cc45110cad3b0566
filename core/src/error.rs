use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{profiles::ProfileId, validate::ValidationError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Connection '{0}' does not exist.")]
    NotFound(ProfileId),

    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Unknown database type '{0}'.")]
    UnknownType(String),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("Failed to install {package}: {message}")]
    PartialFailure {
        package: String,
        message: String,
        /// Packages that were not attempted after the failure.
        skipped: Vec<String>,
    },

    #[error("Invalid catalog data in {origin}: {reason}")]
    Catalog { origin: String, reason: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn catalog(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::Catalog {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure of a live connection attempt. `detail` is the driver's message,
/// untouched; `user_message` is a short summary of what went wrong.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{user_message} ({detail})")]
pub struct ConnectionError {
    pub user_message: String,
    pub detail: String,
}

impl ConnectionError {
    pub fn new(user_message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            detail: detail.into(),
        }
    }
}
