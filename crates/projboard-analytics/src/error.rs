//! Error types for projboard analytics

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] projboard_core::Error),

    #[error("Analytics task failed: {0}")]
    TaskFailed(String),

    #[error("Analytics timed out after {0:?}")]
    Timeout(Duration),

    #[error("Every health probe failed: {}", .0.join("; "))]
    ProbesFailed(Vec<String>),
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::TaskFailed(err.to_string())
    }
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Core(e) if e.is_not_found())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}
