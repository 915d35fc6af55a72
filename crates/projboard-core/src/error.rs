//! Error types for projboard

use std::fmt;
use thiserror::Error;

/// The kind of entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Project,
    Milestone,
    Ticket,
    BugReport,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::User => write!(f, "user"),
            EntityKind::Project => write!(f, "project"),
            EntityKind::Milestone => write!(f, "milestone"),
            EntityKind::Ticket => write!(f, "ticket"),
            EntityKind::BugReport => write!(f, "bug report"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Cannot move {entity} from {from} to {to}: {reason}")]
    InvalidTransition {
        entity: EntityKind,
        from: String,
        to: String,
        reason: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Store lock poisoned: {0}")]
    StorePoisoned(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Toml(String),
}

impl Error {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Error::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_))
    }

    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Error::InvalidTransition { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}
