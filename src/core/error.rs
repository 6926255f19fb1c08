//! Domain error taxonomy
//!
//! Every failure raised by the core carries one distinguishable kind.
//! Presentation layers map [`ErrorKind`] to whatever their transport needs
//! (HTTP status, exit code, ...).

use thiserror::Error;

/// Result alias used throughout the core
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the helpdesk core
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced entity id did not resolve
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Entity kind ("ticket", "rule", ...)
        entity: &'static str,
        /// The id that was looked up
        id: String,
    },

    /// Input violated a domain rule
    #[error("validation failed: {0}")]
    Validation(String),

    /// The acting user lacks permission for the mutation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Unique constraint violation or a lost optimistic-concurrency race
    #[error("conflict: {0}")]
    Conflict(String),

    /// Collaborator I/O failure
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Coarse error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Entity lookup failed
    NotFound,
    /// Domain rule violated
    Validation,
    /// Permission denied
    Forbidden,
    /// Duplicate or stale write
    Conflict,
    /// Collaborator failure
    Storage,
}

impl ErrorKind {
    /// Stable code string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::Storage => "STORAGE",
        }
    }

    /// Process exit code used by the CLI
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Validation => 2,
            Self::NotFound => 3,
            Self::Forbidden => 4,
            Self::Conflict => 5,
            Self::Storage => 1,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create a not-found error
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a forbidden error
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Create a conflict error
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// The category of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}
