//! Error types for task gateway operations.

use std::fmt;

use thiserror::Error;

/// The four remote operations the task service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GatewayOp {
    /// `POST /addTask`
    Add,
    /// `GET /listTasks`
    List,
    /// `PUT /updateTask/{id}`
    Update,
    /// `DELETE /deleteTask`
    Delete,
}

impl GatewayOp {
    /// Lowercase operation name used in messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::List => "list",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for GatewayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while talking to the task service.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configured base URL is unusable.
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Raw value that failed validation.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Request could not be sent or its body could not be read.
    #[error("{operation} request failed: {source}")]
    Transport {
        /// Operation being performed.
        operation: GatewayOp,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// Service answered with a non-2xx status.
    #[error("{operation} rejected with status {status}: {message}")]
    Status {
        /// Operation being performed.
        operation: GatewayOp,
        /// HTTP status code.
        status: u16,
        /// Error text reported by the service.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("Failed to decode {operation} response: {source}")]
    Decode {
        /// Operation being performed.
        operation: GatewayOp,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Operation is switched off (used by the in-memory gateway).
    #[error("{operation} is unavailable: {reason}")]
    Unavailable {
        /// Operation being performed.
        operation: GatewayOp,
        /// Why the operation failed.
        reason: String,
    },

    /// Failed to acquire the gateway's internal lock.
    #[error("Gateway lock error")]
    LockError,
}

impl GatewayError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Operation that failed, if known.
    #[must_use]
    pub const fn operation(&self) -> Option<GatewayOp> {
        match self {
            Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Decode { operation, .. }
            | Self::Unavailable { operation, .. } => Some(*operation),
            Self::InvalidBaseUrl { .. } | Self::LockError => None,
        }
    }
}
