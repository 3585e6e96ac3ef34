//! Controller error taxonomy
//!
//! Every failure a reconciliation pass can hit maps to exactly one of
//! these variants, and the engine's retry policy keys off the variant:
//! transport and protocol faults are retried with backoff, explicit
//! service rejections are surfaced and wait for the caller, and
//! `NotFound` means the resource was deleted and the key is dropped.

use thiserror::Error;

/// Error type shared by the reconcilers and the collaborator stores
#[derive(Debug, Error)]
pub enum Error {
    /// Resource does not exist (deleted between enqueue and fetch)
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// Create collided with an existing resource
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    /// Optimistic-concurrency collision on a status update
    #[error("{kind} '{name}' version conflict")]
    Conflict { kind: &'static str, name: String },

    /// Network or timeout fault talking to the commerce service
    #[error("transport: {0}")]
    Transport(String),

    /// Response arrived but did not have the expected shape
    #[error("protocol: {0}")]
    Protocol(String),

    /// The commerce service refused to price the order
    #[error("pricing rejected, corrective action '{code}'")]
    PricingRejected { code: String },

    /// The commerce service refused to place the order
    #[error("placement rejected: {detail}")]
    PlacementRejected { detail: String },

    /// Required configuration or secret material is missing or invalid
    #[error("configuration: {0}")]
    Configuration(String),
}

impl Error {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    pub fn conflict(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            name: name.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this is the benign "resource vanished" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the engine may retry this failure with backoff
    ///
    /// Explicit rejections are excluded: retrying them without a spec
    /// change would just repeat the same refused request.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Protocol(_) | Self::Conflict { .. }
        )
    }
}

/// Result alias used across the controller
pub type Result<T> = std::result::Result<T, Error>;
