//! Client error types

use thiserror::Error;

/// Error type for commerce calls
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or timeout fault
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response did not have the expected shape
    #[error("protocol: {0}")]
    Protocol(String),

    /// The service refused to price the order
    ///
    /// Carries the corrective-action code the service returned, e.g.
    /// the code telling the caller which field to fix.
    #[error("pricing rejected, corrective action '{code}'")]
    PricingRejected { code: String },

    /// The service refused to place the order
    ///
    /// Carries the human-readable status-item text from the response.
    #[error("placement rejected: {detail}")]
    PlacementRejected { detail: String },
}

impl ClientError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

impl From<ClientError> for shared::Error {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport(e) => shared::Error::Transport(e.to_string()),
            ClientError::Protocol(detail) => shared::Error::Protocol(detail),
            ClientError::PricingRejected { code } => shared::Error::PricingRejected { code },
            ClientError::PlacementRejected { detail } => {
                shared::Error::PlacementRejected { detail }
            }
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
