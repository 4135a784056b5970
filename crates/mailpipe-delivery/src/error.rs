//! Error types for outbound send operations.
//!
//! Classifies provider failures into permanent conditions, which the
//! dispatcher swallows because a retry cannot change the outcome, and
//! transient conditions, which propagate so the upstream queue redelivers
//! the batch.

use thiserror::Error;

/// Result type alias for send operations.
pub type Result<T> = std::result::Result<T, SendError>;

/// Error raised by a send attempt.
#[derive(Debug, Clone, Error)]
pub enum SendError {
    /// The provider rejected the message outright.
    #[error("message rejected: {message}")]
    Rejected {
        /// Provider rejection message
        message: String,
    },

    /// The sending domain has not been verified with the provider.
    #[error("sending domain not verified: {message}")]
    DomainNotVerified {
        /// Provider error message
        message: String,
    },

    /// The send request could not be constructed from its inputs.
    #[error("invalid send request: {message}")]
    InvalidRequest {
        /// What was wrong with the request
        message: String,
    },

    /// Network-level failure reaching the provider.
    #[error("network error: {message}")]
    Network {
        /// Error message describing the network failure
        message: String,
    },

    /// The provider call timed out.
    #[error("request timed out: {message}")]
    Timeout {
        /// Error message describing the timeout
        message: String,
    },

    /// Any other provider-side failure, including throttling.
    #[error("provider error: {message}")]
    Provider {
        /// Provider error message
        message: String,
    },
}

impl SendError {
    /// Creates a rejected-message error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected { message: message.into() }
    }

    /// Creates an unverified-domain error.
    pub fn domain_not_verified(message: impl Into<String>) -> Self {
        Self::DomainNotVerified { message: message.into() }
    }

    /// Creates an invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout { message: message.into() }
    }

    /// Creates a generic provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider { message: message.into() }
    }

    /// Determines whether this failure is permanent.
    ///
    /// Permanent failures (rejected message, unverified domain, requests
    /// that cannot be built) produce the same outcome on every retry, so the
    /// dispatcher drops the item instead of failing the batch. Everything
    /// else is treated as transient and propagated for redelivery.
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::Rejected { .. } | Self::DomainNotVerified { .. } | Self::InvalidRequest { .. } => {
                true
            },
            Self::Network { .. } | Self::Timeout { .. } | Self::Provider { .. } => false,
        }
    }
}
