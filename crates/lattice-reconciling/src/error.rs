//! Error types for workload defaulting
//!
//! Defaulting itself cannot fail for well-formed input. Errors come from
//! loading a [`DefaultingPolicy`](crate::DefaultingPolicy) or from field
//! combinations the platform would refuse to persist.
//!
//! Errors returned by a wrapped reconciler never pass through this type: they
//! are handed back to the caller exactly as the reconciler produced them.

use thiserror::Error;

/// Errors raised by the defaulting layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefaultingError {
    /// A field combination the API server would reject
    #[error("defaulting rejected for {field}: {message}")]
    Rejected {
        /// Path of the offending field (e.g., "seccompProfile.localhostProfile")
        field: String,
        /// Description of what's unsupported
        message: String,
    },

    /// A policy document could not be parsed
    #[error("invalid defaulting policy: {message}")]
    InvalidPolicy {
        /// Description of what failed
        message: String,
    },
}

impl DefaultingError {
    /// Create a rejection for the given field
    pub fn rejected(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Rejected {
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a policy parse error with the given message
    pub fn invalid_policy(msg: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            message: msg.into(),
        }
    }

    /// Whether this error is a rejection of a field combination
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
