// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A single error type for the whole domain layer, built on `thiserror`. Every
//! variant also maps onto the error taxonomy the retry orchestrator needs
//! (transient / permanent / rate-limited / cancelled / lease-lost) so that
//! classification lives next to the error definitions instead of being
//! re-derived ad hoc at every call site.
//!
//! ## Error categories
//!
//! - **Transient**: network timeouts, database deadlocks, leased-resource
//!   contention - safe to retry with backoff.
//! - **Permanent**: validation failures, constraint violations, missing
//!   required inputs - retrying will not help.
//! - **RateLimited**: upstream quota/429 signals - retry, but never sooner
//!   than the floor delay.
//! - **Cancelled**: explicit cancellation or deadline exceeded.
//! - **LeaseLost**: a stage's lease could not be extended in time; treated as
//!   transient for retry purposes but reported distinctly for diagnostics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur anywhere in the domain layer.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("missing required input: {0}")]
    MissingInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("network timeout: {0}")]
    NetworkTimeout(String),

    #[error("upstream error: {0}")]
    UpstreamError(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database deadlock or serialization failure: {0}")]
    DatabaseContention(String),

    #[error("resource temporarily unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("operation cancelled: {0}")]
    Cancelled(String),

    #[error("lease lost: {0}")]
    LeaseLost(String),

    #[error("stage already in progress: {0}")]
    AlreadyInProgress(String),

    #[error("authentication failure: {0}")]
    AuthenticationFailure(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

/// The retry orchestrator's error taxonomy (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transient,
    Permanent,
    RateLimited,
    Cancelled,
    LeaseLost,
    Unknown,
}

impl DomainError {
    /// Classifies this error for the retry orchestrator.
    ///
    /// This is the single source of truth for transient/permanent
    /// classification - `RetryOrchestrator::decide` never re-derives it.
    pub fn classify(&self) -> ErrorKind {
        match self {
            DomainError::NetworkTimeout(_)
            | DomainError::UpstreamError(_)
            | DomainError::DatabaseContention(_)
            | DomainError::ResourceUnavailable(_) => ErrorKind::Transient,

            DomainError::RateLimited(_) => ErrorKind::RateLimited,

            DomainError::Cancelled(_) => ErrorKind::Cancelled,

            DomainError::LeaseLost(_) => ErrorKind::LeaseLost,

            DomainError::InvalidConfiguration(_)
            | DomainError::ValidationFailed(_)
            | DomainError::ConstraintViolation(_)
            | DomainError::MissingInput(_)
            | DomainError::NotFound(_)
            | DomainError::AlreadyExists(_)
            | DomainError::AuthenticationFailure(_)
            | DomainError::AlreadyInProgress(_)
            | DomainError::SerializationError(_) => ErrorKind::Permanent,

            DomainError::DatabaseError(_) | DomainError::InternalError(_) => ErrorKind::Unknown,
        }
    }

    /// Whether the retry orchestrator should ever schedule a retry for this
    /// error. `Unknown` is retried like `Transient` per §4.C step 2.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.classify(), ErrorKind::Permanent | ErrorKind::Cancelled)
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert_eq!(DomainError::NetworkTimeout("x".into()).classify(), ErrorKind::Transient);
        assert!(DomainError::NetworkTimeout("x".into()).is_retryable());
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert_eq!(
            DomainError::ValidationFailed("x".into()).classify(),
            ErrorKind::Permanent
        );
        assert!(!DomainError::ValidationFailed("x".into()).is_retryable());
    }

    #[test]
    fn cancelled_is_not_retryable() {
        assert!(!DomainError::Cancelled("deadline".into()).is_retryable());
    }

    #[test]
    fn lease_lost_is_retryable() {
        assert!(DomainError::LeaseLost("x".into()).is_retryable());
        assert_eq!(DomainError::LeaseLost("x".into()).classify(), ErrorKind::LeaseLost);
    }
}
