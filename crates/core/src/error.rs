//! Storefront domain error model.

use thiserror::Error;

/// Result alias used throughout the domain crates.
pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic business failure.
///
/// Only outcomes the domain itself can decide live here; storage and
/// transport failures are modeled by the layers that own them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or unacceptable input (empty order, zero quantity, bad rating).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A state change would break an entity invariant.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An order status change the state machine does not allow.
    #[error("invalid status transition: {0}")]
    InvalidTransition(String),

    /// An id string that does not parse as a UUID.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The referenced product, order, user or coupon does not exist.
    #[error("not found")]
    NotFound,

    /// Uniqueness conflict (duplicate coupon code, duplicate reviewer).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller may not act on this resource (ownership or role).
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
