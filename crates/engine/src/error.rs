//! The module contains the errors the engine can raise.
//!
//! Every operation reports failures to the immediate caller; nothing is
//! retried or swallowed here. Store failures are wrapped unchanged.
use thiserror::Error;

use crate::store::StoreError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed or missing input (empty category/name, non-positive amount).
    #[error("invalid input: {0}")]
    Validation(String),
    /// The record exists but is owned by another user.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// The referenced id has no record.
    #[error("\"{0}\" not found")]
    NotFound(String),
    /// Transport or provider failure, upstream cause kept intact.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Store(a), Self::Store(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
