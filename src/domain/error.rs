//! Domain validation errors.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Tasks are keyed by item id, so it must be present.
    #[error("item id cannot be empty")]
    EmptyItemId,

    /// Join price is the percentage baseline and cannot be negative.
    #[error("join price cannot be negative, got {price}")]
    NegativeJoinPrice {
        /// The invalid price that was provided.
        price: rust_decimal::Decimal,
    },
}
