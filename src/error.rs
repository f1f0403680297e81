use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::id::ItemId;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Marketplace-related errors with structured variants.
///
/// A purchase that the marketplace answers with an explicit negative result
/// is not an error: it comes back as an unsuccessful
/// [`PurchaseResult`](crate::domain::listing::PurchaseResult).
#[derive(Error, Debug, Clone)]
pub enum MarketplaceError {
    #[error("marketplace rejected request (code {code}): {message}")]
    Rejected { code: String, message: String },

    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    #[error("malformed marketplace response: {0}")]
    Malformed(String),

    #[error("not authorized, check the access token")]
    Unauthorized,
}

/// Errors returned by task control operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("task {0} is not tracked")]
    NotFound(ItemId),

    #[error("task {0} already succeeded")]
    AlreadySucceeded(ItemId),

    #[error("task {0} is being removed")]
    Removing(ItemId),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Marketplace(#[from] MarketplaceError),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("store error: {0}")]
    Store(String),

    #[error("email error: {0}")]
    Email(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for transport-level failures that only end the current poll.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Json(_)
                | Self::Io(_)
                | Self::Marketplace(
                    MarketplaceError::Timeout { .. }
                        | MarketplaceError::Malformed(_)
                        | MarketplaceError::Rejected { .. }
                )
        )
    }
}
