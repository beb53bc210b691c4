//! Error types for the effects runtime and the identity library boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by the identity library.
///
/// Carried as payload on `OidcError` and `SilentRenewError` actions, so it
/// has to be cloneable and serializable.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message")]
pub enum IdentityError {
    #[error("Login required")]
    LoginRequired,

    /// The provider requires user interaction (consent, MFA)
    #[error("Interaction required")]
    InteractionRequired,

    #[error("Identity library timed out")]
    Timeout,

    /// Transport failure inside the identity library
    #[error("Network error: {0}")]
    Network(String),

    /// User store failure inside the identity library
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(String),
}

/// Effects runtime errors
#[derive(Debug, Error)]
pub enum Error {
    /// Every receiver of the action bus has been dropped
    #[error("Action bus closed")]
    BusClosed,

    #[error("Configuration error: {0}")]
    Config(String),
}
