//! Collaborator traits: the identity library and the clock.

use async_trait::async_trait;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::IdentityError;
use crate::types::OidcUser;

/// Identity library contract.
///
/// All OIDC protocol work happens behind this trait. Each operation settles
/// exactly once with a single value or an error.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Get the current user from the library's user store
    async fn get_user(&self) -> Result<Option<OidcUser>, IdentityError>;

    /// Remove the current user from the library's user store
    async fn remove_user(&self) -> Result<(), IdentityError>;

    /// Renew tokens without an interactive prompt
    async fn signin_silent(&self) -> Result<OidcUser, IdentityError>;
}

/// Clock for current time (enables testing with deterministic timestamps)
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
