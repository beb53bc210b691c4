//! In-memory identity library for demos and integration tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::errors::IdentityError;
use crate::traits::IdentityClient;
use crate::types::OidcUser;

#[derive(Debug, Default)]
struct Slot {
    user: Option<OidcUser>,
    renewed_user: Option<OidcUser>,
    get_failure: Option<IdentityError>,
    remove_failure: Option<IdentityError>,
    renew_failure: Option<IdentityError>,
}

/// Identity library backed by a single in-memory user slot.
///
/// `signin_silent` replaces the stored user with the configured renewed
/// user; without one it fails with `LoginRequired`.
#[derive(Debug, Default)]
pub struct InMemoryIdentityClient {
    slot: RwLock<Slot>,
    calls: AtomicUsize,
}

impl InMemoryIdentityClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: OidcUser) -> Self {
        Self {
            slot: RwLock::new(Slot {
                user: Some(user),
                ..Slot::default()
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub async fn set_user(&self, user: Option<OidcUser>) {
        self.slot.write().await.user = user;
    }

    pub async fn set_renewed_user(&self, user: Option<OidcUser>) {
        self.slot.write().await.renewed_user = user;
    }

    pub async fn fail_get(&self, error: Option<IdentityError>) {
        self.slot.write().await.get_failure = error;
    }

    pub async fn fail_remove(&self, error: Option<IdentityError>) {
        self.slot.write().await.remove_failure = error;
    }

    pub async fn fail_renew(&self, error: Option<IdentityError>) {
        self.slot.write().await.renew_failure = error;
    }

    pub async fn user(&self) -> Option<OidcUser> {
        self.slot.read().await.user.clone()
    }

    /// Number of library operations invoked so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityClient for InMemoryIdentityClient {
    async fn get_user(&self) -> Result<Option<OidcUser>, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let slot = self.slot.read().await;
        if let Some(e) = &slot.get_failure {
            return Err(e.clone());
        }
        Ok(slot.user.clone())
    }

    async fn remove_user(&self) -> Result<(), IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut slot = self.slot.write().await;
        if let Some(e) = &slot.remove_failure {
            return Err(e.clone());
        }
        slot.user = None;
        Ok(())
    }

    async fn signin_silent(&self) -> Result<OidcUser, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut slot = self.slot.write().await;
        if let Some(e) = &slot.renew_failure {
            return Err(e.clone());
        }
        let renewed = slot
            .renewed_user
            .clone()
            .ok_or(IdentityError::LoginRequired)?;
        slot.user = Some(renewed.clone());
        Ok(renewed)
    }
}
