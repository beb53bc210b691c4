//! Identity state projected from the action stream.
//!
//! The reducer mirrors what a store would keep for route guards: whether
//! identity resolution is still loading, the current user, and the last
//! error signals.

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::bus::ActionBus;
use crate::errors::IdentityError;
use crate::types::{OidcAction, OidcUser};

/// Identity state
#[derive(Debug, Clone, PartialEq)]
pub struct OidcState {
    pub loading: bool,
    pub user: Option<OidcUser>,
    pub identity_established: bool,
    pub silent_renew_error: Option<IdentityError>,
    pub last_error: Option<IdentityError>,
}

impl Default for OidcState {
    fn default() -> Self {
        Self {
            loading: true,
            user: None,
            identity_established: false,
            silent_renew_error: None,
            last_error: None,
        }
    }
}

impl OidcState {
    /// Apply one action. Returns whether the state changed.
    pub fn reduce(&mut self, action: &OidcAction) -> bool {
        let before = self.clone();

        match action {
            OidcAction::GetOidcUser => self.loading = true,
            OidcAction::UserFound(user) => {
                self.user = user.clone();
                self.silent_renew_error = None;
            }
            OidcAction::UserDoneLoading => self.loading = false,
            OidcAction::OnIdentityEstablished => self.identity_established = true,
            OidcAction::OnIdentityRemoved => {
                self.user = None;
                self.identity_established = false;
            }
            OidcAction::SilentRenewError(e) => self.silent_renew_error = Some(e.clone()),
            OidcAction::OidcError(e) => self.last_error = Some(e.clone()),
            OidcAction::RemoveOidcUser
            | OidcAction::SignInSilent
            | OidcAction::OnUserLoaded(_)
            | OidcAction::OnUserSignedOut
            | OidcAction::OnIdentityChanged => {}
        }

        *self != before
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity_established && self.user.is_some()
    }
}

/// Folds the bus into a watchable [`OidcState`]
pub struct StateProjection {
    state: watch::Receiver<OidcState>,
    task: JoinHandle<()>,
}

impl StateProjection {
    /// Subscribe to `bus` and start folding actions into state
    pub fn spawn(bus: &ActionBus) -> Self {
        let inbound = bus.subscribe();
        let (tx, rx) = watch::channel(OidcState::default());
        let task = tokio::spawn(fold(inbound, tx));
        Self { state: rx, task }
    }

    pub fn current(&self) -> OidcState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<OidcState> {
        self.state.clone()
    }

    /// Resolve once identity resolution has finished loading.
    ///
    /// Returns `None` if the projection stopped before that happened.
    pub async fn wait_until_loaded(&self) -> Option<OidcState> {
        let mut rx = self.state.clone();
        let state = rx.wait_for(|state| !state.loading).await.ok()?.clone();
        Some(state)
    }
}

impl Drop for StateProjection {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn fold(mut inbound: broadcast::Receiver<OidcAction>, state: watch::Sender<OidcState>) {
    loop {
        let action = match inbound.recv().await {
            Ok(action) => action,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "State projection lagged behind the action bus");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        state.send_if_modified(|current| current.reduce(&action));
    }
    debug!("State projection stopped");
}
