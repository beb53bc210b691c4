//! Per-intent handlers: call the identity library, log, map.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::OidcEffects;
use crate::mapping::*;
use crate::traits::IdentityClient;
use crate::types::OidcAction;

/// Pending outcome of one intent
pub(crate) type Outcome = Pin<Box<dyn Future<Output = Vec<OidcAction>> + Send>>;

impl<C: IdentityClient + 'static> OidcEffects<C> {
    /// Build the future that handles `action`.
    ///
    /// Nothing runs until the future is polled; dropping it cancels the
    /// library call and discards its outcome.
    pub(crate) fn handle(self: &Arc<Self>, action: OidcAction, run_id: Uuid) -> Outcome {
        let effects = Arc::clone(self);

        match action {
            OidcAction::GetOidcUser => Box::pin(async move {
                debug!(%run_id, "Getting user from identity library");
                let result = effects.client.get_user().await;
                match &result {
                    Ok(Some(user)) => debug!(%run_id, sub = %user.subject(), "Got user"),
                    Ok(None) => debug!(%run_id, "No user in identity library"),
                    Err(e) => warn!(%run_id, error = %e, "Failed to get user"),
                }
                map_user_fetched(result, effects.clock.now_secs())
            }),

            OidcAction::RemoveOidcUser => Box::pin(async move {
                debug!(%run_id, "Removing user from identity library");
                let result = effects.client.remove_user().await;
                if let Err(e) = &result {
                    warn!(%run_id, error = %e, "Failed to remove user");
                }
                map_user_removed(result)
            }),

            OidcAction::OnUserLoaded(user) => Box::pin(async move {
                debug!(%run_id, sub = %user.subject(), "User loaded by identity library");
                map_user_loaded(user)
            }),

            OidcAction::SignInSilent => Box::pin(async move {
                debug!(%run_id, "Starting silent sign-in");
                let result = effects.client.signin_silent().await;
                match &result {
                    Ok(user) => info!(%run_id, sub = %user.subject(), "Silent sign-in succeeded"),
                    Err(e) => warn!(%run_id, error = %e, "Silent sign-in failed"),
                }
                map_silent_sign_in(result)
            }),

            OidcAction::SilentRenewError(error) => Box::pin(async move {
                warn!(%run_id, error = %error, "There was an error renewing the user token");
                map_silent_renew_error(&error)
            }),

            OidcAction::OnUserSignedOut => Box::pin(async move {
                info!(%run_id, "User signed out at the identity provider");
                map_user_signed_out()
            }),

            // Feeders only queue intents
            OidcAction::UserFound(_)
            | OidcAction::UserDoneLoading
            | OidcAction::OnIdentityChanged
            | OidcAction::OnIdentityEstablished
            | OidcAction::OnIdentityRemoved
            | OidcAction::OidcError(_) => Box::pin(async { Vec::new() }),
        }
    }
}
