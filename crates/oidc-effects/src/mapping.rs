//! Pure outcome mapping.
//!
//! Each function turns the result of one identity-library call into the
//! ordered list of actions to dispatch. Nothing here logs, awaits or reads
//! the clock; the router supplies `now` and does the logging.

use crate::errors::IdentityError;
use crate::types::{OidcAction, OidcUser};

/// Outcome of `GetOidcUser`.
///
/// Failures collapse to a bare `UserDoneLoading` so guards waiting on the
/// loading flag are released; the error itself is not propagated.
pub fn map_user_fetched(result: Result<Option<OidcUser>, IdentityError>, now: u64) -> Vec<OidcAction> {
    let user = match result {
        Ok(user) => user,
        Err(_) => return vec![OidcAction::UserDoneLoading],
    };

    let Some(user) = user else {
        return vec![OidcAction::UserFound(None), OidcAction::UserDoneLoading];
    };

    let expired = user.is_expired_at(now);
    let mut actions = vec![OidcAction::UserFound(Some(user)), OidcAction::UserDoneLoading];
    if expired {
        actions.push(OidcAction::SignInSilent);
    } else {
        actions.push(OidcAction::OnIdentityChanged);
        actions.push(OidcAction::OnIdentityEstablished);
    }
    actions
}

/// Outcome of `RemoveOidcUser`
pub fn map_user_removed(result: Result<(), IdentityError>) -> Vec<OidcAction> {
    match result {
        Ok(()) => vec![OidcAction::UserDoneLoading],
        Err(e) => vec![OidcAction::OidcError(e)],
    }
}

/// Outcome of `OnUserLoaded`: a relabeling, no I/O
pub fn map_user_loaded(user: OidcUser) -> Vec<OidcAction> {
    vec![OidcAction::UserFound(Some(user))]
}

/// Outcome of `SignInSilent`.
///
/// On failure `UserDoneLoading` follows the error so guards still resolve.
pub fn map_silent_sign_in(result: Result<OidcUser, IdentityError>) -> Vec<OidcAction> {
    match result {
        Ok(user) => vec![
            OidcAction::UserFound(Some(user)),
            OidcAction::OnIdentityChanged,
            OidcAction::OnIdentityEstablished,
        ],
        Err(e) => vec![OidcAction::SilentRenewError(e), OidcAction::UserDoneLoading],
    }
}

/// Outcome of observing `SilentRenewError`: nothing is dispatched
pub fn map_silent_renew_error(_error: &IdentityError) -> Vec<OidcAction> {
    Vec::new()
}

/// Outcome of `OnUserSignedOut`
pub fn map_user_signed_out() -> Vec<OidcAction> {
    vec![OidcAction::OnIdentityRemoved]
}
