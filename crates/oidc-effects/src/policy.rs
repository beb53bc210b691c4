//! Concurrency policies attached to each intent kind.

use crate::types::OidcAction;

/// How a pipeline treats a new intent while a call is still in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectPolicy {
    /// Cancel the in-flight call and start over with the newest intent
    LatestWins,

    /// Queue intents and complete each call in arrival order
    Ordered,
}

/// Intent kinds handled by the effects router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    GetUser,
    RemoveUser,
    UserLoaded,
    SignInSilent,
    SilentRenewError,
    UserSignedOut,
}

impl IntentKind {
    pub const ALL: [IntentKind; 6] = [
        IntentKind::GetUser,
        IntentKind::RemoveUser,
        IntentKind::UserLoaded,
        IntentKind::SignInSilent,
        IntentKind::SilentRenewError,
        IntentKind::UserSignedOut,
    ];

    /// Classify an action; `None` for pure outcomes
    pub fn of(action: &OidcAction) -> Option<Self> {
        match action {
            OidcAction::GetOidcUser => Some(IntentKind::GetUser),
            OidcAction::RemoveOidcUser => Some(IntentKind::RemoveUser),
            OidcAction::OnUserLoaded(_) => Some(IntentKind::UserLoaded),
            OidcAction::SignInSilent => Some(IntentKind::SignInSilent),
            OidcAction::SilentRenewError(_) => Some(IntentKind::SilentRenewError),
            OidcAction::OnUserSignedOut => Some(IntentKind::UserSignedOut),
            OidcAction::UserFound(_)
            | OidcAction::UserDoneLoading
            | OidcAction::OnIdentityChanged
            | OidcAction::OnIdentityEstablished
            | OidcAction::OnIdentityRemoved
            | OidcAction::OidcError(_) => None,
        }
    }

    pub fn policy(self) -> EffectPolicy {
        match self {
            IntentKind::RemoveUser | IntentKind::SilentRenewError => EffectPolicy::Ordered,
            IntentKind::GetUser
            | IntentKind::UserLoaded
            | IntentKind::SignInSilent
            | IntentKind::UserSignedOut => EffectPolicy::LatestWins,
        }
    }

    /// Whether handler output is dispatched back to the store
    pub fn dispatches(self) -> bool {
        !matches!(self, IntentKind::SilentRenewError)
    }
}
