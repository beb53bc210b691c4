//! Type definitions for identity records and store actions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::IdentityError;

/// Claims of the authenticated subject as reported by the identity library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Subject identifier (`sub` claim)
    pub sub: String,

    /// Any further claims, kept opaque
    #[serde(flatten)]
    pub claims: BTreeMap<String, serde_json::Value>,
}

/// User/session record produced by the identity library.
///
/// The adapter only reads it; tokens are never inspected or validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OidcUser {
    pub id_token: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_state: Option<String>,
    pub profile: UserProfile,
    /// Access token expiry (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl OidcUser {
    /// Whether the access token has expired at `now` (Unix seconds).
    ///
    /// A user without an expiry is never expired.
    pub fn is_expired_at(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }

    /// Seconds until expiry, zero once expired
    pub fn expires_in(&self, now: u64) -> Option<u64> {
        self.expires_at.map(|expires_at| expires_at.saturating_sub(now))
    }

    pub fn subject(&self) -> &str {
        &self.profile.sub
    }
}

/// Store action.
///
/// Intents and outcomes share one enum: outcomes dispatched to the store are
/// observed by every subscriber, so an emitted `SignInSilent` is handled as
/// an intent and an emitted `SilentRenewError` reaches the logging effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum OidcAction {
    // Intents
    GetOidcUser,
    RemoveOidcUser,
    OnUserLoaded(OidcUser),
    SignInSilent,
    OnUserSignedOut,

    // Intent and outcome
    SilentRenewError(IdentityError),

    // Outcomes
    UserFound(Option<OidcUser>),
    UserDoneLoading,
    OnIdentityChanged,
    OnIdentityEstablished,
    OnIdentityRemoved,
    OidcError(IdentityError),
}

impl OidcAction {
    /// Stable tag, used in log fields
    pub fn tag(&self) -> &'static str {
        match self {
            OidcAction::GetOidcUser => "GetOidcUser",
            OidcAction::RemoveOidcUser => "RemoveOidcUser",
            OidcAction::OnUserLoaded(_) => "OnUserLoaded",
            OidcAction::SignInSilent => "SignInSilent",
            OidcAction::OnUserSignedOut => "OnUserSignedOut",
            OidcAction::SilentRenewError(_) => "SilentRenewError",
            OidcAction::UserFound(_) => "UserFound",
            OidcAction::UserDoneLoading => "UserDoneLoading",
            OidcAction::OnIdentityChanged => "OnIdentityChanged",
            OidcAction::OnIdentityEstablished => "OnIdentityEstablished",
            OidcAction::OnIdentityRemoved => "OnIdentityRemoved",
            OidcAction::OidcError(_) => "OidcError",
        }
    }
}
