//! Test helpers and mocks for effects tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::*;

pub const NOW: u64 = 1_700_000_000;

/// One scripted library response, settled after `delay`
pub type Step<T> = (Duration, std::result::Result<T, IdentityError>);

/// Identity library that replays scripted responses in call order
#[derive(Default)]
pub struct ScriptedIdentityClient {
    get_user: Mutex<VecDeque<Step<Option<OidcUser>>>>,
    remove_user: Mutex<VecDeque<Step<()>>>,
    signin_silent: Mutex<VecDeque<Step<OidcUser>>>,
    calls: AtomicUsize,
}

impl ScriptedIdentityClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get_user(self, delay_ms: u64, result: std::result::Result<Option<OidcUser>, IdentityError>) -> Self {
        self.get_user
            .lock()
            .unwrap()
            .push_back((Duration::from_millis(delay_ms), result));
        self
    }

    pub fn on_remove_user(self, delay_ms: u64, result: std::result::Result<(), IdentityError>) -> Self {
        self.remove_user
            .lock()
            .unwrap()
            .push_back((Duration::from_millis(delay_ms), result));
        self
    }

    pub fn on_signin_silent(self, delay_ms: u64, result: std::result::Result<OidcUser, IdentityError>) -> Self {
        self.signin_silent
            .lock()
            .unwrap()
            .push_back((Duration::from_millis(delay_ms), result));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn replay<T>(script: &Mutex<VecDeque<Step<T>>>, op: &str) -> std::result::Result<T, IdentityError> {
    let step = script.lock().unwrap().pop_front();
    let (delay, result) = step.unwrap_or_else(|| panic!("no scripted response for {}", op));
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    result
}

#[async_trait]
impl IdentityClient for ScriptedIdentityClient {
    async fn get_user(&self) -> std::result::Result<Option<OidcUser>, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        replay(&self.get_user, "get_user").await
    }

    async fn remove_user(&self) -> std::result::Result<(), IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        replay(&self.remove_user, "remove_user").await
    }

    async fn signin_silent(&self) -> std::result::Result<OidcUser, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        replay(&self.signin_silent, "signin_silent").await
    }
}

/// Mock clock with a fixed timestamp
pub struct MockClock(pub u64);

impl Clock for MockClock {
    fn now_secs(&self) -> u64 {
        self.0
    }
}

/// Helper to build a user for `sub` expiring at `expires_at`
pub fn user(sub: &str, expires_at: Option<u64>) -> OidcUser {
    OidcUser {
        id_token: format!("id-{}", sub),
        access_token: format!("access-{}", sub),
        refresh_token: None,
        token_type: "Bearer".to_string(),
        scope: "openid profile email".to_string(),
        session_state: Some("session".to_string()),
        profile: UserProfile {
            sub: sub.to_string(),
            claims: BTreeMap::new(),
        },
        expires_at,
    }
}

pub fn valid_user(sub: &str) -> OidcUser {
    user(sub, Some(NOW + 3600))
}

pub fn expired_user(sub: &str) -> OidcUser {
    user(sub, Some(NOW - 60))
}

/// Helper to start effects on a fresh bus.
///
/// The returned receiver was subscribed before the router, so it sees
/// every action in dispatch order.
pub fn start_effects(
    client: Arc<ScriptedIdentityClient>,
) -> (ActionBus, EffectsHandle, broadcast::Receiver<OidcAction>) {
    start_effects_on(client, ActionBus::new(64).unwrap())
}

/// Same as [`start_effects`] on a caller-provided bus
pub fn start_effects_on(
    client: Arc<ScriptedIdentityClient>,
    bus: ActionBus,
) -> (ActionBus, EffectsHandle, broadcast::Receiver<OidcAction>) {
    let observer = bus.subscribe();
    let effects = OidcEffects::with_clock(client, Arc::new(MockClock(NOW)));
    let handle = effects.spawn(&bus);
    (bus, handle, observer)
}

/// Collect actions until the bus stays quiet for half a second.
///
/// Skips over a lag instead of stopping at it.
pub async fn drain(observer: &mut broadcast::Receiver<OidcAction>) -> Vec<OidcAction> {
    let mut actions = Vec::new();
    loop {
        match tokio::time::timeout(Duration::from_millis(500), observer.recv()).await {
            Ok(Ok(action)) => actions.push(action),
            Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
            Ok(Err(broadcast::error::RecvError::Closed)) | Err(_) => break,
        }
    }
    actions
}
