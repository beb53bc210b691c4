//! Loading guard scenarios over the in-memory identity library.

use oidc_effects::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

fn user(sub: &str, expires_at: u64) -> OidcUser {
    OidcUser {
        id_token: format!("id-{}", sub),
        access_token: format!("access-{}", sub),
        refresh_token: Some(format!("refresh-{}", sub)),
        token_type: "Bearer".to_string(),
        scope: "openid profile".to_string(),
        session_state: None,
        profile: UserProfile {
            sub: sub.to_string(),
            claims: BTreeMap::new(),
        },
        expires_at: Some(expires_at),
    }
}

fn start(client: Arc<InMemoryIdentityClient>) -> (ActionBus, EffectsHandle, StateProjection) {
    let bus = ActionBus::default();
    let projection = StateProjection::spawn(&bus);
    let handle = OidcEffects::new(client).spawn(&bus);
    (bus, handle, projection)
}

async fn wait_for<F>(projection: &StateProjection, predicate: F) -> OidcState
where
    F: Fn(&OidcState) -> bool,
{
    let mut rx = projection.watch();
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| predicate(s)))
        .await
        .expect("state did not settle")
        .expect("projection stopped")
        .clone();
    state
}

#[tokio::test]
async fn test_guard_resolves_with_established_identity() {
    let now = SystemClock.now_secs();
    let client = Arc::new(InMemoryIdentityClient::with_user(user("alice", now + 3600)));
    let (bus, handle, projection) = start(client);

    bus.dispatch(OidcAction::GetOidcUser).unwrap();

    let loaded = tokio::time::timeout(Duration::from_secs(5), projection.wait_until_loaded())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.user.as_ref().map(|u| u.subject()), Some("alice"));

    let state = wait_for(&projection, |s| s.identity_established).await;
    assert!(state.is_authenticated());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_guard_resolves_when_there_is_no_user() {
    let client = Arc::new(InMemoryIdentityClient::new());
    let (bus, _handle, projection) = start(client);

    bus.dispatch(OidcAction::GetOidcUser).unwrap();

    let state = tokio::time::timeout(Duration::from_secs(5), projection.wait_until_loaded())
        .await
        .unwrap()
        .unwrap();
    assert!(state.user.is_none());
    assert!(!state.is_authenticated());
}

#[tokio::test]
async fn test_expired_user_is_renewed_silently() {
    let now = SystemClock.now_secs();
    let client = Arc::new(InMemoryIdentityClient::with_user(user("alice", now - 60)));
    client.set_renewed_user(Some(user("alice", now + 3600))).await;
    let (bus, _handle, projection) = start(client.clone());

    bus.dispatch(OidcAction::GetOidcUser).unwrap();

    let state = wait_for(&projection, |s| s.identity_established && !s.loading).await;
    let renewed = state.user.unwrap();
    assert!(!renewed.is_expired_at(now));
    assert_eq!(client.user().await, Some(renewed));
}

#[tokio::test]
async fn test_failed_renewal_still_releases_guard() {
    let now = SystemClock.now_secs();
    let client = Arc::new(InMemoryIdentityClient::with_user(user("alice", now - 60)));
    client.fail_renew(Some(IdentityError::InteractionRequired)).await;
    let (bus, _handle, projection) = start(client);

    bus.dispatch(OidcAction::GetOidcUser).unwrap();

    let state = wait_for(&projection, |s| s.silent_renew_error.is_some() && !s.loading).await;
    assert_eq!(state.silent_renew_error, Some(IdentityError::InteractionRequired));
    assert!(!state.identity_established);
}

#[tokio::test]
async fn test_retrieval_failure_is_swallowed() {
    let client = Arc::new(InMemoryIdentityClient::new());
    client.fail_get(Some(IdentityError::Network("unreachable".to_string()))).await;
    let (bus, _handle, projection) = start(client);

    bus.dispatch(OidcAction::GetOidcUser).unwrap();

    let state = tokio::time::timeout(Duration::from_secs(5), projection.wait_until_loaded())
        .await
        .unwrap()
        .unwrap();
    assert!(state.last_error.is_none());
    assert!(state.silent_renew_error.is_none());
}

#[tokio::test]
async fn test_remove_user_clears_library_store() {
    let now = SystemClock.now_secs();
    let client = Arc::new(InMemoryIdentityClient::with_user(user("alice", now + 3600)));
    let (bus, _handle, projection) = start(client.clone());

    bus.dispatch(OidcAction::RemoveOidcUser).unwrap();

    wait_for(&projection, |s| !s.loading).await;
    assert!(client.user().await.is_none());
}

#[tokio::test]
async fn test_failed_removal_surfaces_error() {
    let client = Arc::new(InMemoryIdentityClient::new());
    client.fail_remove(Some(IdentityError::Storage("read-only".to_string()))).await;
    let (bus, _handle, projection) = start(client);

    bus.dispatch(OidcAction::RemoveOidcUser).unwrap();

    let state = wait_for(&projection, |s| s.last_error.is_some()).await;
    assert_eq!(state.last_error, Some(IdentityError::Storage("read-only".to_string())));
    assert!(state.loading);
}

#[tokio::test]
async fn test_library_sign_out_clears_identity() {
    let now = SystemClock.now_secs();
    let client = Arc::new(InMemoryIdentityClient::with_user(user("alice", now + 3600)));
    let (bus, _handle, projection) = start(client);

    bus.dispatch(OidcAction::GetOidcUser).unwrap();
    wait_for(&projection, |s| s.identity_established).await;

    let events = tokio_stream::iter(vec![LibraryEvent::UserSignedOut]);
    forward_library_events(events, &bus).await.unwrap();

    let state = wait_for(&projection, |s| !s.identity_established).await;
    assert!(state.user.is_none());
}
