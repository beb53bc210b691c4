/*!
 * Scenario setup and action stream printing
 */

use anyhow::{Context, Result};
use oidc_effects::{
    forward_library_events, ActionBus, Clock, EffectsConfig, IdentityError, InMemoryIdentityClient,
    LibraryEvent, OidcAction, OidcEffects, OidcUser, StateProjection, SystemClock, UserProfile,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::{Cli, Commands, UserState};

const TOKEN_LIFETIME_SECS: u64 = 3600;

pub async fn run(cli: &Cli) -> Result<()> {
    let config = EffectsConfig::from_env().context("Failed to load effects configuration")?;
    let now = SystemClock.now_secs();

    let client = Arc::new(build_client(cli, now).await);
    let bus = ActionBus::from_config(&config);
    let mut observer = bus.subscribe();
    let projection = StateProjection::spawn(&bus);
    let handle = OidcEffects::with_clock(client, Arc::new(SystemClock)).spawn(&bus);

    tracing::info!(intent = command_name(cli.command), "Dispatching intent");
    dispatch(cli, &bus, now).await?;

    let printed = print_until_settled(&mut observer, Duration::from_millis(cli.settle_ms)).await?;

    let state = projection.current();
    let expires_in = state
        .user
        .as_ref()
        .and_then(|user| user.expires_in(SystemClock.now_secs()));
    tracing::info!(
        actions = printed,
        loading = state.loading,
        authenticated = state.is_authenticated(),
        subject = state.user.as_ref().map(|u| u.subject()).unwrap_or("-"),
        expires_in = ?expires_in,
        "Bus settled"
    );

    handle.shutdown().await;
    Ok(())
}

async fn build_client(cli: &Cli, now: u64) -> InMemoryIdentityClient {
    let client = InMemoryIdentityClient::new();

    let initial = match cli.user {
        UserState::None => None,
        UserState::Valid => Some(scripted_user(&cli.subject, now + TOKEN_LIFETIME_SECS)),
        UserState::Expired => Some(scripted_user(&cli.subject, now.saturating_sub(60))),
    };
    client.set_user(initial).await;
    client
        .set_renewed_user(Some(scripted_user(&cli.subject, now + TOKEN_LIFETIME_SECS)))
        .await;

    if cli.fail_get {
        client
            .fail_get(Some(IdentityError::Storage("user store unavailable".to_string())))
            .await;
    }
    if cli.fail_remove {
        client
            .fail_remove(Some(IdentityError::Storage("user store is read-only".to_string())))
            .await;
    }
    if cli.fail_renew {
        client.fail_renew(Some(IdentityError::LoginRequired)).await;
    }

    client
}

async fn dispatch(cli: &Cli, bus: &ActionBus, now: u64) -> Result<()> {
    match cli.command {
        Commands::GetUser => bus.dispatch(OidcAction::GetOidcUser)?,
        Commands::RemoveUser => bus.dispatch(OidcAction::RemoveOidcUser)?,
        Commands::SignInSilent => bus.dispatch(OidcAction::SignInSilent)?,
        Commands::UserLoaded => {
            let user = scripted_user(&cli.subject, now + TOKEN_LIFETIME_SECS);
            forward_library_events(tokio_stream::once(LibraryEvent::UserLoaded(user)), bus).await?;
        }
        Commands::SignedOut => {
            forward_library_events(tokio_stream::once(LibraryEvent::UserSignedOut), bus).await?;
        }
    }
    Ok(())
}

async fn print_until_settled(
    observer: &mut broadcast::Receiver<OidcAction>,
    settle: Duration,
) -> Result<usize> {
    let mut printed = 0;
    loop {
        match tokio::time::timeout(settle, observer.recv()).await {
            Ok(Ok(action)) => {
                println!("{}", serde_json::to_string(&action)?);
                printed += 1;
            }
            Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                tracing::warn!(skipped, "Output lagged behind the action bus");
            }
            Ok(Err(broadcast::error::RecvError::Closed)) | Err(_) => break,
        }
    }
    Ok(printed)
}

fn scripted_user(subject: &str, expires_at: u64) -> OidcUser {
    let mut claims = BTreeMap::new();
    claims.insert(
        "name".to_string(),
        serde_json::Value::String(subject.to_string()),
    );

    OidcUser {
        id_token: format!("demo-id-token-{}", subject),
        access_token: format!("demo-access-token-{}", subject),
        refresh_token: None,
        token_type: "Bearer".to_string(),
        scope: "openid profile".to_string(),
        session_state: None,
        profile: UserProfile {
            sub: subject.to_string(),
            claims,
        },
        expires_at: Some(expires_at),
    }
}

fn command_name(command: Commands) -> &'static str {
    match command {
        Commands::GetUser => "get-user",
        Commands::RemoveUser => "remove-user",
        Commands::SignInSilent => "sign-in-silent",
        Commands::UserLoaded => "user-loaded",
        Commands::SignedOut => "signed-out",
    }
}
