/*!
 * OIDC effects demo driver
 *
 * Wires an in-memory identity library into the effects router, dispatches
 * one intent and prints every action on the bus as a JSON line until the
 * bus settles.
 *
 * Usage:
 *   cargo run -p oidc-effects-cli -- get-user
 *   cargo run -p oidc-effects-cli -- --user expired --fail-renew get-user
 *   cargo run -p oidc-effects-cli -- --fail-remove remove-user
 */

mod scenario;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "oidc-effects")]
#[command(about = "Drive the OIDC effects router against an in-memory identity library")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// User initially held by the identity library
    #[arg(long, value_enum, default_value_t = UserState::Valid)]
    user: UserState,

    /// Subject id of the scripted user
    #[arg(long, default_value = "alice")]
    subject: String,

    /// Make "get current user" fail
    #[arg(long)]
    fail_get: bool,

    /// Make user removal fail
    #[arg(long)]
    fail_remove: bool,

    /// Make silent renewal fail
    #[arg(long)]
    fail_renew: bool,

    /// Quiet period (milliseconds) after which the bus counts as settled
    #[arg(long, default_value_t = 200)]
    settle_ms: u64,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Fetch the current user
    GetUser,
    /// Remove the current user
    RemoveUser,
    /// Trigger a silent sign-in
    SignInSilent,
    /// Simulate the library loading a user on its own
    UserLoaded,
    /// Simulate the provider ending the session
    SignedOut,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum UserState {
    None,
    Valid,
    Expired,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays a clean action stream
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oidc_effects=debug,oidc_effects_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    scenario::run(&cli).await
}
