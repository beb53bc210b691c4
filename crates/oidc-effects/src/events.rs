//! Identity library callbacks forwarded to the store as intents.

use serde::{Deserialize, Serialize};
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use crate::bus::ActionBus;
use crate::errors::IdentityError;
use crate::types::{OidcAction, OidcUser};
use crate::Result;

/// Event raised by the identity library on its own initiative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum LibraryEvent {
    /// A user was loaded or renewed in the library's user store
    UserLoaded(OidcUser),

    /// Automatic silent renewal failed inside the library
    SilentRenewError(IdentityError),

    /// The provider session ended (check-session monitor)
    UserSignedOut,
}

impl From<LibraryEvent> for OidcAction {
    fn from(event: LibraryEvent) -> Self {
        match event {
            LibraryEvent::UserLoaded(user) => OidcAction::OnUserLoaded(user),
            LibraryEvent::SilentRenewError(e) => OidcAction::SilentRenewError(e),
            LibraryEvent::UserSignedOut => OidcAction::OnUserSignedOut,
        }
    }
}

/// Dispatch every library event as an intent until the stream ends.
///
/// Returns the number of events forwarded.
///
/// # Errors
/// * `BusClosed` - No subscriber is listening on the bus
pub async fn forward_library_events<S>(events: S, bus: &ActionBus) -> Result<usize>
where
    S: Stream<Item = LibraryEvent>,
{
    tokio::pin!(events);

    let mut forwarded = 0;
    while let Some(event) = events.next().await {
        let action = OidcAction::from(event);
        debug!(action = action.tag(), "Forwarding identity library event");
        bus.dispatch(action)?;
        forwarded += 1;
    }

    Ok(forwarded)
}
