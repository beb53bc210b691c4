//! # oidc-effects
//!
//! Effect handlers that sit between an application's action store and an
//! OpenID Connect identity library.
//!
//! ## Responsibilities
//!
//! - Routing identity intents to the identity library
//! - Translating library outcomes into store actions
//! - Latest-wins and ordered concurrency per intent kind
//! - Forwarding library callbacks as intents
//! - Projecting actions into a loading/identity state for guards
//!
//! All protocol work (token exchange, silent iframe renewal, discovery) is
//! delegated to an [`IdentityClient`] implementation.

pub mod bus;
pub mod config;
pub mod errors;
pub mod events;
pub mod mapping;
pub mod memory;
pub mod policy;
mod service;
pub mod state;
pub mod traits;
pub mod types;

#[cfg(test)]
mod tests;

pub use bus::ActionBus;
pub use config::{EffectsConfig, MAX_BUS_CAPACITY};
pub use errors::{Error, IdentityError, Result};
pub use events::{forward_library_events, LibraryEvent};
pub use memory::InMemoryIdentityClient;
pub use policy::{EffectPolicy, IntentKind};
pub use service::{EffectsHandle, OidcEffects};
pub use state::{OidcState, StateProjection};
pub use traits::{Clock, IdentityClient, SystemClock};
pub use types::*;
