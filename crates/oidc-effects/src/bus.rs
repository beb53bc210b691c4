//! Broadcast action bus standing in for the store's dispatcher.

use tokio::sync::broadcast;

use crate::config::{validate_bus_capacity, EffectsConfig};
use crate::types::OidcAction;
use crate::{Error, Result};

/// Store dispatcher: every dispatched action reaches every subscriber,
/// including the effects pipeline that produced it.
#[derive(Debug, Clone)]
pub struct ActionBus {
    sender: broadcast::Sender<OidcAction>,
}

impl ActionBus {
    /// # Errors
    /// * `Config` - Capacity is zero or above `MAX_BUS_CAPACITY`
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = validate_bus_capacity("bus capacity", capacity)?;
        let (sender, _) = broadcast::channel(capacity);
        Ok(Self { sender })
    }

    pub fn from_config(config: &EffectsConfig) -> Self {
        // EffectsConfig only holds validated capacities
        let (sender, _) = broadcast::channel(config.bus_capacity());
        Self { sender }
    }

    /// Dispatch an action to all current subscribers
    ///
    /// # Errors
    /// * `BusClosed` - No subscriber is listening
    pub fn dispatch(&self, action: OidcAction) -> Result<()> {
        self.sender
            .send(action)
            .map(|_| ())
            .map_err(|_| Error::BusClosed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OidcAction> {
        self.sender.subscribe()
    }
}

impl Default for ActionBus {
    fn default() -> Self {
        Self::from_config(&EffectsConfig::default())
    }
}
