//! Runtime configuration.

use crate::{Error, Result};

const DEFAULT_BUS_CAPACITY: usize = 256;

/// Largest accepted action bus buffer
pub const MAX_BUS_CAPACITY: usize = 1 << 16;

/// Effects runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectsConfig {
    bus_capacity: usize,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

impl EffectsConfig {
    /// # Errors
    /// * `Config` - Capacity is zero or above [`MAX_BUS_CAPACITY`]
    pub fn new(bus_capacity: usize) -> Result<Self> {
        let bus_capacity = validate_bus_capacity("bus capacity", bus_capacity)?;
        Ok(Self { bus_capacity })
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = "OIDC_EFFECTS_BUS_CAPACITY";
        let Some(raw) = lookup(name) else {
            return Ok(Self::default());
        };

        let value: usize = raw.trim().parse().map_err(|_| {
            Error::Config(format!("{} must be a positive integer, got '{}'", name, raw))
        })?;

        let bus_capacity = validate_bus_capacity(name, value)?;
        Ok(Self { bus_capacity })
    }

    /// Broadcast buffer of the action bus
    pub fn bus_capacity(&self) -> usize {
        self.bus_capacity
    }
}

pub(crate) fn validate_bus_capacity(name: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(Error::Config(format!("{} must be greater than zero", name)));
    }
    if value > MAX_BUS_CAPACITY {
        return Err(Error::Config(format!(
            "{} must be at most {}, got {}",
            name, MAX_BUS_CAPACITY, value
        )));
    }
    Ok(value)
}
