//! Capability negotiation bookkeeping.
//!
//! This engine does not negotiate capabilities itself; it records the
//! outcome so handlers can adjust their parsing. The join handler
//! consults `extended-join`.

use std::collections::HashSet;

/// State of one capability on this connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CapabilityState {
    /// Not acknowledged by the server.
    #[default]
    Disabled,
    /// Acknowledged and active.
    Enabled,
}

/// The set of capabilities enabled on a connection.
#[derive(Clone, Debug, Default)]
pub struct CapabilityMap {
    enabled: HashSet<String>,
}

impl CapabilityMap {
    /// Empty map; every capability starts disabled.
    pub fn new() -> CapabilityMap {
        CapabilityMap::default()
    }

    /// State of a capability by name.
    pub fn state(&self, name: &str) -> CapabilityState {
        if self.enabled.contains(name) {
            CapabilityState::Enabled
        } else {
            CapabilityState::Disabled
        }
    }

    /// Whether a capability is enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.state(name) == CapabilityState::Enabled
    }

    /// Mark a capability enabled.
    pub fn set_enabled(&mut self, name: &str) {
        self.enabled.insert(name.to_string());
    }

    /// Mark a capability disabled.
    pub fn set_disabled(&mut self, name: &str) {
        self.enabled.remove(name);
    }
}
