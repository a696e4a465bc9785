//! Command dispatch.
//!
//! A registration table maps each command or numeric string to the
//! handlers interested in it. One handler may be registered under many
//! keys (JOIN plus its related numerics, say), and several handlers may
//! share a key; they run in registration order. Keys nobody registered
//! are dropped silently, since clients may ignore most of the protocol.
//!
//! Handlers can additionally observe *outbound* commands just before
//! transmission, which is how the join handler seeds its pending-key
//! correlation ahead of the server's confirmation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::line::Line;
use crate::session::Session;

/// A command-family handler. Implementations mutate the session state
/// and publish events; they must swallow malformed input silently.
pub trait Handler {
    /// Process one inbound line dispatched under `key` (the uppercased
    /// command or the numeric).
    fn handle(&mut self, session: &mut Session, ts: DateTime<Utc>, key: &str, line: &Line<'_>);

    /// Observe an outbound line before it is transmitted.
    fn observe_outbound(&mut self, _session: &mut Session, _line: &Line<'_>) {}

    /// Drop any multi-line correlation state (connection teardown).
    fn reset(&mut self) {}
}

/// The command/numeric -> handler registration table.
#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<Box<dyn Handler>>,
    inbound: HashMap<String, Vec<usize>>,
    outbound: HashMap<String, Vec<usize>>,
}

impl Dispatcher {
    /// Empty table.
    pub fn new() -> Dispatcher {
        Dispatcher::default()
    }

    /// Register a handler for a set of inbound keys and (optionally)
    /// outbound observation keys.
    pub fn register(
        &mut self,
        handler: Box<dyn Handler>,
        inbound_keys: &[&str],
        outbound_keys: &[&str],
    ) {
        let idx = self.handlers.len();
        self.handlers.push(handler);
        for key in inbound_keys {
            self.inbound
                .entry(key.to_ascii_uppercase())
                .or_default()
                .push(idx);
        }
        for key in outbound_keys {
            self.outbound
                .entry(key.to_ascii_uppercase())
                .or_default()
                .push(idx);
        }
    }

    /// Invoke every handler registered for `key`, in registration
    /// order. Unregistered keys are ignored.
    pub fn dispatch(
        &mut self,
        session: &mut Session,
        ts: DateTime<Utc>,
        key: &str,
        line: &Line<'_>,
    ) {
        let key = key.to_ascii_uppercase();
        let Some(indices) = self.inbound.get(&key) else {
            trace!(command = %key, "no handler registered, dropping");
            return;
        };
        for idx in indices.clone() {
            self.handlers[idx].handle(session, ts, &key, line);
        }
    }

    /// Show an outbound line to its observers.
    pub fn observe(&mut self, session: &mut Session, line: &Line<'_>) {
        let key = line.command.to_ascii_uppercase();
        let Some(indices) = self.outbound.get(&key) else {
            return;
        };
        for idx in indices.clone() {
            self.handlers[idx].observe_outbound(session, line);
        }
    }

    /// Reset correlation state in every handler.
    pub fn reset_all(&mut self) {
        for handler in &mut self.handlers {
            handler.reset();
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handlers.len())
            .field("inbound_keys", &self.inbound.len())
            .field("outbound_keys", &self.outbound.len())
            .finish()
    }
}
