//! The connection engine.
//!
//! One [`Client`] per connection. The transport layer (out of scope
//! here) feeds inbound lines to [`Client::process_line`] strictly in
//! arrival order and drains [`Client::next_outbound`] with a single
//! writer; every state mutation and event publication happens on that
//! one logical thread, so handlers need no locking. A keepalive timer
//! only ever enqueues (see [`Client::keepalive`]), never touches state.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::caps::CapabilityMap;
use crate::casemap::Casemapping;
use crate::dispatch::Dispatcher;
use crate::event::{EventBus, Listener};
use crate::handlers;
use crate::line::Line;
use crate::mode::{ModeTable, PrefixModeTable};
use crate::queue::{OutboundQueue, Priority};
use crate::session::Session;
use crate::state::{Channel, StateStore, User};

/// Connection-time configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Our nickname.
    pub nickname: String,
    /// Casemapping strategy for all name comparisons.
    pub casemapping: Casemapping,
    /// Characters that start a channel name.
    pub chantypes: String,
    /// Ask for list-mode contents once per channel after end-of-names.
    pub auto_list_modes: bool,
}

impl ClientConfig {
    /// Defaults: rfc1459 casemapping, `#&` channels, list modes
    /// requested automatically.
    pub fn new(nickname: impl Into<String>) -> ClientConfig {
        ClientConfig {
            nickname: nickname.into(),
            casemapping: Casemapping::default(),
            chantypes: "#&".to_string(),
            auto_list_modes: true,
        }
    }
}

/// A connection's message-processing engine: dispatcher plus session
/// state. Sans-IO; see the module docs for the driving contract.
#[derive(Debug)]
pub struct Client {
    session: Session,
    dispatcher: Dispatcher,
}

impl Client {
    /// Build a client with the default handler set registered.
    pub fn new(config: ClientConfig) -> Client {
        let mut state = StateStore::new(config.casemapping, &config.nickname, &config.chantypes);
        state.add_user(User::new(&config.nickname));

        let session = Session {
            state,
            chan_modes: ModeTable::default_channel(),
            user_modes: ModeTable::default_user(),
            prefix_modes: PrefixModeTable::default(),
            bus: EventBus::new(),
            out: OutboundQueue::new(),
            caps: CapabilityMap::new(),
            auto_list_modes: config.auto_list_modes,
        };

        let mut dispatcher = Dispatcher::new();
        handlers::register_defaults(&mut dispatcher);

        Client {
            session,
            dispatcher,
        }
    }

    /// Process one inbound line. Unparseable lines are dropped.
    pub fn process_line(&mut self, ts: DateTime<Utc>, raw: &str) {
        let line = match Line::tokenize(raw) {
            Ok(line) => line,
            Err(err) => {
                trace!(%err, line = raw, "dropping unparseable line");
                return;
            }
        };
        self.dispatcher
            .dispatch(&mut self.session, ts, line.command, &line);
    }

    /// Queue a raw line for transmission.
    pub fn send(&mut self, line: impl Into<String>, priority: Priority) {
        self.session.out.push(line, priority);
    }

    /// Hand the next outbound line to the writer, highest priority
    /// first. The line is shown to outbound observers here, immediately
    /// before transmission, which is what seeds join-key correlation.
    pub fn next_outbound(&mut self) -> Option<String> {
        let raw = self.session.out.pop()?;
        if let Ok(line) = Line::tokenize(&raw) {
            self.dispatcher.observe(&mut self.session, &line);
        }
        Some(raw)
    }

    /// Enqueue a keepalive PING. Called from the timer task; enqueueing
    /// is its only interaction with the connection.
    pub fn keepalive(&mut self, server: &str) {
        self.send(format!("PING :{server}"), Priority::High);
    }

    /// Subscribe to engine events.
    pub fn subscribe(&mut self, listener: Listener) {
        self.session.bus.subscribe(listener);
    }

    /// Record a capability as enabled or disabled.
    pub fn set_capability(&mut self, name: &str, enabled: bool) {
        if enabled {
            self.session.caps.set_enabled(name);
        } else {
            self.session.caps.set_disabled(name);
        }
    }

    /// Apply a server ISUPPORT token this engine cares about
    /// (`PREFIX`, `CHANMODES`). Unknown keys are ignored.
    pub fn apply_isupport(&mut self, key: &str, value: Option<&str>) {
        match (key.to_ascii_uppercase().as_str(), value) {
            ("PREFIX", Some(spec)) => {
                if let Some(table) = PrefixModeTable::from_isupport(spec) {
                    self.session.prefix_modes = table;
                }
            }
            ("CHANMODES", Some(spec)) => {
                self.session.chan_modes.set_from_chanmodes(spec);
            }
            _ => {}
        }
    }

    /// Our current nickname.
    pub fn nickname(&self) -> &str {
        self.session.state.local_nick()
    }

    /// Look up a known user.
    pub fn user(&self, nick: &str) -> Option<&User> {
        self.session.state.user(nick)
    }

    /// Look up a joined channel.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.session.state.channel(name)
    }

    /// Iterate over joined channels.
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.session.state.channels()
    }

    /// The full state store, read-only.
    pub fn state(&self) -> &StateStore {
        &self.session.state
    }

    /// Tear the connection's bookkeeping down: correlation state and
    /// queued lines are discarded without emitting further events.
    pub fn shutdown(&mut self) {
        self.dispatcher.reset_all();
        self.session.out.clear();
        for channel in self.session.state.channels_mut() {
            channel.adding_names = false;
        }
    }
}

#[cfg(test)]
pub(crate) fn test_session(nickname: &str) -> Session {
    let mut state = StateStore::new(Casemapping::Rfc1459, nickname, "#&");
    state.add_user(User::new(nickname));
    Session {
        state,
        chan_modes: ModeTable::default_channel(),
        user_modes: ModeTable::default_user(),
        prefix_modes: PrefixModeTable::default(),
        bus: EventBus::new(),
        out: OutboundQueue::new(),
        caps: CapabilityMap::new(),
        auto_list_modes: false,
    }
}
