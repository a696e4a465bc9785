//! Typed events and the synchronous event bus.
//!
//! Handlers publish events as they mutate state; the bus fans each one
//! out to every subscriber in subscription order, on the same logical
//! thread that processed the inbound line. Listeners that want to react
//! with protocol traffic enqueue lines through the [`OutboundQueue`]
//! handle they are given; they never re-enter dispatch.

use chrono::{DateTime, Utc};

use crate::queue::OutboundQueue;

/// Severity of a reported protocol violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Worth surfacing to the user, recoverable.
    User,
    /// The connection's view of the world can no longer be trusted.
    /// The core does not tear the connection down; that decision
    /// belongs to the consumer.
    Fatal,
}

/// A state inconsistency detected while processing a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolViolation {
    /// How bad it is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// The raw line that triggered the report.
    pub raw_line: String,
}

/// Events raised by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// We joined a channel.
    SelfJoin { channel: String },
    /// Someone else joined a channel we are on.
    ChannelJoin { channel: String, nick: String },
    /// We left a channel.
    SelfPart { channel: String, message: String },
    /// Someone else left a channel we are on.
    ChannelPart {
        channel: String,
        nick: String,
        message: String,
    },
    /// Someone was kicked from a channel we are on.
    ChannelKick {
        channel: String,
        nick: String,
        kicked_by: String,
        message: String,
    },
    /// A user we share channels with quit.
    Quit { nick: String, message: String },
    /// A user changed nickname (one per rename).
    NickChange { old_nick: String, new_nick: String },
    /// Per-channel view of a rename (one per channel the user is on).
    ChannelNickChange {
        channel: String,
        old_nick: String,
        new_nick: String,
    },
    /// Channel topic, either discovered at join time or changed live.
    Topic {
        channel: String,
        is_join_topic: bool,
    },
    /// A NAMES listing for a channel completed.
    NamesComplete { channel: String },
    /// Channel modes changed.
    ChannelModeChange { channel: String, modes: String },
    /// Our own user modes changed.
    UserModeChange { nick: String, modes: String },
    /// Operator wallops (`*`-discriminated body).
    Wallop { source: String, message: String },
    /// Walluser broadcast (`$`-discriminated body).
    Walluser { source: String, message: String },
    /// Undiscriminated WALLOPS body.
    WallDesync { source: String, message: String },
    /// A protocol violation was detected; see [`ProtocolViolation`].
    Violation(ProtocolViolation),
}

/// A subscriber. Receives the event timestamp, the event, and a handle
/// for enqueueing outbound lines.
pub type Listener = Box<dyn FnMut(DateTime<Utc>, &Event, &mut OutboundQueue)>;

/// Synchronous publish/subscribe fan-out.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    /// Bus with no subscribers.
    pub fn new() -> EventBus {
        EventBus::default()
    }

    /// Register a listener. Listeners are invoked in subscription order
    /// and cannot be removed.
    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Deliver an event to every subscriber.
    pub fn publish(&mut self, ts: DateTime<Utc>, event: &Event, out: &mut OutboundQueue) {
        for listener in &mut self.listeners {
            listener(ts, event, out);
        }
    }

    /// Number of subscribers.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
