//! Per-connection mutable context handed to handlers.

use chrono::{DateTime, Utc};
use tracing::error;

use crate::caps::CapabilityMap;
use crate::event::{Event, EventBus, ProtocolViolation, Severity};
use crate::mode::{ModeTable, PrefixModeTable};
use crate::queue::OutboundQueue;
use crate::state::StateStore;

/// Everything a handler may read or mutate while processing one line:
/// the state store, the mode tables, the event bus, the outbound queue
/// and the capability bookkeeping. One session = one connection; all
/// mutation happens on the single logical processing thread.
#[derive(Debug)]
pub struct Session {
    /// Users, channels, memberships.
    pub state: StateStore,
    /// Channel mode symbol table.
    pub chan_modes: ModeTable,
    /// User mode symbol table.
    pub user_modes: ModeTable,
    /// Prefix/status mode table.
    pub prefix_modes: PrefixModeTable,
    /// Event fan-out.
    pub bus: EventBus,
    /// Outbound lines awaiting the writer.
    pub out: OutboundQueue,
    /// Negotiated capability state.
    pub caps: CapabilityMap,
    /// Issue the one-shot list-modes query after end-of-names.
    pub auto_list_modes: bool,
}

impl Session {
    /// Publish an event to every subscriber.
    pub fn publish(&mut self, ts: DateTime<Utc>, event: &Event) {
        self.bus.publish(ts, event, &mut self.out);
    }

    /// Report a state inconsistency: logged, then published as
    /// [`Event::Violation`]. The connection is left up; teardown is the
    /// consumer's call.
    pub fn report_violation(
        &mut self,
        ts: DateTime<Utc>,
        severity: Severity,
        message: impl Into<String>,
        raw_line: &str,
    ) {
        let violation = ProtocolViolation {
            severity,
            message: message.into(),
            raw_line: raw_line.to_string(),
        };
        error!(?severity, line = raw_line, "{}", violation.message);
        self.publish(ts, &Event::Violation(violation));
    }
}
