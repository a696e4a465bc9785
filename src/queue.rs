//! Outbound line queue.
//!
//! Lines queued for transmission carry a priority and are drained in
//! priority-then-FIFO order by a single writer. Anything that wants to
//! talk to the server (handlers, event listeners, the keepalive timer)
//! enqueues here rather than writing directly, which keeps all state
//! mutation on the one logical processing thread.

use std::collections::VecDeque;

/// Transmission priority of an outbound line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    /// Background traffic, e.g. reactive MODE queries on join.
    Low,
    /// Ordinary commands.
    #[default]
    Normal,
    /// Must go out ahead of everything else, e.g. PONG/PING.
    High,
}

/// Priority FIFO of raw outbound lines.
#[derive(Clone, Debug, Default)]
pub struct OutboundQueue {
    high: VecDeque<String>,
    normal: VecDeque<String>,
    low: VecDeque<String>,
}

impl OutboundQueue {
    /// Empty queue.
    pub fn new() -> OutboundQueue {
        OutboundQueue::default()
    }

    /// Enqueue a raw line at the given priority.
    pub fn push(&mut self, line: impl Into<String>, priority: Priority) {
        let line = line.into();
        match priority {
            Priority::High => self.high.push_back(line),
            Priority::Normal => self.normal.push_back(line),
            Priority::Low => self.low.push_back(line),
        }
    }

    /// Dequeue the next line: highest priority first, FIFO within a
    /// priority.
    pub fn pop(&mut self) -> Option<String> {
        self.high
            .pop_front()
            .or_else(|| self.normal.pop_front())
            .or_else(|| self.low.pop_front())
    }

    /// Number of queued lines.
    pub fn len(&self) -> usize {
        self.high.len() + self.normal.len() + self.low.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard everything without sending.
    pub fn clear(&mut self) {
        self.high.clear();
        self.normal.clear();
        self.low.clear();
    }
}
