//! JOIN processing and pending-join key correlation.
//!
//! The server never echoes which key applied to which channel, so the
//! handler watches outbound JOIN commands and records a (channel,
//! guessed key) pair for every channel we are not already on. Inbound
//! confirmations and failure numerics consume the queue in strict FIFO
//! order; any mismatch means we have lost track of the pairing and the
//! whole queue is discarded.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use crate::dispatch::Handler;
use crate::event::{Event, Severity};
use crate::line::Line;
use crate::queue::Priority;
use crate::session::Session;
use crate::state::Channel;

use super::part::apply_part;

/// Inbound keys this handler registers for: JOIN, the create-time
/// numeric, and the join-failure numerics.
pub const INBOUND_KEYS: &[&str] = &[
    "JOIN", "329", "471", "473", "474", "475", "476", "477", "479",
];

#[derive(Clone, Debug)]
struct PendingJoin {
    channel: String,
    key: String,
}

/// Handler for the channel-join family.
#[derive(Debug, Default)]
pub struct JoinHandler {
    pending: VecDeque<PendingJoin>,
}

impl JoinHandler {
    /// New handler with an empty pending queue.
    pub fn new() -> JoinHandler {
        JoinHandler::default()
    }

    fn process_join(&mut self, session: &mut Session, ts: DateTime<Utc>, line: &Line<'_>) {
        let Some(source) = line.source else { return };
        if line.params.is_empty() {
            return;
        }

        let extended = session.caps.is_enabled("extended-join");
        let channel_name = if extended {
            line.params[0]
        } else {
            // Tolerate `JOIN :#chan` by taking the last parameter.
            line.params[line.params.len() - 1]
        };

        let nick = source.nick.to_string();
        let user = session.state.user_or_create(&nick);
        user.update_from_mask(source.raw);
        if extended {
            // :nick!id@host JOIN #chan accountName :Real Name
            let account = line.param(1).unwrap_or("*");
            user.account = if account == "*" {
                None
            } else {
                Some(account.to_string())
            };
            user.realname = if line.params.len() > 2 {
                line.last_param().map(str::to_string)
            } else {
                None
            };
        }

        let is_local = session.state.is_local(&nick);
        let casemap = session.state.casemap();

        if let Some(channel) = session.state.channel(channel_name) {
            if is_local {
                if channel.member(casemap, &nick).is_some() {
                    // The server should never show us joining a channel
                    // we are already recorded on.
                    session.report_violation(
                        ts,
                        Severity::Fatal,
                        format!("joined {channel_name}, which we are already on"),
                        line.raw,
                    );
                    return;
                }
                // We know the channel but are not a member of it: a
                // rejoin after external desync. Part internally, then
                // continue as a fresh join.
                warn!(channel = channel_name, "rejoining known channel, resyncing");
                apply_part(session, ts, channel_name, &nick, "");
            } else {
                if channel.member(casemap, &nick).is_some() {
                    trace!(channel = channel_name, nick = %nick, "already a member, ignoring");
                    return;
                }
                if let Some(channel) = session.state.channel_mut(channel_name) {
                    channel.add_member(casemap, &nick);
                }
                let channel = channel_name.to_string();
                session.publish(ts, &Event::ChannelJoin { channel, nick });
                return;
            }
        } else if !is_local {
            trace!(channel = channel_name, nick = %nick, "join for unknown channel, ignoring");
            return;
        }

        // Fresh self-join: build the channel, attach ourselves, ask for
        // its modes, and try to correlate the guessed key.
        let mut channel = Channel::new(channel_name);
        channel.add_member(casemap, &nick);

        match self.pending.pop_front() {
            Some(pending) if casemap.eq(&pending.channel, channel_name) => {
                debug!(channel = channel_name, "applying guessed channel key");
                channel.key = Some(pending.key);
            }
            Some(pending) => {
                warn!(
                    wanted = channel_name,
                    got = %pending.channel,
                    "pending join keys out of sync, clearing"
                );
                self.pending.clear();
            }
            None => {}
        }

        session.state.add_channel(channel);
        session
            .out
            .push(format!("MODE {channel_name}"), Priority::Low);
        session.publish(
            ts,
            &Event::SelfJoin {
                channel: channel_name.to_string(),
            },
        );
    }

    /// Numeric 329: channel creation time.
    fn process_create_time(&mut self, session: &mut Session, line: &Line<'_>) {
        let (Some(channel_name), Some(when)) = (line.param(1), line.param(2)) else {
            return;
        };
        if let Some(channel) = session.state.channel_mut(channel_name) {
            // Not every ircd sends a numeric timestamp here; leave the
            // field unset if it does not parse.
            channel.created_at = when.parse().ok();
        }
    }

    /// A join-failure numeric consumes one pending entry. No
    /// membership changes either way.
    fn process_failure(&mut self, session: &Session, key: &str, line: &Line<'_>) {
        let channel_name = line.param(1).unwrap_or("");
        let casemap = session.state.casemap();
        match self.pending.pop_front() {
            Some(pending) if casemap.eq(&pending.channel, channel_name) => {
                debug!(
                    numeric = key,
                    channel = %pending.channel,
                    "failed to join, skipping pending key"
                );
            }
            Some(pending) => {
                warn!(
                    numeric = key,
                    wanted = channel_name,
                    got = %pending.channel,
                    "failed join out of sync with pending keys, clearing"
                );
                self.pending.clear();
            }
            None => {}
        }
    }
}

impl Handler for JoinHandler {
    fn handle(&mut self, session: &mut Session, ts: DateTime<Utc>, key: &str, line: &Line<'_>) {
        match key {
            "JOIN" => self.process_join(session, ts, line),
            "329" => self.process_create_time(session, line),
            _ => self.process_failure(session, key, line),
        }
    }

    /// Outbound `JOIN #a,#b key1,key2`: remember one guessed key per
    /// channel we are not already on. Channels we are on are skipped
    /// because the server silently swallows their key attempts, and
    /// `0` is the part-all pseudo-channel.
    fn observe_outbound(&mut self, session: &mut Session, line: &Line<'_>) {
        let Some(channels) = line.param(0) else { return };
        let mut keys = line.param(1).unwrap_or("").split(',');

        for channel in channels.split(',') {
            let key = keys.next().unwrap_or("");
            if channel == "0" {
                trace!("ignoring key for part-all channel");
            } else if session.state.channel(channel).is_some() {
                trace!(channel, "ignoring key for channel we are already on");
            } else {
                trace!(channel, "recording guessed channel key");
                self.pending.push_back(PendingJoin {
                    channel: channel.to_string(),
                    key: key.to_string(),
                });
            }
        }
    }

    fn reset(&mut self) {
        self.pending.clear();
    }
}
