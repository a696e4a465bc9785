//! PART processing.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::dispatch::Handler;
use crate::event::Event;
use crate::line::Line;
use crate::session::Session;

/// Remove `nick` from `channel_name` and publish the matching event.
///
/// When the leaver is us the whole channel is destroyed. Shared with
/// the join handler, which synthesizes a part when it sees us rejoin a
/// channel it thought we were already tracking.
pub(crate) fn apply_part(
    session: &mut Session,
    ts: DateTime<Utc>,
    channel_name: &str,
    nick: &str,
    message: &str,
) {
    let casemap = session.state.casemap();

    if session.state.is_local(nick) {
        if session.state.remove_channel(channel_name).is_some() {
            session.publish(
                ts,
                &Event::SelfPart {
                    channel: channel_name.to_string(),
                    message: message.to_string(),
                },
            );
        }
        return;
    }

    let Some(channel) = session.state.channel_mut(channel_name) else {
        return;
    };
    if channel.remove_member(casemap, nick).is_none() {
        trace!(channel = channel_name, nick, "part for non-member, ignoring");
        return;
    }
    session.publish(
        ts,
        &Event::ChannelPart {
            channel: channel_name.to_string(),
            nick: nick.to_string(),
            message: message.to_string(),
        },
    );
    session.state.gc_user(nick);
}

/// Handler for PART.
#[derive(Debug, Default)]
pub struct PartHandler;

impl Handler for PartHandler {
    fn handle(&mut self, session: &mut Session, ts: DateTime<Utc>, _key: &str, line: &Line<'_>) {
        let Some(source) = line.source else { return };
        let Some(channel_name) = line.param(0) else {
            return;
        };
        let message = if line.params.len() > 1 {
            line.last_param().unwrap_or("")
        } else {
            ""
        };

        if let Some(user) = session.state.user_mut(source.nick) {
            user.update_from_mask(source.raw);
        }
        apply_part(session, ts, channel_name, source.nick, message);
    }
}
