//! KICK processing.

use chrono::{DateTime, Utc};

use crate::dispatch::Handler;
use crate::event::Event;
use crate::line::Line;
use crate::session::Session;

/// Handler for KICK. Removal semantics mirror PART: when the victim is
/// us the channel is destroyed, otherwise only the membership goes.
#[derive(Debug, Default)]
pub struct KickHandler;

impl Handler for KickHandler {
    fn handle(&mut self, session: &mut Session, ts: DateTime<Utc>, _key: &str, line: &Line<'_>) {
        let Some(source) = line.source else { return };
        let (Some(channel_name), Some(victim)) = (line.param(0), line.param(1)) else {
            return;
        };
        let message = if line.params.len() > 2 {
            line.last_param().unwrap_or("")
        } else {
            ""
        };

        let casemap = session.state.casemap();
        let removed = if session.state.is_local(victim) {
            session.state.remove_channel(channel_name).is_some()
        } else {
            match session.state.channel_mut(channel_name) {
                Some(channel) => channel.remove_member(casemap, victim).is_some(),
                None => false,
            }
        };
        if !removed {
            return;
        }

        session.publish(
            ts,
            &Event::ChannelKick {
                channel: channel_name.to_string(),
                nick: victim.to_string(),
                kicked_by: source.nick.to_string(),
                message: message.to_string(),
            },
        );
        session.state.gc_user(victim);
    }
}
