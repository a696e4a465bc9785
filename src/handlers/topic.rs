//! TOPIC processing (live TOPIC plus numerics 332/333).
//!
//! The join-time topic arrives in two halves: 332 carries the text,
//! 333 the setter and timestamp. The join-time topic event fires on
//! 333, or is synthesized at end-of-names for topicless channels; a
//! live TOPIC at any other time is a non-join topic event.

use chrono::{DateTime, Utc};

use crate::dispatch::Handler;
use crate::event::Event;
use crate::line::Line;
use crate::session::Session;

/// Handler for the topic family.
#[derive(Debug, Default)]
pub struct TopicHandler;

impl TopicHandler {
    fn publish_topic(
        &self,
        session: &mut Session,
        ts: DateTime<Utc>,
        channel_name: &str,
        is_join_topic: bool,
    ) {
        if let Some(channel) = session.state.channel_mut(channel_name) {
            channel.had_topic = true;
        }
        session.publish(
            ts,
            &Event::Topic {
                channel: channel_name.to_string(),
                is_join_topic,
            },
        );
    }
}

impl Handler for TopicHandler {
    fn handle(&mut self, session: &mut Session, ts: DateTime<Utc>, key: &str, line: &Line<'_>) {
        match key {
            // :server 332 us #chan :the topic
            "332" => {
                let (Some(channel_name), Some(text)) = (line.param(1), line.last_param()) else {
                    return;
                };
                if line.params.len() < 3 {
                    return;
                }
                if let Some(channel) = session.state.channel_mut(channel_name) {
                    channel.topic = text.to_string();
                }
            }
            // :server 333 us #chan setter 1234567890
            "333" => {
                let Some(channel_name) = line.param(1) else {
                    return;
                };
                if session.state.channel(channel_name).is_none() {
                    return;
                }
                if let Some(setter) = line.param(2) {
                    if let Some(channel) = session.state.channel_mut(channel_name) {
                        channel.topic_setter = setter.to_string();
                        if let Some(when) = line.param(3) {
                            // Non-numeric timestamps are left unset.
                            channel.topic_time = when.parse().ok();
                        }
                    }
                }
                self.publish_topic(session, ts, channel_name, true);
            }
            // :nick!id@host TOPIC #chan :new topic
            _ => {
                let (Some(channel_name), Some(text)) = (line.param(0), line.last_param()) else {
                    return;
                };
                if line.params.len() < 2 {
                    return;
                }
                let Some(source) = line.source else { return };
                if let Some(user) = session.state.user_mut(source.nick) {
                    user.update_from_mask(source.raw);
                }
                if session.state.channel(channel_name).is_none() {
                    return;
                }
                if let Some(channel) = session.state.channel_mut(channel_name) {
                    channel.topic = text.to_string();
                    channel.topic_setter = source.raw.to_string();
                    channel.topic_time = Some(ts.timestamp());
                }
                self.publish_topic(session, ts, channel_name, false);
            }
        }
    }
}
