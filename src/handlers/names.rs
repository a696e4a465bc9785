//! NAMES reply accumulation (numerics 353/366).
//!
//! A names listing arrives as any number of 353 fragments closed by a
//! 366. The first fragment of a fresh listing replaces whatever
//! membership list we held (re-sync); repeated 366s without an
//! intervening fragment are harmless.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::dispatch::Handler;
use crate::event::Event;
use crate::line::Line;
use crate::queue::Priority;
use crate::session::Session;
use crate::line::Source;

/// Handler for the NAMES numerics.
#[derive(Debug, Default)]
pub struct NamesHandler;

impl NamesHandler {
    /// 353: one fragment of space-separated `[prefixes]nick` tokens.
    /// Prefix runs translate to status-mode letters via the prefix
    /// table (`@+foo` style stacking included); the remainder may be a
    /// bare nick or a full mask under userhost-in-names.
    fn process_fragment(&mut self, session: &mut Session, line: &Line<'_>) {
        // :server 353 us = #chan :@op +voice plain
        let (Some(channel_name), Some(names)) = (line.param(2), line.last_param()) else {
            return;
        };
        if line.params.len() < 4 {
            return;
        }

        {
            let Some(channel) = session.state.channel_mut(channel_name) else {
                return;
            };
            if !channel.adding_names {
                // Not expecting names: this is a fresh listing.
                channel.clear_members();
            }
            channel.adding_names = true;
        }

        let casemap = session.state.casemap();
        for token in names.split(' ').filter(|t| !t.is_empty()) {
            let mut status = String::new();
            let mut rest = token;
            for (i, c) in token.char_indices() {
                match session.prefix_modes.mode_for_prefix(c) {
                    Some(letter) => status.push(letter),
                    None => {
                        rest = &token[i..];
                        break;
                    }
                }
            }
            if rest.is_empty() || session.prefix_modes.is_prefix(
                rest.chars().next().unwrap_or(' '),
            ) {
                // Token was nothing but prefixes.
                continue;
            }

            let mask = Source::parse(rest);
            trace!(nick = mask.nick, %status, "names entry");
            let user = session.state.user_or_create(mask.nick);
            user.update_from_mask(rest);
            let nick = user.nickname.clone();
            if let Some(channel) = session.state.channel_mut(channel_name) {
                let member = channel.add_member(casemap, &nick);
                member.status = status;
            }
        }
    }

    /// 366: end of names.
    fn process_end(&mut self, session: &mut Session, ts: DateTime<Utc>, line: &Line<'_>) {
        let Some(channel_name) = line.param(1) else {
            return;
        };
        let (name, had_topic, ask_list_modes, list_letters) = {
            let Some(channel) = session.state.channel_mut(channel_name) else {
                return;
            };
            channel.adding_names = false;
            let ask = session.auto_list_modes && !channel.asked_list_modes;
            if ask {
                channel.asked_list_modes = true;
            }
            let had_topic = channel.had_topic;
            if !had_topic {
                channel.had_topic = true;
            }
            (
                channel.name.clone(),
                had_topic,
                ask,
                session.chan_modes.list_letters(),
            )
        };

        if !had_topic {
            // The channel has no topic to report, but consumers still
            // get their join-time topic notification.
            session.publish(
                ts,
                &Event::Topic {
                    channel: name.clone(),
                    is_join_topic: true,
                },
            );
        }

        session.publish(
            ts,
            &Event::NamesComplete {
                channel: name.clone(),
            },
        );

        if ask_list_modes && !list_letters.is_empty() {
            session
                .out
                .push(format!("MODE {name} +{list_letters}"), Priority::Low);
        }
    }
}

impl Handler for NamesHandler {
    fn handle(&mut self, session: &mut Session, ts: DateTime<Utc>, key: &str, line: &Line<'_>) {
        match key {
            "353" => self.process_fragment(session, line),
            _ => self.process_end(session, ts, line),
        }
    }
}
