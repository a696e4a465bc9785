//! NICK processing.
//!
//! Renames re-key every structure indexed by the old nickname. A
//! rename whose target collides with a different known user is a fatal
//! inconsistency; it is reported with the old index entry already
//! removed and the channel memberships left keyed under the old name,
//! matching the long-standing behavior consumers depend on.

use chrono::{DateTime, Utc};

use crate::dispatch::Handler;
use crate::event::{Event, Severity};
use crate::line::Line;
use crate::session::Session;

/// Handler for NICK.
#[derive(Debug, Default)]
pub struct NickHandler;

impl Handler for NickHandler {
    fn handle(&mut self, session: &mut Session, ts: DateTime<Utc>, _key: &str, line: &Line<'_>) {
        let Some(source) = line.source else { return };
        let Some(new_nick) = line.last_param() else {
            return;
        };

        let casemap = session.state.casemap();
        let Some(user) = session.state.user(source.nick) else {
            return;
        };
        let old_nick = user.nickname.clone();

        // A case-only rename keeps the same index key under the
        // casemapping, so no re-keying is needed.
        let same_nick = casemap.eq(&old_nick, new_nick);

        if same_nick {
            if let Some(user) = session.state.user_mut(&old_nick) {
                user.nickname = new_nick.to_string();
            }
        } else {
            let Some(mut user) = session.state.take_user(&old_nick) else {
                return;
            };
            user.nickname = new_nick.to_string();
            if session.state.user(new_nick).is_some() {
                // The old index entry is already gone and memberships
                // still carry the old name; see module docs.
                session.report_violation(
                    ts,
                    Severity::Fatal,
                    format!("nick change {old_nick} -> {new_nick} would overwrite an existing user"),
                    line.raw,
                );
                return;
            }
            session.state.add_user(user);
        }

        if session.state.is_local(&old_nick) {
            session.state.set_local_nick(new_nick);
        }

        // Re-key channel memberships and announce per channel.
        let affected: Vec<String> = session
            .state
            .channels()
            .filter(|c| c.member(casemap, &old_nick).is_some())
            .map(|c| c.name.clone())
            .collect();
        for channel_name in affected {
            if let Some(channel) = session.state.channel_mut(&channel_name) {
                if let Some(member) = channel.member_mut(casemap, &old_nick) {
                    member.nick = new_nick.to_string();
                }
            }
            session.publish(
                ts,
                &Event::ChannelNickChange {
                    channel: channel_name,
                    old_nick: old_nick.clone(),
                    new_nick: new_nick.to_string(),
                },
            );
        }

        session.publish(
            ts,
            &Event::NickChange {
                old_nick,
                new_nick: new_nick.to_string(),
            },
        );
    }
}
