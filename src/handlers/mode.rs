//! MODE processing (live MODE plus numerics 324/221).
//!
//! Walks a mode string left to right under a +/- direction, consuming
//! arguments according to each letter's kind in the mode tables.
//! Prefix modes mutate membership status; list modes consume their
//! argument without storing list contents; unknown letters are skipped.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::dispatch::Handler;
use crate::event::Event;
use crate::line::Line;
use crate::mode::ModeKind;
use crate::session::Session;

/// Handler for the mode family.
#[derive(Debug, Default)]
pub struct ModeHandler;

impl ModeHandler {
    fn apply_channel_modes(
        &self,
        session: &mut Session,
        ts: DateTime<Utc>,
        channel_name: &str,
        mode_str: &str,
        args: &[&str],
    ) {
        if session.state.channel(channel_name).is_none() {
            return;
        }
        let casemap = session.state.casemap();

        let mut adding = true;
        let mut arg_iter = args.iter().copied();

        for c in mode_str.chars() {
            match c {
                '+' => adding = true,
                '-' => adding = false,
                ':' => {}
                _ if session.prefix_modes.is_prefix_mode(c) => {
                    let Some(target) = arg_iter.next() else {
                        trace!(mode = %c, "prefix mode without target, skipping");
                        continue;
                    };
                    let Some(channel) = session.state.channel_mut(channel_name) else {
                        return;
                    };
                    let Some(member) = channel.member_mut(casemap, target) else {
                        trace!(mode = %c, target, "status change for non-member, skipping");
                        continue;
                    };
                    if adding {
                        member.status = session.prefix_modes.insert_sorted(&member.status, c);
                    } else {
                        member.status.retain(|held| held != c);
                    }
                }
                _ => {
                    let Some(kind) = session.chan_modes.kind(c) else {
                        trace!(mode = %c, "unknown channel mode, skipping");
                        continue;
                    };
                    let arg = if kind.takes_arg(adding) {
                        arg_iter.next()
                    } else {
                        None
                    };
                    let Some(channel) = session.state.channel_mut(channel_name) else {
                        return;
                    };
                    match kind {
                        ModeKind::Boolean => {
                            if adding {
                                channel.flags.insert(c);
                            } else {
                                channel.flags.remove(&c);
                            }
                        }
                        ModeKind::ParamAlways | ModeKind::ParamOnSet => {
                            if adding {
                                if let Some(value) = arg {
                                    channel.mode_params.insert(c, value.to_string());
                                }
                            } else {
                                channel.mode_params.remove(&c);
                            }
                        }
                        // List contents are not tracked; the argument
                        // has been consumed above.
                        ModeKind::List => {}
                    }
                }
            }
        }

        let mut modes = mode_str.to_string();
        for arg in args {
            modes.push(' ');
            modes.push_str(arg);
        }
        session.publish(
            ts,
            &Event::ChannelModeChange {
                channel: channel_name.to_string(),
                modes,
            },
        );
    }

    fn apply_user_modes(
        &self,
        session: &mut Session,
        ts: DateTime<Utc>,
        nick: &str,
        mode_str: &str,
    ) {
        {
            let Some(user) = session.state.user_mut(nick) else {
                return;
            };
            let mut adding = true;
            for c in mode_str.chars() {
                match c {
                    '+' => adding = true,
                    '-' => adding = false,
                    ':' => {}
                    _ => {
                        if adding {
                            user.modes.insert(c);
                        } else {
                            user.modes.remove(&c);
                        }
                    }
                }
            }
        }
        session.publish(
            ts,
            &Event::UserModeChange {
                nick: nick.to_string(),
                modes: mode_str.to_string(),
            },
        );
    }
}

impl Handler for ModeHandler {
    fn handle(&mut self, session: &mut Session, ts: DateTime<Utc>, key: &str, line: &Line<'_>) {
        match key {
            // :server 324 us #chan +nt [args...]
            "324" => {
                let (Some(channel_name), Some(mode_str)) = (line.param(1), line.param(2)) else {
                    return;
                };
                let args: Vec<&str> = line.params.iter().skip(3).copied().collect();
                self.apply_channel_modes(session, ts, channel_name, mode_str, &args);
            }
            // :server 221 us +iw
            "221" => {
                let (Some(nick), Some(mode_str)) = (line.param(0), line.param(1)) else {
                    return;
                };
                self.apply_user_modes(session, ts, nick, mode_str);
            }
            // :setter MODE target modes [args...]
            _ => {
                let (Some(target), Some(mode_str)) = (line.param(0), line.param(1)) else {
                    return;
                };
                if session.state.is_channel_name(target) {
                    let args: Vec<&str> = line.params.iter().skip(2).copied().collect();
                    self.apply_channel_modes(session, ts, target, mode_str, &args);
                } else {
                    self.apply_user_modes(session, ts, target, mode_str);
                }
            }
        }
    }
}
