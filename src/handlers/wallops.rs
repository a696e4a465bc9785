//! WALLOPS classification.
//!
//! Servers overload WALLOPS with a first-character discriminator:
//! `*` for operator walls, `$` for walluser broadcasts, anything else
//! is treated as a desync wall with the body passed through intact.

use chrono::{DateTime, Utc};

use crate::dispatch::Handler;
use crate::event::Event;
use crate::line::Line;
use crate::session::Session;

/// Handler for WALLOPS.
#[derive(Debug, Default)]
pub struct WallopsHandler;

impl Handler for WallopsHandler {
    fn handle(&mut self, session: &mut Session, ts: DateTime<Utc>, _key: &str, line: &Line<'_>) {
        let Some(source) = line.source else { return };
        let Some(body) = line.last_param() else {
            return;
        };
        let sender = source.raw.to_string();

        // The discriminator only counts when there is something after
        // it to strip it from.
        if let Some((head, rest)) = body.split_once(' ') {
            if head.starts_with('*') {
                session.publish(
                    ts,
                    &Event::Wallop {
                        source: sender,
                        message: rest.to_string(),
                    },
                );
                return;
            }
            if head.starts_with('$') {
                session.publish(
                    ts,
                    &Event::Walluser {
                        source: sender,
                        message: rest.to_string(),
                    },
                );
                return;
            }
        }

        session.publish(
            ts,
            &Event::WallDesync {
                source: sender,
                message: body.to_string(),
            },
        );
    }
}
