//! QUIT processing.

use chrono::{DateTime, Utc};

use crate::dispatch::Handler;
use crate::event::Event;
use crate::line::Line;
use crate::session::Session;

/// Handler for QUIT: the user disappears from every channel at once.
#[derive(Debug, Default)]
pub struct QuitHandler;

impl Handler for QuitHandler {
    fn handle(&mut self, session: &mut Session, ts: DateTime<Utc>, _key: &str, line: &Line<'_>) {
        let Some(source) = line.source else { return };
        if session.state.is_local(source.nick) {
            // Our own quit means the connection is going away; the
            // consumer tears state down via shutdown.
            return;
        }
        if session.state.user(source.nick).is_none() {
            return;
        }

        let message = line.last_param().unwrap_or("").to_string();
        session.state.remove_user(source.nick);
        session.publish(
            ts,
            &Event::Quit {
                nick: source.nick.to_string(),
                message,
            },
        );
    }
}
