//! Per-command-family handlers.
//!
//! Each handler is a plain value implementing [`Handler`], registered
//! with the dispatcher under the command and numeric keys it serves.

mod join;
mod kick;
mod mode;
mod names;
mod nick;
mod part;
mod quit;
mod topic;
mod wallops;

pub use self::join::JoinHandler;
pub use self::kick::KickHandler;
pub use self::mode::ModeHandler;
pub use self::names::NamesHandler;
pub use self::nick::NickHandler;
pub use self::part::PartHandler;
pub use self::quit::QuitHandler;
pub use self::topic::TopicHandler;
pub use self::wallops::WallopsHandler;

use crate::dispatch::Dispatcher;

/// Register the full default handler set.
pub fn register_defaults(dispatcher: &mut Dispatcher) {
    dispatcher.register(Box::new(JoinHandler::new()), join::INBOUND_KEYS, &["JOIN"]);
    dispatcher.register(Box::new(PartHandler), &["PART"], &[]);
    dispatcher.register(Box::new(QuitHandler), &["QUIT"], &[]);
    dispatcher.register(Box::new(KickHandler), &["KICK"], &[]);
    dispatcher.register(Box::new(NickHandler), &["NICK"], &[]);
    dispatcher.register(Box::new(TopicHandler), &["TOPIC", "332", "333"], &[]);
    dispatcher.register(Box::new(NamesHandler), &["353", "366"], &[]);
    dispatcher.register(Box::new(ModeHandler), &["MODE", "324", "221"], &[]);
    dispatcher.register(Box::new(WallopsHandler), &["WALLOPS"], &[]);
}
