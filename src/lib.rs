//! # slirc-client
//!
//! A sans-IO IRC client protocol engine: line tokenization, command
//! dispatch, and connection state tracking (users, channels,
//! memberships, modes, topics) with a typed event stream.
//!
//! ## Features
//!
//! - Tokenizer for server lines (prefix, command, trailing parameter)
//! - Pluggable per-command handler dispatch, numerics included
//! - Casemapped state store of users, channels, and memberships
//! - Channel/user mode tracking driven by configurable mode tables
//! - Join-key correlation, NAMES accumulation, topic provenance
//! - Prioritized outbound queue with pre-transmission observation
//! - Protocol-violation reporting instead of silent divergence
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use slirc_client::{Client, ClientConfig, Priority};
//!
//! let mut client = Client::new(ClientConfig::new("me"));
//! client.subscribe(Box::new(|_ts, event, _out| {
//!     println!("{event:?}");
//! }));
//!
//! client.send("JOIN #rust", Priority::Normal);
//! while let Some(line) = client.next_outbound() {
//!     // hand `line` to the transport
//!     let _ = line;
//! }
//!
//! client.process_line(Utc::now(), ":me!id@host JOIN #rust");
//! assert!(client.channel("#rust").is_some());
//! ```

#![deny(clippy::all)]

pub mod caps;
pub mod casemap;
pub mod client;
pub mod dispatch;
pub mod event;
pub mod handlers;
pub mod line;
pub mod mode;
pub mod queue;
pub mod session;
pub mod state;

pub use self::caps::{CapabilityMap, CapabilityState};
pub use self::casemap::Casemapping;
pub use self::client::{Client, ClientConfig};
pub use self::dispatch::{Dispatcher, Handler};
pub use self::event::{Event, EventBus, Listener, ProtocolViolation, Severity};
pub use self::line::{Line, Source, TokenizeError};
pub use self::mode::{ModeKind, ModeTable, PrefixModeTable};
pub use self::queue::{OutboundQueue, Priority};
pub use self::session::Session;
pub use self::state::{Channel, Membership, StateStore, User};
