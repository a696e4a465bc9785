//! The authoritative in-memory model of the connection's visible
//! world: known users, joined channels, and the membership links
//! between them. All lookups fold names through the connection's
//! [`Casemapping`] strategy.
//!
//! Entities are created on first reference (a join, or being named in
//! a NAMES/MODE/TOPIC line for a channel we know) and destroyed when we
//! leave the channel or the user is no longer visible anywhere.

use std::collections::{BTreeSet, HashMap};

use crate::casemap::Casemapping;
use crate::line::Source;

/// A user visible to this connection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct User {
    /// Current nickname; the identity key (folded) in the store.
    pub nickname: String,
    /// Ident, empty until learned from a source mask.
    pub ident: String,
    /// Hostname, empty until learned from a source mask.
    pub hostname: String,
    /// Services account, if announced (extended-join).
    pub account: Option<String>,
    /// Real name, if announced (extended-join).
    pub realname: Option<String>,
    /// Held user-mode flags.
    pub modes: BTreeSet<char>,
}

impl User {
    /// New user known only by nickname.
    pub fn new(nickname: impl Into<String>) -> User {
        User {
            nickname: nickname.into(),
            ..User::default()
        }
    }

    /// Fill ident/hostname from a `nick!user@host` mask if they are
    /// still unknown. Does not touch the nickname.
    pub fn update_from_mask(&mut self, mask: &str) {
        if !self.hostname.is_empty() {
            return;
        }
        let source = Source::parse(mask);
        if !source.host.is_empty() {
            self.ident = source.user.to_string();
            self.hostname = source.host.to_string();
        }
    }

    /// Whether a user-mode flag is set.
    pub fn has_mode(&self, letter: char) -> bool {
        self.modes.contains(&letter)
    }
}

/// One user's presence on one channel, with the prefix-mode letters
/// they hold there. Owned by its channel; it has no identity outside
/// the (channel, user) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Membership {
    /// The member's nickname (display form; compared via casemapping).
    pub nick: String,
    /// Held status-mode letters, sorted by rank (e.g. `"ov"`).
    pub status: String,
}

impl Membership {
    fn new(nick: impl Into<String>) -> Membership {
        Membership {
            nick: nick.into(),
            status: String::new(),
        }
    }

    /// Whether the member holds a given status mode.
    pub fn has_status(&self, letter: char) -> bool {
        self.status.contains(letter)
    }
}

/// A channel this connection is on.
#[derive(Clone, Debug, Default)]
pub struct Channel {
    /// Channel name; the identity key (folded) in the store.
    pub name: String,
    /// Topic text, empty when unset.
    pub topic: String,
    /// Who set the topic (nick or full mask, as the server gave it).
    pub topic_setter: String,
    /// When the topic was set, epoch seconds.
    pub topic_time: Option<i64>,
    /// Latched once the first topic event for this channel has fired;
    /// join-time topic synthesis checks this.
    pub had_topic: bool,
    /// A NAMES listing is currently accumulating.
    pub adding_names: bool,
    /// The one-shot list-modes request has been issued.
    pub asked_list_modes: bool,
    /// Server-supplied creation time (numeric 329), epoch seconds.
    pub created_at: Option<i64>,
    /// The join key we guessed for this channel, once confirmed.
    pub key: Option<String>,
    /// Boolean channel-mode flags currently set.
    pub flags: BTreeSet<char>,
    /// Parameterized channel-mode values (e.g. `l` -> `"50"`).
    pub mode_params: HashMap<char, String>,
    members: Vec<Membership>,
}

impl Channel {
    /// New, empty channel.
    pub fn new(name: impl Into<String>) -> Channel {
        Channel {
            name: name.into(),
            ..Channel::default()
        }
    }

    /// Membership records in NAMES/arrival order.
    pub fn members(&self) -> &[Membership] {
        &self.members
    }

    /// Look up a member by nickname.
    pub fn member(&self, casemap: Casemapping, nick: &str) -> Option<&Membership> {
        self.members.iter().find(|m| casemap.eq(&m.nick, nick))
    }

    /// Mutable member lookup.
    pub fn member_mut(&mut self, casemap: Casemapping, nick: &str) -> Option<&mut Membership> {
        self.members.iter_mut().find(|m| casemap.eq(&m.nick, nick))
    }

    /// Add a member, or return the existing record for the nickname.
    pub fn add_member(&mut self, casemap: Casemapping, nick: &str) -> &mut Membership {
        if let Some(idx) = self.members.iter().position(|m| casemap.eq(&m.nick, nick)) {
            return &mut self.members[idx];
        }
        self.members.push(Membership::new(nick));
        self.members.last_mut().expect("just pushed")
    }

    /// Remove a member. Returns the record if it existed.
    pub fn remove_member(&mut self, casemap: Casemapping, nick: &str) -> Option<Membership> {
        let idx = self.members.iter().position(|m| casemap.eq(&m.nick, nick))?;
        Some(self.members.remove(idx))
    }

    /// Drop every membership (fresh NAMES re-sync).
    pub fn clear_members(&mut self) {
        self.members.clear();
    }

    /// Whether a boolean channel mode is set.
    pub fn has_flag(&self, letter: char) -> bool {
        self.flags.contains(&letter)
    }
}

/// The state store: users and channels, keyed through the casemapping.
#[derive(Debug, Default)]
pub struct StateStore {
    casemap: Casemapping,
    chantypes: String,
    local_nick: String,
    users: HashMap<String, User>,
    channels: HashMap<String, Channel>,
}

impl StateStore {
    /// New store for a connection using `local_nick`.
    pub fn new(casemap: Casemapping, local_nick: impl Into<String>, chantypes: &str) -> StateStore {
        StateStore {
            casemap,
            chantypes: chantypes.to_string(),
            local_nick: local_nick.into(),
            users: HashMap::new(),
            channels: HashMap::new(),
        }
    }

    /// The active casemapping strategy.
    pub fn casemap(&self) -> Casemapping {
        self.casemap
    }

    /// Fold a name to its lookup key.
    pub fn fold(&self, name: &str) -> String {
        self.casemap.to_lower(name)
    }

    /// Our own current nickname.
    pub fn local_nick(&self) -> &str {
        &self.local_nick
    }

    /// Record a change of our own nickname.
    pub fn set_local_nick(&mut self, nick: impl Into<String>) {
        self.local_nick = nick.into();
    }

    /// Whether `nick` is us, under the casemapping.
    pub fn is_local(&self, nick: &str) -> bool {
        self.casemap.eq(&self.local_nick, nick)
    }

    /// Whether `name` looks like a channel name (leading CHANTYPES
    /// character).
    pub fn is_channel_name(&self, name: &str) -> bool {
        name.chars()
            .next()
            .is_some_and(|c| self.chantypes.contains(c))
    }

    // --- users ---

    /// Look up a user by nickname.
    pub fn user(&self, nick: &str) -> Option<&User> {
        self.users.get(&self.fold(nick))
    }

    /// Mutable user lookup.
    pub fn user_mut(&mut self, nick: &str) -> Option<&mut User> {
        let key = self.fold(nick);
        self.users.get_mut(&key)
    }

    /// Insert a user under its (folded) nickname, replacing any
    /// existing entry that compares equal.
    pub fn add_user(&mut self, user: User) {
        self.users.insert(self.fold(&user.nickname), user);
    }

    /// Look up a user, creating it if unknown. Returns a mutable
    /// reference either way.
    pub fn user_or_create(&mut self, nick: &str) -> &mut User {
        let key = self.fold(nick);
        self.users.entry(key).or_insert_with(|| User::new(nick))
    }

    /// Remove a user from the index without touching memberships.
    /// The rename path uses this; everything else wants
    /// [`StateStore::remove_user`].
    pub fn take_user(&mut self, nick: &str) -> Option<User> {
        let key = self.fold(nick);
        self.users.remove(&key)
    }

    /// Remove a user and every membership it holds.
    pub fn remove_user(&mut self, nick: &str) -> Option<User> {
        let casemap = self.casemap;
        for channel in self.channels.values_mut() {
            channel.remove_member(casemap, nick);
        }
        self.take_user(nick)
    }

    /// Drop a user that is no longer visible: not us, and on no
    /// channel we know. Returns true if it was removed.
    pub fn gc_user(&mut self, nick: &str) -> bool {
        if self.is_local(nick) {
            return false;
        }
        let casemap = self.casemap;
        if self
            .channels
            .values()
            .any(|c| c.member(casemap, nick).is_some())
        {
            return false;
        }
        self.take_user(nick).is_some()
    }

    // --- channels ---

    /// Look up a channel by name.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&self.fold(name))
    }

    /// Mutable channel lookup.
    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        let key = self.fold(name);
        self.channels.get_mut(&key)
    }

    /// Insert a channel, replacing any entry that compares equal.
    pub fn add_channel(&mut self, channel: Channel) {
        self.channels.insert(self.fold(&channel.name), channel);
    }

    /// Remove a channel and its memberships. Users left visible
    /// nowhere are dropped too.
    pub fn remove_channel(&mut self, name: &str) -> Option<Channel> {
        let key = self.fold(name);
        let channel = self.channels.remove(&key)?;
        let nicks: Vec<String> = channel.members().iter().map(|m| m.nick.clone()).collect();
        for nick in nicks {
            self.gc_user(&nick);
        }
        Some(channel)
    }

    /// Iterate over known channels (unspecified order).
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// Iterate mutably over known channels.
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.channels.values_mut()
    }
}
