//! Property-based replay tests for membership tracking.
//!
//! Random JOIN/PART/KICK/QUIT/NICK sequences are replayed both through
//! a full [`Client`] and through a deliberately naive reference model
//! of the membership rules; the two must agree on which users and
//! channels are known afterwards. Verifies that:
//! 1. Processing never panics, whatever the sequence
//! 2. Membership bookkeeping matches the reference rules
//! 3. Users are garbage collected exactly when no longer visible

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use proptest::prelude::*;
use slirc_client::{Client, ClientConfig};

const ME: &str = "me";
const CHANNELS: &[&str] = &["#a", "#b", "#c"];
const NICKS: &[&str] = &["alice", "bob", "carol", "dave"];

#[derive(Clone, Debug)]
enum Op {
    SelfJoin(&'static str),
    OtherJoin(&'static str, &'static str),
    SelfPart(&'static str),
    OtherPart(&'static str, &'static str),
    Kick(&'static str, &'static str),
    Quit(&'static str),
    Rename(&'static str, &'static str),
}

impl Op {
    fn to_line(&self) -> String {
        match self {
            Op::SelfJoin(c) => format!(":{ME}!id@host JOIN {c}"),
            Op::OtherJoin(c, n) => format!(":{n}!id@host JOIN {c}"),
            Op::SelfPart(c) => format!(":{ME}!id@host PART {c}"),
            Op::OtherPart(c, n) => format!(":{n}!id@host PART {c} :bye"),
            Op::Kick(c, n) => format!(":op!id@host KICK {c} {n} :out"),
            Op::Quit(n) => format!(":{n}!id@host QUIT :gone"),
            Op::Rename(old, new) => format!(":{old}!id@host NICK :{new}"),
        }
    }
}

fn channel_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CHANNELS.to_vec())
}

fn nick_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(NICKS.to_vec())
}

/// Kick victims include us, so channel destruction gets exercised.
fn victim_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![nick_strategy(), Just(ME)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        channel_strategy().prop_map(Op::SelfJoin),
        (channel_strategy(), nick_strategy()).prop_map(|(c, n)| Op::OtherJoin(c, n)),
        channel_strategy().prop_map(Op::SelfPart),
        (channel_strategy(), nick_strategy()).prop_map(|(c, n)| Op::OtherPart(c, n)),
        (channel_strategy(), victim_strategy()).prop_map(|(c, n)| Op::Kick(c, n)),
        nick_strategy().prop_map(Op::Quit),
        (nick_strategy(), nick_strategy()).prop_map(|(old, new)| Op::Rename(old, new)),
    ]
}

/// Reference model: a user index plus per-channel member sets. The
/// nick pools are lowercase ASCII, so name folding is the identity and
/// plain string comparison matches the casemapped lookups.
#[derive(Debug, Default)]
struct Model {
    users: BTreeSet<String>,
    channels: BTreeMap<String, BTreeSet<String>>,
}

impl Model {
    fn new() -> Model {
        let mut model = Model::default();
        model.users.insert(ME.to_string());
        model
    }

    fn visible_somewhere(&self, nick: &str) -> bool {
        self.channels.values().any(|members| members.contains(nick))
    }

    fn gc(&mut self, nick: &str) {
        if nick != ME && !self.visible_somewhere(nick) {
            self.users.remove(nick);
        }
    }

    fn destroy_channel(&mut self, chan: &str) {
        if let Some(members) = self.channels.remove(chan) {
            for member in members {
                self.gc(&member);
            }
        }
    }

    fn apply(&mut self, op: &Op) {
        match op {
            Op::SelfJoin(c) => {
                // A join we see always registers its sender.
                self.users.insert(ME.to_string());
                if let Some(members) = self.channels.get(*c) {
                    if members.contains(ME) {
                        // Inconsistency report, no state change.
                        return;
                    }
                    // Desynced rejoin: the old channel is torn down
                    // before the fresh join below.
                    self.destroy_channel(c);
                }
                let mut members = BTreeSet::new();
                members.insert(ME.to_string());
                self.channels.insert(c.to_string(), members);
            }
            Op::OtherJoin(c, n) => {
                self.users.insert(n.to_string());
                if let Some(members) = self.channels.get_mut(*c) {
                    members.insert(n.to_string());
                }
            }
            Op::SelfPart(c) => {
                self.destroy_channel(c);
            }
            Op::OtherPart(c, n) | Op::Kick(c, n) if *n != ME => {
                if let Some(members) = self.channels.get_mut(*c) {
                    if members.remove(*n) {
                        self.gc(n);
                    }
                }
            }
            Op::Kick(c, _) => {
                // Kicking us destroys the channel, like a self part.
                self.destroy_channel(c);
            }
            Op::OtherPart(..) => {}
            Op::Quit(n) => {
                if !self.users.contains(*n) {
                    return;
                }
                for members in self.channels.values_mut() {
                    members.remove(*n);
                }
                self.users.remove(*n);
            }
            Op::Rename(old, new) => {
                if old == new || !self.users.contains(*old) {
                    return;
                }
                self.users.remove(*old);
                if self.users.contains(*new) {
                    // Collision: the old index entry is already gone
                    // and memberships keep the old name.
                    return;
                }
                self.users.insert(new.to_string());
                for members in self.channels.values_mut() {
                    if members.remove(*old) {
                        members.insert(new.to_string());
                    }
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn replay_matches_reference_model(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut client = Client::new(ClientConfig::new(ME));
        let mut model = Model::new();

        for op in &ops {
            client.process_line(Utc::now(), &op.to_line());
            model.apply(op);
        }

        for chan in CHANNELS {
            let tracked = client.channel(chan);
            let expected = model.channels.get(*chan);
            prop_assert_eq!(
                tracked.is_some(),
                expected.is_some(),
                "channel {} presence diverged after {:?}",
                chan,
                ops
            );
            if let (Some(channel), Some(members)) = (tracked, expected) {
                let seen: BTreeSet<String> = channel
                    .members()
                    .iter()
                    .map(|m| m.nick.clone())
                    .collect();
                prop_assert_eq!(&seen, members, "members of {} diverged", chan);
            }
        }

        for nick in NICKS.iter().chain([&ME]) {
            prop_assert_eq!(
                client.user(nick).is_some(),
                model.users.contains(*nick),
                "user {} presence diverged after {:?}",
                nick,
                ops
            );
        }
    }

    #[test]
    fn arbitrary_lines_never_panic(lines in prop::collection::vec(".{0,64}", 0..20)) {
        let mut client = Client::new(ClientConfig::new(ME));
        for line in &lines {
            client.process_line(Utc::now(), line);
        }
        while client.next_outbound().is_some() {}
    }
}
