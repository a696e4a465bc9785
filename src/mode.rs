//! Mode symbol tables.
//!
//! Three independent tables drive mode interpretation: channel modes,
//! user modes, and channel prefix (status) modes. Defaults follow RFC
//! 2812; servers reshape them at connect time via the ISUPPORT
//! `CHANMODES=A,B,C,D` and `PREFIX=(ov)@+` tokens.

use std::collections::HashMap;

/// How a mode letter consumes arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeKind {
    /// No argument ever (type D, e.g. `+n`).
    Boolean,
    /// Argument on set and unset (type B, e.g. `+k`).
    ParamAlways,
    /// Argument only when setting (type C, e.g. `+l`).
    ParamOnSet,
    /// List management; argument adds/removes an entry, no argument
    /// queries the list (type A, e.g. `+b`).
    List,
}

impl ModeKind {
    /// Whether a mode of this kind consumes an argument for the given
    /// direction.
    pub fn takes_arg(self, adding: bool) -> bool {
        match self {
            ModeKind::Boolean => false,
            ModeKind::ParamAlways | ModeKind::List => true,
            ModeKind::ParamOnSet => adding,
        }
    }
}

/// A single mode symbol table mapping a letter to its kind.
#[derive(Clone, Debug, Default)]
pub struct ModeTable {
    modes: HashMap<char, ModeKind>,
}

impl ModeTable {
    /// Empty table.
    pub fn new() -> ModeTable {
        ModeTable::default()
    }

    /// RFC 2812 channel modes.
    pub fn default_channel() -> ModeTable {
        let mut table = ModeTable::new();
        for c in "beI".chars() {
            table.add(c, ModeKind::List);
        }
        table.add('k', ModeKind::ParamAlways);
        table.add('l', ModeKind::ParamOnSet);
        for c in "imnpstr".chars() {
            table.add(c, ModeKind::Boolean);
        }
        table
    }

    /// RFC 2812 user modes (all boolean).
    pub fn default_user() -> ModeTable {
        let mut table = ModeTable::new();
        for c in "iwors".chars() {
            table.add(c, ModeKind::Boolean);
        }
        table
    }

    /// Register a mode letter.
    pub fn add(&mut self, letter: char, kind: ModeKind) {
        self.modes.insert(letter, kind);
    }

    /// Kind of a letter, if known.
    pub fn kind(&self, letter: char) -> Option<ModeKind> {
        self.modes.get(&letter).copied()
    }

    /// Letters of every list-kind mode, in sorted order. Used for the
    /// reactive list-mode query on join.
    pub fn list_letters(&self) -> String {
        let mut letters: Vec<char> = self
            .modes
            .iter()
            .filter(|(_, k)| **k == ModeKind::List)
            .map(|(c, _)| *c)
            .collect();
        letters.sort_unstable();
        letters.into_iter().collect()
    }

    /// Replace the channel-mode contents from an ISUPPORT
    /// `CHANMODES=A,B,C,D` value. Malformed values leave the table
    /// untouched.
    pub fn set_from_chanmodes(&mut self, spec: &str) -> bool {
        let mut parts = spec.splitn(4, ',');
        let (Some(a), Some(b), Some(c), Some(d)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        self.modes.clear();
        for ch in a.chars() {
            self.add(ch, ModeKind::List);
        }
        for ch in b.chars() {
            self.add(ch, ModeKind::ParamAlways);
        }
        for ch in c.chars() {
            self.add(ch, ModeKind::ParamOnSet);
        }
        for ch in d.chars() {
            self.add(ch, ModeKind::Boolean);
        }
        true
    }
}

/// Prefix (status) mode table: mode letter <-> NAMES prefix symbol,
/// with a rank for precedence. Lower rank index = more powerful.
#[derive(Clone, Debug)]
pub struct PrefixModeTable {
    /// Mode letters in rank order (e.g. `"ov"`).
    letters: Vec<char>,
    /// Prefix symbols in the same order (e.g. `"@+"`).
    symbols: Vec<char>,
}

impl Default for PrefixModeTable {
    fn default() -> PrefixModeTable {
        PrefixModeTable {
            letters: vec!['o', 'v'],
            symbols: vec!['@', '+'],
        }
    }
}

impl PrefixModeTable {
    /// Build from an ISUPPORT `PREFIX=(ov)@+` value. Returns `None`
    /// when the shape is wrong or the halves differ in length.
    pub fn from_isupport(spec: &str) -> Option<PrefixModeTable> {
        let rest = spec.strip_prefix('(')?;
        let close = rest.find(')')?;
        let letters: Vec<char> = rest[..close].chars().collect();
        let symbols: Vec<char> = rest[close + 1..].chars().collect();
        if letters.is_empty() || letters.len() != symbols.len() {
            return None;
        }
        Some(PrefixModeTable { letters, symbols })
    }

    /// Whether `c` is a known prefix symbol (`@`, `+`, ...).
    pub fn is_prefix(&self, c: char) -> bool {
        self.symbols.contains(&c)
    }

    /// Whether `c` is a known status mode letter (`o`, `v`, ...).
    pub fn is_prefix_mode(&self, c: char) -> bool {
        self.letters.contains(&c)
    }

    /// Mode letter for a prefix symbol.
    pub fn mode_for_prefix(&self, symbol: char) -> Option<char> {
        self.symbols
            .iter()
            .position(|s| *s == symbol)
            .map(|i| self.letters[i])
    }

    /// Prefix symbol for a mode letter.
    pub fn prefix_for_mode(&self, letter: char) -> Option<char> {
        self.letters
            .iter()
            .position(|l| *l == letter)
            .map(|i| self.symbols[i])
    }

    /// Rank of a mode letter; lower is more powerful.
    pub fn rank(&self, letter: char) -> Option<usize> {
        self.letters.iter().position(|l| *l == letter)
    }

    /// Insert `letter` into a status string, keeping it sorted by rank
    /// and free of duplicates.
    pub fn insert_sorted(&self, status: &str, letter: char) -> String {
        if status.contains(letter) {
            return status.to_string();
        }
        let mut held: Vec<char> = status.chars().collect();
        held.push(letter);
        held.sort_by_key(|c| self.rank(*c).unwrap_or(usize::MAX));
        held.into_iter().collect()
    }
}
