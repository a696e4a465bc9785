//! IRC case-mapping strategies.
//!
//! IRC compares nicknames and channel names case-insensitively, but the
//! exact rule is server-declared (ISUPPORT `CASEMAPPING`). The common
//! `rfc1459` mapping additionally treats `[`/`{`, `]`/`}`, `\`/`|` and
//! `~`/`^` as equivalent pairs.

/// A server-declared rule for folding and comparing identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Casemapping {
    /// Plain ASCII case folding.
    Ascii,
    /// RFC 1459 folding: ASCII plus `[]\~` -> `{}|^`.
    #[default]
    Rfc1459,
    /// RFC 1459 folding without the `~`/`^` pair.
    StrictRfc1459,
}

impl Casemapping {
    /// Look up a mapping by its ISUPPORT `CASEMAPPING=` value.
    pub fn from_name(name: &str) -> Option<Casemapping> {
        match name.to_ascii_lowercase().as_str() {
            "ascii" => Some(Casemapping::Ascii),
            "rfc1459" => Some(Casemapping::Rfc1459),
            "strict-rfc1459" => Some(Casemapping::StrictRfc1459),
            _ => None,
        }
    }

    fn fold_char(self, c: char) -> char {
        match (self, c) {
            (Casemapping::Ascii, 'A'..='Z') => c.to_ascii_lowercase(),
            (Casemapping::Ascii, _) => c,

            (Casemapping::Rfc1459, '~') => '^',
            (Casemapping::Rfc1459 | Casemapping::StrictRfc1459, '[') => '{',
            (Casemapping::Rfc1459 | Casemapping::StrictRfc1459, ']') => '}',
            (Casemapping::Rfc1459 | Casemapping::StrictRfc1459, '\\') => '|',
            (Casemapping::Rfc1459 | Casemapping::StrictRfc1459, 'A'..='Z') => {
                c.to_ascii_lowercase()
            }
            (Casemapping::Rfc1459 | Casemapping::StrictRfc1459, _) => c,
        }
    }

    /// Fold a string to its canonical lowercase form.
    pub fn to_lower(self, s: &str) -> String {
        s.chars().map(|c| self.fold_char(c)).collect()
    }

    /// Compare two strings case-insensitively under this mapping.
    pub fn eq(self, a: &str, b: &str) -> bool {
        if a.len() != b.len() {
            return false;
        }
        a.chars()
            .zip(b.chars())
            .all(|(ca, cb)| self.fold_char(ca) == self.fold_char(cb))
    }
}
