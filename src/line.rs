//! Line tokenizer.
//!
//! Splits one raw protocol line into an optional sender prefix, a
//! command (or three-digit numeric) token, and an ordered parameter
//! list, honoring the trailing-parameter rule: the final parameter may
//! contain spaces when introduced by a lone leading `:`.
//!
//! Tokenizing never panics on arbitrary input. A line that carries too
//! few parameters for a given handler is that handler's silent-ignore
//! case, not a tokenizer failure.

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    error::VerboseError,
    sequence::preceded,
    IResult,
};
use thiserror::Error;

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Errors from [`Line::tokenize`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TokenizeError {
    /// Line was empty (or whitespace only).
    #[error("empty line")]
    EmptyLine,
    /// No command token could be found.
    #[error("missing command")]
    MissingCommand,
}

/// The sender of a line, parsed from a `nick!user@host` mask.
///
/// Server senders have no `!`/`@` separators; the whole mask is then
/// the nick and `user`/`host` are empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Source<'a> {
    /// The raw mask as it appeared on the wire (without the leading `:`).
    pub raw: &'a str,
    /// Nickname (or server name).
    pub nick: &'a str,
    /// Ident, if present.
    pub user: &'a str,
    /// Hostname, if present.
    pub host: &'a str,
}

impl<'a> Source<'a> {
    /// Split a `nick!user@host` mask into its parts.
    pub fn parse(raw: &'a str) -> Source<'a> {
        let (nick_user, host) = match raw.find('@') {
            Some(at) => (&raw[..at], &raw[at + 1..]),
            None => (raw, ""),
        };
        let (nick, user) = match nick_user.find('!') {
            Some(bang) => (&nick_user[..bang], &nick_user[bang + 1..]),
            None => (nick_user, ""),
        };
        Source {
            raw,
            nick,
            user,
            host,
        }
    }
}

/// One tokenized protocol line, borrowing from the raw input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line<'a> {
    /// The sender prefix, if the line carried one.
    pub source: Option<Source<'a>>,
    /// Command name or three-digit numeric, as written.
    pub command: &'a str,
    /// Ordered parameters; the last may contain spaces (trailing rule).
    pub params: Vec<&'a str>,
    /// The raw line, CR/LF trimmed.
    pub raw: &'a str,
}

/// IRCv3 tags section (after `@`, before the first space). Tolerated
/// and discarded; this engine does not consume tags.
fn parse_tags(input: &str) -> ParseResult<&str, &str> {
    preceded(char('@'), take_until(" "))(input)
}

/// Sender prefix (after `:`, before the first space).
fn parse_prefix(input: &str) -> ParseResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

fn parse_command(input: &str) -> ParseResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric())(input)
}

fn parse_line(input: &str) -> ParseResult<&str, (Option<&str>, &str, Vec<&str>)> {
    let (input, _tags) = opt(parse_tags)(input)?;
    let (input, _) = space0(input)?;
    let (input, prefix) = opt(parse_prefix)(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = parse_command(input)?;

    let mut params: Vec<&str> = Vec::new();
    let mut rest = input;

    while let Some(b' ') = rest.as_bytes().first().copied() {
        rest = &rest[1..];

        if let Some(b':') = rest.as_bytes().first().copied() {
            // Trailing parameter, runs to the end of line.
            params.push(&rest[1..]);
            rest = "";
            break;
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        let param = &rest[..end];
        if param.is_empty() {
            break;
        }
        params.push(param);
        rest = &rest[end..];
    }

    Ok((rest, (prefix, command, params)))
}

impl<'a> Line<'a> {
    /// Tokenize one raw line.
    pub fn tokenize(s: &'a str) -> Result<Line<'a>, TokenizeError> {
        let trimmed = s.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            return Err(TokenizeError::EmptyLine);
        }

        match parse_line(trimmed) {
            Ok((_rest, (prefix, command, params))) => Ok(Line {
                source: prefix.map(Source::parse),
                command,
                params,
                raw: trimmed,
            }),
            Err(_) => Err(TokenizeError::MissingCommand),
        }
    }

    /// Parameter at `idx`, if present.
    pub fn param(&self, idx: usize) -> Option<&'a str> {
        self.params.get(idx).copied()
    }

    /// The last parameter (the trailing text for most commands).
    pub fn last_param(&self) -> Option<&'a str> {
        self.params.last().copied()
    }
}
