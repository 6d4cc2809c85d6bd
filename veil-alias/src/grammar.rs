//! Alias grammar
//!
//! ```text
//! alias   = segment "+" segment "=" sender-domain "@" owned-domain
//! segment = local-part [ "{" name "}" ]
//! name    = word *( "_" word )
//! ```
//!
//! An alias is split by three fixed-order rules, each taking a specific
//! occurrence of its marker:
//!
//! 1. the **last** `@` separates the owned domain,
//! 2. the **first** `+` separates the owned segment from the remainder,
//! 3. the **last** `=` in the remainder separates the sender segment from the
//!    sender's domain.
//!
//! The sender's local-part may itself contain `+` or `=`, the owned one may
//! contain `=`, and domains contain neither, so these occurrences are always
//! the structural ones for aliases produced by the encoder.

use veil_common::address::is_atext;

pub(crate) const AT: char = '@';
pub(crate) const SENDER: char = '+';
pub(crate) const SENDER_AT: char = '=';
pub(crate) const NAME_OPEN: char = '{';
pub(crate) const NAME_CLOSE: char = '}';
pub(crate) const WORD_BREAK: char = '_';

/// A local-part with its optional trailing `{name}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub local: &'a str,
    pub name: Option<&'a str>,
}

impl<'a> Segment<'a> {
    /// The name is opened by the last `{` and must close the segment.
    pub(crate) fn parse(segment: &'a str) -> Self {
        if let Some(body) = segment.strip_suffix(NAME_CLOSE)
            && let Some(open) = body.rfind(NAME_OPEN)
        {
            return Self {
                local: &body[..open],
                name: Some(&body[open + NAME_OPEN.len_utf8()..]),
            };
        }

        Self {
            local: segment,
            name: None,
        }
    }

    pub(crate) fn write(local: &str, name: &str, out: &mut String) {
        out.push_str(local);
        if !name.is_empty() {
            out.push(NAME_OPEN);
            out.push_str(name);
            out.push(NAME_CLOSE);
        }
    }
}

/// The located pieces of an alias
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tokens<'a> {
    pub owned: Segment<'a>,
    pub owned_domain: &'a str,
    /// The sender segment and domain; absent unless both `+` and a later `=`
    /// are present.
    pub sender: Option<(Segment<'a>, &'a str)>,
}

pub(crate) fn tokenize(alias: &str) -> Tokens<'_> {
    let (local, owned_domain) = alias.rsplit_once(AT).unwrap_or((alias, ""));

    let split = local.split_once(SENDER).and_then(|(owned, remainder)| {
        remainder
            .rsplit_once(SENDER_AT)
            .map(|(sender, sender_domain)| (owned, sender, sender_domain))
    });

    match split {
        Some((owned, sender, sender_domain)) => Tokens {
            owned: Segment::parse(owned),
            owned_domain,
            sender: Some((Segment::parse(sender), sender_domain)),
        },
        None => Tokens {
            owned: Segment::parse(local),
            owned_domain,
            sender: None,
        },
    }
}

/// Characters a display name keeps once embedded: atext minus the grammar's
/// own markers. `_` is excluded here because it is the word separator.
fn is_name_char(ch: char) -> bool {
    is_atext(ch) && !matches!(ch, SENDER | SENDER_AT | NAME_OPEN | NAME_CLOSE | WORD_BREAK)
}

/// Normalize a display name for embedding in an alias.
///
/// Words are separated by whitespace or `_` and rejoined with a single `_`;
/// characters that are not valid in a local-part, or that are grammar
/// markers, are dropped.
///
/// ```
/// use veil_alias::escape_name;
///
/// assert_eq!(escape_name("Sales Team"), "Sales_Team");
/// assert_eq!(escape_name("  Jane   Doe "), "Jane_Doe");
/// assert_eq!(escape_name("J. R. \"Bob\" Dobbs"), "J_R_Bob_Dobbs");
/// ```
#[must_use]
pub fn escape_name(name: &str) -> String {
    name.split(|ch: char| ch.is_whitespace() || ch == WORD_BREAK)
        .map(|word| word.chars().filter(|&ch| is_name_char(ch)).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Expand an embedded name back into a display name, title-casing each word.
///
/// ```
/// use veil_alias::unescape_name;
///
/// assert_eq!(unescape_name("Sales_Team"), "Sales Team");
/// assert_eq!(unescape_name("jane_doe"), "Jane Doe");
/// ```
#[must_use]
pub fn unescape_name(encoded: &str) -> String {
    encoded
        .split(WORD_BREAK)
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
