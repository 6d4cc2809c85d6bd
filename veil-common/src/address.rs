//! RFC 5321 mailbox parsing
//!
//! Addresses arrive from the inbound envelope, from parsed `From:`/`To:`
//! headers and from configuration. All of them are parsed into an
//! [`EmailAddress`] at the boundary, so the rest of the system only ever sees
//! a mailbox with exactly one `@` and non-empty local-part and domain.
//!
//! # ABNF Grammar (RFC 5321 Section 4.1.2)
//!
//! ```text
//! Mailbox        = Local-part "@" ( Domain / address-literal )
//! Local-part     = Dot-string / Quoted-string
//! Dot-string     = Atom *("." Atom)
//! Atom           = 1*atext
//! Quoted-string  = DQUOTE *QcontentSMTP DQUOTE
//! Domain         = sub-domain *("." sub-domain)
//! sub-domain     = Let-dig [Ldh-str]
//! address-literal = "[" ( IPv4-address-literal / IPv6-address-literal / General-address-literal ) "]"
//! ```
//!
//! UTF-8 letters are accepted in atoms and sub-domains (RFC 6531), since the
//! `From:` addresses we are handed are not guaranteed to be ASCII.
//!
//! # Size Constraints
//!
//! - Maximum local-part: 64 octets
//! - Maximum domain: 255 octets

use std::{
    fmt::{self, Display},
    net::{Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// Result type for address parsing
pub type Result<T> = std::result::Result<T, AddressError>;

const MAX_LOCAL_PART: usize = 64;
const MAX_DOMAIN: usize = 255;

/// A parsed mailbox (`local-part@domain`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress {
    local_part: String,
    domain: String,
}

impl EmailAddress {
    /// Parse an address, with or without surrounding angle brackets.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressError`] when the input is not a valid mailbox.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let mailbox = if let Some(inner) = trimmed.strip_prefix('<') {
            inner
                .strip_suffix('>')
                .ok_or(AddressError::MissingCloseBracket)?
        } else if trimmed.ends_with('>') {
            return Err(AddressError::MissingOpenBracket);
        } else {
            trimmed
        };

        let at = find_unquoted_at(mailbox)?;

        Self::from_parts(&mailbox[..at], &mailbox[at + 1..])
    }

    /// Build an address from an already split local-part and domain.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressError`] if either half is invalid on its own.
    pub fn from_parts(local_part: &str, domain: &str) -> Result<Self> {
        if local_part.len() > MAX_LOCAL_PART {
            return Err(AddressError::LocalPartTooLong);
        }

        Self::synthetic(local_part, domain)
    }

    /// Build an address veil generated itself.
    ///
    /// The syntax is checked as for [`EmailAddress::from_parts`], but the
    /// 64-octet local-part limit is not enforced: aliases routinely exceed
    /// it and are accepted by most servers regardless.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressError`] if either half is invalid on its own.
    pub fn synthetic(local_part: &str, domain: &str) -> Result<Self> {
        if domain.len() > MAX_DOMAIN {
            return Err(AddressError::DomainTooLong);
        }

        parse_local_part(local_part)?;
        parse_domain_or_address_literal(domain)?;

        Ok(Self {
            local_part: local_part.to_string(),
            domain: domain.to_string(),
        })
    }

    #[must_use]
    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Whether the local-part is a quoted string rather than a dot-string.
    #[must_use]
    pub fn is_quoted(&self) -> bool {
        self.local_part.starts_with('"')
    }

    /// The local-part without its sub-address, i.e. `sales` for `sales+promo`.
    ///
    /// Quoted local-parts are returned untouched.
    #[must_use]
    pub fn base_local_part(&self) -> &str {
        if self.is_quoted() {
            return &self.local_part;
        }

        self.local_part
            .split_once('+')
            .map_or(self.local_part.as_str(), |(base, _)| base)
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

impl FromStr for EmailAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.to_string()
    }
}

/// Find the byte position of the '@' that is not inside a quoted string or
/// address literal
fn find_unquoted_at(input: &str) -> Result<usize> {
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut prev_was_backslash = false;

    for (i, ch) in input.char_indices() {
        if ch == '"' && !prev_was_backslash && !in_brackets {
            in_quotes = !in_quotes;
        } else if ch == '[' && !in_quotes {
            in_brackets = true;
        } else if ch == ']' && !in_quotes {
            in_brackets = false;
        } else if ch == '@' && !in_quotes && !in_brackets {
            return Ok(i);
        }

        prev_was_backslash = ch == '\\' && !prev_was_backslash;
    }

    Err(AddressError::MissingAtSign)
}

/// Parse a local-part: Dot-string or Quoted-string
fn parse_local_part(input: &str) -> Result<()> {
    if input.is_empty() {
        return Err(AddressError::InvalidLocalPart(
            "Empty local-part".to_string(),
        ));
    }

    if input.starts_with('"') {
        parse_quoted_string(input)
    } else {
        parse_dot_string(input)
    }
}

/// Parse a Dot-string: Atom *("." Atom)
fn parse_dot_string(input: &str) -> Result<()> {
    if input.starts_with('.') || input.ends_with('.') {
        return Err(AddressError::InvalidLocalPart(
            "Dot-string cannot start or end with '.'".to_string(),
        ));
    }

    if input.contains("..") {
        return Err(AddressError::InvalidLocalPart(
            "Dot-string cannot contain consecutive dots".to_string(),
        ));
    }

    for atom in input.split('.') {
        if let Some(ch) = atom.chars().find(|&ch| !is_atext(ch)) {
            return Err(AddressError::InvalidLocalPart(format!(
                "Invalid character '{ch}' in atom"
            )));
        }
    }

    Ok(())
}

/// Parse a Quoted-string: DQUOTE *`QcontentSMTP` DQUOTE
fn parse_quoted_string(input: &str) -> Result<()> {
    if input.len() < 2 || !input.ends_with('"') {
        return Err(AddressError::UnclosedQuotedString);
    }

    let content = &input[1..input.len() - 1];

    let mut chars = content.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) if next.is_ascii_graphic() || next == ' ' => {}
                Some(next) => {
                    return Err(AddressError::InvalidQuotedString(format!(
                        "Invalid quoted-pair: \\{next}"
                    )));
                }
                None => {
                    return Err(AddressError::InvalidQuotedString(
                        "Backslash at end of quoted string".to_string(),
                    ));
                }
            }
        } else if ch == '"' {
            return Err(AddressError::InvalidQuotedString(
                "Unescaped '\"' in quoted string".to_string(),
            ));
        } else if !is_qtext_smtp(ch) {
            return Err(AddressError::InvalidQuotedString(format!(
                "Invalid character '{ch}' in quoted string"
            )));
        }
    }

    Ok(())
}

/// Parse domain or address-literal
fn parse_domain_or_address_literal(input: &str) -> Result<()> {
    if input.starts_with('[') {
        parse_address_literal(input)
    } else {
        parse_domain(input)
    }
}

/// Parse a Domain: sub-domain *("." sub-domain)
fn parse_domain(input: &str) -> Result<()> {
    if input.is_empty() {
        return Err(AddressError::InvalidDomain("Empty domain".to_string()));
    }

    if input.starts_with('.') || input.ends_with('.') {
        return Err(AddressError::InvalidDomain(
            "Domain cannot start or end with '.'".to_string(),
        ));
    }

    if input.contains("..") {
        return Err(AddressError::InvalidDomain(
            "Domain cannot contain consecutive dots".to_string(),
        ));
    }

    input.split('.').try_for_each(parse_subdomain)
}

/// Parse a sub-domain: Let-dig [Ldh-str]
fn parse_subdomain(input: &str) -> Result<()> {
    let (Some(first), Some(last)) = (input.chars().next(), input.chars().last()) else {
        return Err(AddressError::InvalidDomain("Empty subdomain".to_string()));
    };

    if !first.is_alphanumeric() {
        return Err(AddressError::InvalidDomain(format!(
            "Subdomain must start with letter or digit, got '{first}'"
        )));
    }

    if !last.is_alphanumeric() {
        return Err(AddressError::InvalidDomain(format!(
            "Subdomain must end with letter or digit, got '{last}'"
        )));
    }

    if let Some(ch) = input.chars().find(|&ch| !ch.is_alphanumeric() && ch != '-') {
        return Err(AddressError::InvalidDomain(format!(
            "Invalid character '{ch}' in subdomain"
        )));
    }

    Ok(())
}

/// Parse an address-literal: `[IPv4]` or `[IPv6:...]` or `[tag:...]`
fn parse_address_literal(input: &str) -> Result<()> {
    let Some(content) = input.strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
        return Err(AddressError::InvalidAddressLiteral(
            "Address literal must be enclosed in brackets".to_string(),
        ));
    };

    if content.parse::<Ipv4Addr>().is_ok() {
        return Ok(());
    }

    if let Some(ipv6) = content.strip_prefix("IPv6:")
        && ipv6.parse::<Ipv6Addr>().is_ok()
    {
        return Ok(());
    }

    if let Some((tag, value)) = content.split_once(':')
        && !tag.is_empty()
        && !value.is_empty()
    {
        return Ok(());
    }

    Err(AddressError::InvalidAddressLiteral(format!(
        "Invalid address literal format: {content}"
    )))
}

/// Check if character is valid atext (atom text)
///
/// atext = ALPHA / DIGIT / "!" / "#" / "$" / "%" / "&" / "'" /
///         "*" / "+" / "-" / "/" / "=" / "?" / "^" / "_" / "\`" /
///         "{" / "|" / "}" / "~" / UTF8-non-ascii
#[inline]
pub fn is_atext(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
        || (!ch.is_ascii() && ch.is_alphanumeric())
}

/// Check if character is valid qtextSMTP (quoted text for SMTP)
///
/// qtextSMTP = %d32-33 / %d35-91 / %d93-126
#[inline]
const fn is_qtext_smtp(ch: char) -> bool {
    matches!(ch as u32, 32..=33 | 35..=91 | 93..=126)
}
