use veil_common::{EmailAddress, Identity};

use crate::grammar::{Segment, tokenize, unescape_name};

/// One half of a decoded alias.
///
/// Fields are taken verbatim from the alias and are not validated; use
/// [`AliasPart::address`] to get a usable mailbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasPart {
    pub local_part: String,
    pub domain: String,
    pub name: String,
}

impl AliasPart {
    fn new(segment: Segment<'_>, domain: &str) -> Self {
        Self {
            local_part: segment.local.to_string(),
            domain: domain.to_string(),
            name: segment.name.map(unescape_name).unwrap_or_default(),
        }
    }

    /// Whether nothing at all was recovered for this half.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local_part.is_empty() && self.domain.is_empty() && self.name.is_empty()
    }

    /// The mailbox, if the recovered pieces form a valid one.
    #[must_use]
    pub fn address(&self) -> Option<EmailAddress> {
        EmailAddress::from_parts(&self.local_part, &self.domain).ok()
    }

    /// The mailbox together with the recovered display name.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.address().map(|address| Identity::new(address, self.name.as_str()))
    }
}

/// Both identities recovered from an alias
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedAlias {
    /// The owned mailbox the alias was sent from
    pub owned: AliasPart,
    /// The external sender replies should go back to; empty when the alias
    /// did not embed one.
    pub sender: AliasPart,
}

/// Recover both identities from an alias.
///
/// This never fails. An address without the sender markers decodes to its
/// whole local-part as the owned half and an empty sender.
///
/// ```
/// use veil_alias::decode;
///
/// let decoded = decode("sales{Sales_Team}+spammer{John_Smith}=bad.com@mine.com");
/// assert_eq!(decoded.owned.local_part, "sales");
/// assert_eq!(decoded.owned.name, "Sales Team");
/// assert_eq!(decoded.sender.domain, "bad.com");
///
/// let decoded = decode("plainuser@domain.com");
/// assert_eq!(decoded.owned.local_part, "plainuser");
/// assert!(decoded.sender.is_empty());
/// ```
#[must_use]
pub fn decode(alias: &str) -> DecodedAlias {
    let alias = alias.trim();
    let alias = alias
        .strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(alias);

    let tokens = tokenize(alias);

    DecodedAlias {
        owned: AliasPart::new(tokens.owned, tokens.owned_domain),
        sender: tokens
            .sender
            .map(|(segment, domain)| AliasPart::new(segment, domain))
            .unwrap_or_default(),
    }
}
