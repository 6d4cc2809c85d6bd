use std::fmt::{self, Display};

use veil_common::{Config, Domain, EmailAddress, Identity, NamedAddress, internal};

use crate::{
    error::AliasError,
    grammar::{AT, NAME_CLOSE, NAME_OPEN, SENDER, SENDER_AT, Segment, escape_name},
};

/// A synthetic sender address, along with the two identities it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    address: String,
    mailbox: EmailAddress,
    owned: Identity,
    sender: Identity,
}

impl Alias {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.address
    }

    /// The alias as a mailbox. It may exceed the usual local-part length
    /// limit.
    #[must_use]
    pub const fn mailbox(&self) -> &EmailAddress {
        &self.mailbox
    }

    /// The owned mailbox the alias was built from, without any sub-address.
    #[must_use]
    pub const fn owned(&self) -> &Identity {
        &self.owned
    }

    /// The external sender embedded in the alias.
    #[must_use]
    pub const fn sender(&self) -> &Identity {
        &self.sender
    }
}

impl Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl AsRef<str> for Alias {
    fn as_ref(&self) -> &str {
        &self.address
    }
}

impl From<Alias> for String {
    fn from(alias: Alias) -> Self {
        alias.address
    }
}

/// Builds aliases for a fixed set of owned domains and fallback mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasCodec {
    owned_domains: Vec<Domain>,
    default_alias: EmailAddress,
}

impl AliasCodec {
    /// # Errors
    ///
    /// Returns [`AliasError::Configuration`] if `default_alias` is not a valid
    /// mailbox, or [`AliasError::Unencodable`] if it cannot be used as the
    /// owned half of an alias.
    pub fn new(owned_domains: Vec<Domain>, default_alias: &str) -> Result<Self, AliasError> {
        let default_alias = parse_default(default_alias)?;
        owned_local_part(&default_alias)?;

        Ok(Self {
            owned_domains,
            default_alias,
        })
    }

    /// # Errors
    ///
    /// See [`AliasCodec::new`].
    pub fn from_config(config: &Config) -> Result<Self, AliasError> {
        Self::new(config.my_domains.clone(), &config.default_alias)
    }

    #[must_use]
    pub fn owned_domains(&self) -> &[Domain] {
        &self.owned_domains
    }

    #[must_use]
    pub const fn default_alias(&self) -> &EmailAddress {
        &self.default_alias
    }

    /// Build the alias for a message from `sender` to `recipients`.
    ///
    /// The owned mailbox is the first recipient whose domain is, exactly, one
    /// of the owned domains; recipients that do not parse are skipped. Without
    /// a match the default alias is used and carries no name.
    ///
    /// # Errors
    ///
    /// - [`AliasError::MalformedAddress`] if `sender` is not a valid mailbox
    /// - [`AliasError::Unencodable`] if either mailbox cannot be embedded
    pub fn encode(
        &self,
        recipients: &[NamedAddress],
        sender: &NamedAddress,
    ) -> Result<Alias, AliasError> {
        build(recipients, &self.owned_domains, sender, || {
            Ok(self.default_alias.clone())
        })
    }
}

/// Build an alias without holding on to an [`AliasCodec`].
///
/// `default_alias` is only parsed when no recipient is in an owned domain.
///
/// # Errors
///
/// As [`AliasCodec::encode`], plus [`AliasError::Configuration`] if the
/// default alias is needed and is not a valid mailbox.
pub fn encode(
    recipients: &[NamedAddress],
    owned_domains: &[Domain],
    default_alias: &str,
    sender: &NamedAddress,
) -> Result<Alias, AliasError> {
    build(recipients, owned_domains, sender, || {
        parse_default(default_alias)
    })
}

fn parse_default(default_alias: &str) -> Result<EmailAddress, AliasError> {
    EmailAddress::parse(default_alias).map_err(|source| AliasError::Configuration {
        address: default_alias.to_string(),
        source,
    })
}

fn build<F>(
    recipients: &[NamedAddress],
    owned_domains: &[Domain],
    sender: &NamedAddress,
    fallback: F,
) -> Result<Alias, AliasError>
where
    F: FnOnce() -> Result<EmailAddress, AliasError>,
{
    let sender = sender
        .parse()
        .map_err(|source| AliasError::MalformedAddress {
            address: sender.address.clone(),
            source,
        })?;
    check_sender(&sender.address)?;

    let owned = match select_owned(recipients, owned_domains) {
        Some(owned) => owned,
        None => Identity::unnamed(fallback()?),
    };
    let owned = Identity::new(
        EmailAddress::from_parts(owned_local_part(&owned.address)?, owned.address.domain())
            .map_err(|_| AliasError::Unencodable {
                address: owned.address.to_string(),
                reason: "the local-part is not valid once its sub-address is removed",
            })?,
        owned.name,
    );

    let mut local = String::with_capacity(
        owned.address.local_part().len()
            + owned.name.len()
            + sender.address.local_part().len()
            + sender.name.len()
            + sender.address.domain().len()
            + 6,
    );
    Segment::write(owned.address.local_part(), &escape_name(&owned.name), &mut local);
    local.push(SENDER);
    Segment::write(
        sender.address.local_part(),
        &escape_name(&sender.name),
        &mut local,
    );
    local.push(SENDER_AT);
    local.push_str(sender.address.domain());

    let mailbox = EmailAddress::synthetic(&local, owned.address.domain()).map_err(|_| {
        AliasError::Unencodable {
            address: sender.address.to_string(),
            reason: "the resulting alias is not a valid address",
        }
    })?;
    let address = format!("{local}{AT}{}", owned.address.domain());

    internal!("Created alias {address} for {sender} via {owned}");

    Ok(Alias {
        address,
        mailbox,
        owned,
        sender,
    })
}

fn select_owned(recipients: &[NamedAddress], owned_domains: &[Domain]) -> Option<Identity> {
    recipients
        .iter()
        .filter_map(|recipient| recipient.parse().ok())
        .find(|recipient| owned_domains.iter().any(|domain| domain.owns(&recipient.address)))
}

fn has_name_marker(local_part: &str) -> bool {
    local_part.contains([NAME_OPEN, NAME_CLOSE])
}

/// The owned local-part as it will be embedded: sub-address removed.
fn owned_local_part(address: &EmailAddress) -> Result<&str, AliasError> {
    if address.is_quoted() {
        return Err(AliasError::Unencodable {
            address: address.to_string(),
            reason: "quoted local-parts are not supported",
        });
    }

    let local = address.base_local_part();
    if has_name_marker(local) {
        return Err(AliasError::Unencodable {
            address: address.to_string(),
            reason: "the local-part contains '{' or '}'",
        });
    }

    Ok(local)
}

fn check_sender(address: &EmailAddress) -> Result<(), AliasError> {
    let reason = if address.is_quoted() {
        "quoted local-parts are not supported"
    } else if has_name_marker(address.local_part()) {
        "the local-part contains '{' or '}'"
    } else if address.domain().starts_with('[') {
        "address literals are not supported"
    } else {
        return Ok(());
    };

    Err(AliasError::Unencodable {
        address: address.to_string(),
        reason,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn codec() -> AliasCodec {
        AliasCodec::new(vec![Domain::new("mine.com")], "catchall@mine.com").unwrap()
    }

    #[test]
    fn test_encode_example() {
        let alias = codec()
            .encode(
                &[NamedAddress::new("sales@mine.com", "Sales Team")],
                &NamedAddress::new("spammer@bad.com", "John Smith"),
            )
            .unwrap();

        assert_eq!(
            alias.as_str(),
            "sales{Sales_Team}+spammer{John_Smith}=bad.com@mine.com"
        );
        assert_eq!(alias.mailbox().to_string(), alias.as_str());
        assert_eq!(alias.owned().to_string(), "Sales Team <sales@mine.com>");
        assert_eq!(alias.sender().to_string(), "John Smith <spammer@bad.com>");
    }

    #[test]
    fn test_encode_omits_empty_names() {
        let alias = codec()
            .encode(
                &[NamedAddress::new("sales@mine.com", "")],
                &NamedAddress::new("spammer@bad.com", "  "),
            )
            .unwrap();

        assert_eq!(alias.as_str(), "sales+spammer=bad.com@mine.com");
    }

    #[test]
    fn test_encode_strips_owned_sub_address() {
        let alias = codec()
            .encode(
                &[NamedAddress::new("sales+promo@mine.com", "")],
                &NamedAddress::new("first+last@bad.com", ""),
            )
            .unwrap();

        assert_eq!(alias.as_str(), "sales+first+last=bad.com@mine.com");
        assert_eq!(alias.owned().address.local_part(), "sales");
    }

    #[test]
    fn test_encode_skips_malformed_recipients() {
        let alias = codec()
            .encode(
                &[
                    NamedAddress::new("undisclosed-recipients:;", ""),
                    NamedAddress::new("support@mine.com", ""),
                ],
                &NamedAddress::new("a@b.com", ""),
            )
            .unwrap();

        assert_eq!(alias.as_str(), "support+a=b.com@mine.com");
    }

    #[test]
    fn test_encode_fallback_has_no_name() {
        let alias = codec()
            .encode(
                &[NamedAddress::new("someone@other.com", "Someone")],
                &NamedAddress::new("a@b.com", "A"),
            )
            .unwrap();

        assert_eq!(alias.as_str(), "catchall+a{A}=b.com@mine.com");
        assert_eq!(alias.owned().name, "");
    }

    #[test]
    fn test_encode_malformed_sender() {
        let err = codec()
            .encode(&[], &NamedAddress::new("not-an-address", "Nobody"))
            .unwrap_err();

        assert!(matches!(err, AliasError::MalformedAddress { .. }));
    }

    #[test]
    fn test_encode_unencodable() {
        let err = codec()
            .encode(&[], &NamedAddress::new("\"odd one\"@bad.com", ""))
            .unwrap_err();
        assert!(matches!(err, AliasError::Unencodable { .. }));

        let err = codec()
            .encode(&[], &NamedAddress::new("we{ird}@bad.com", ""))
            .unwrap_err();
        assert!(matches!(err, AliasError::Unencodable { .. }));

        let err = codec()
            .encode(&[], &NamedAddress::new("x@[192.0.2.1]", ""))
            .unwrap_err();
        assert!(matches!(err, AliasError::Unencodable { .. }));

        let err = codec()
            .encode(
                &[NamedAddress::new("+promo@mine.com", "")],
                &NamedAddress::new("a@b.com", ""),
            )
            .unwrap_err();
        assert!(matches!(err, AliasError::Unencodable { .. }));
    }

    #[test]
    fn test_codec_rejects_bad_default() {
        let err = AliasCodec::new(vec![Domain::new("mine.com")], "no-at-sign").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_free_encode_parses_default_lazily() {
        let owned = [Domain::new("mine.com")];
        let sender = NamedAddress::new("a@b.com", "");

        let alias = encode(
            &[NamedAddress::new("me@mine.com", "")],
            &owned,
            "broken",
            &sender,
        )
        .unwrap();
        assert_eq!(alias.as_str(), "me+a=b.com@mine.com");

        let err = encode(&[], &owned, "broken", &sender).unwrap_err();
        assert!(err.is_configuration());
    }
}
