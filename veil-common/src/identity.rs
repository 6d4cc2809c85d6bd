use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::{address::EmailAddress, error::AddressError};

/// A mailbox together with its (possibly empty) display name.
///
/// This is either side of an alias: the owned mailbox that received the
/// message, or the external sender a reply should be routed back to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub address: EmailAddress,
    #[serde(default)]
    pub name: String,
}

impl Identity {
    #[must_use]
    pub fn new(address: EmailAddress, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
        }
    }

    /// An identity without a display name
    #[must_use]
    pub const fn unnamed(address: EmailAddress) -> Self {
        Self {
            address,
            name: String::new(),
        }
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            Display::fmt(&self.address, f)
        } else {
            write!(f, "{} <{}>", self.name, self.address)
        }
    }
}

/// An address exactly as a message header carried it: a display name and an
/// address string that has not been validated yet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedAddress {
    #[serde(default)]
    pub name: String,
    pub address: String,
}

impl NamedAddress {
    #[must_use]
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Validate the address, keeping the display name.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressError`] if the address is not a valid mailbox.
    pub fn parse(&self) -> Result<Identity, AddressError> {
        EmailAddress::parse(&self.address).map(|address| Identity::new(address, self.name.trim()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_display() {
        let address = EmailAddress::parse("spammer@bad.com").unwrap();

        let named = Identity::new(address.clone(), "John Smith");
        assert_eq!(named.to_string(), "John Smith <spammer@bad.com>");

        let unnamed = Identity::unnamed(address);
        assert_eq!(unnamed.to_string(), "spammer@bad.com");
    }

    #[test]
    fn test_named_address_parse() {
        let named = NamedAddress::new("spammer@bad.com", " John Smith ");
        let identity = named.parse().unwrap();
        assert_eq!(identity.address.domain(), "bad.com");
        assert_eq!(identity.name, "John Smith");

        assert_eq!(
            NamedAddress::new("undisclosed-recipients", "").parse(),
            Err(AddressError::MissingAtSign)
        );
    }
}
