use veil_common::{Config, ConfigError, EmailAddress, config::keys};

/// Blind copies added to every relayed message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BccList {
    addresses: Vec<EmailAddress>,
    include_hidden_sender: bool,
}

impl BccList {
    #[must_use]
    pub const fn new(addresses: Vec<EmailAddress>, include_hidden_sender: bool) -> Self {
        Self {
            addresses,
            include_hidden_sender,
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] for the first entry of
    /// `BCC_ADDRESSES` that is not a valid mailbox.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let addresses = config
            .bcc_addresses
            .iter()
            .map(|address| {
                EmailAddress::parse(address).map_err(|source| ConfigError::InvalidAddress {
                    field: keys::BCC_ADDRESSES,
                    source,
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self::new(addresses, config.bcc_hidden_sender))
    }

    /// The copies for a message from `sender`.
    ///
    /// A hidden sender is copied on their own mail when enabled, unless they
    /// are already on the list.
    #[must_use]
    pub fn for_sender(&self, sender: &str, hidden: bool) -> Vec<EmailAddress> {
        let mut bcc = self.addresses.clone();

        if self.include_hidden_sender
            && hidden
            && let Ok(sender) = EmailAddress::parse(sender)
            && !bcc.contains(&sender)
        {
            bcc.push(sender);
        }

        bcc
    }
}
