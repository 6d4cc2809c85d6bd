//! Sender policy
//!
//! Every inbound message is classified by its envelope sender alone:
//!
//! 1. **Blocked** senders are rejected outright
//! 2. **Hidden** senders (the operator's own addresses) are replying through
//!    an alias, so the reply is unmasked and relayed to the original sender
//! 3. Everyone else is forwarded on behind a freshly built alias
//!
//! Matching is exact and case-sensitive: `Spam@bad.com` does not match a
//! block-list entry of `spam@bad.com`.

use std::fmt::{self, Display};

use ahash::AHashSet;
use veil_common::Config;

/// What to do with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Reject,
    MaskAndRelay,
    ForwardWithAlias,
}

impl Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reject => "reject",
            Self::MaskAndRelay => "mask and relay",
            Self::ForwardWithAlias => "forward with alias",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyGate {
    blocked: AHashSet<String>,
    hidden: AHashSet<String>,
}

impl PolicyGate {
    pub fn new<B, H>(blocked: B, hidden: H) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
        H: IntoIterator,
        H::Item: Into<String>,
    {
        Self {
            blocked: blocked.into_iter().map(Into::into).collect(),
            hidden: hidden.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.blocked.iter().cloned(),
            config.hide_addresses.iter().cloned(),
        )
    }

    /// Classify a message by its raw envelope sender.
    ///
    /// A sender on both lists is rejected.
    #[must_use]
    pub fn decide(&self, sender: &str) -> Decision {
        if self.is_blocked(sender) {
            Decision::Reject
        } else if self.is_hidden(sender) {
            Decision::MaskAndRelay
        } else {
            Decision::ForwardWithAlias
        }
    }

    #[must_use]
    pub fn is_blocked(&self, sender: &str) -> bool {
        self.blocked.contains(sender)
    }

    #[must_use]
    pub fn is_hidden(&self, sender: &str) -> bool {
        self.hidden.contains(sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> PolicyGate {
        PolicyGate::new(
            ["spam@bad.com", "both@mine.com"],
            ["me@mine.com", "both@mine.com"],
        )
    }

    #[test]
    fn test_decide() {
        let gate = gate();

        assert_eq!(gate.decide("spam@bad.com"), Decision::Reject);
        assert_eq!(gate.decide("me@mine.com"), Decision::MaskAndRelay);
        assert_eq!(gate.decide("friend@good.com"), Decision::ForwardWithAlias);
    }

    #[test]
    fn test_block_wins_over_hide() {
        assert_eq!(gate().decide("both@mine.com"), Decision::Reject);
    }

    #[test]
    fn test_exact_match_only() {
        let gate = gate();

        assert_eq!(gate.decide("Spam@bad.com"), Decision::ForwardWithAlias);
        assert_eq!(gate.decide("spam@bad.com "), Decision::ForwardWithAlias);
        assert_eq!(gate.decide("<spam@bad.com>"), Decision::ForwardWithAlias);
        assert_eq!(gate.decide("bad.com"), Decision::ForwardWithAlias);
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            blocked: vec!["spam@bad.com".to_string()],
            hide_addresses: vec!["me@mine.com".to_string()],
            ..Config::default()
        };

        let gate = PolicyGate::from_config(&config);
        assert!(gate.is_blocked("spam@bad.com"));
        assert!(gate.is_hidden("me@mine.com"));
        assert_eq!(PolicyGate::default().decide("anyone@x.com"), Decision::ForwardWithAlias);
    }
}
