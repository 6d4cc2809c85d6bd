//! Message dispatch
//!
//! One inbound message goes through three stages:
//!
//! 1. **Policy**: classify the envelope sender with the [`PolicyGate`]
//! 2. **Aliasing**: unmask a reply ([`decode`]) or mask a new message
//!    ([`AliasCodec::encode`])
//! 3. **Relay**: a single [`OutboundRelay::send`]
//!
//! ## Limitations
//!
//! Dispatch is fire-and-forget. The relay call is attempted exactly once, with
//! no retry, queueing or backpressure; when it fails the message is dropped
//! and the failure is only logged and reported as [`DropReason::RelayFailed`].
//! Nobody involved in the conversation is told.

use std::sync::Arc;

use veil_alias::{AliasCodec, AliasError, decode};
use veil_common::{Config, EmailAddress, Identity, NamedAddress, incoming, internal, outgoing};
use veil_relay::{OutboundMessage, OutboundRelay, RelayError, RelayReceipt};

use crate::{
    bcc::BccList,
    error::DispatchError,
    inbound::Inbound,
    message::ParsedMessage,
    policy::{Decision, PolicyGate},
};

/// Reason given to the sending side for a blocked sender
pub const BLOCKED_REASON: &str = "Address is blocked";

/// Why a message was neither relayed nor forwarded
#[derive(Debug)]
pub enum DropReason {
    /// The relay call failed; it is not retried
    RelayFailed(RelayError),
    /// A hidden sender wrote to an address that has no sender embedded
    NoReplyTarget,
    /// The message's sender or owned recipient cannot be put in an alias
    Unaliasable(AliasError),
}

/// What happened to a message
#[derive(Debug)]
pub enum Outcome {
    Rejected {
        reason: String,
    },
    Relayed {
        message: OutboundMessage,
        receipt: RelayReceipt,
    },
    Forwarded {
        to: EmailAddress,
    },
    Dropped(DropReason),
}

impl Outcome {
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    #[must_use]
    pub const fn is_relayed(&self) -> bool {
        matches!(self, Self::Relayed { .. })
    }

    #[must_use]
    pub const fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped(_))
    }
}

pub struct Dispatcher {
    gate: PolicyGate,
    codec: AliasCodec,
    bcc: BccList,
    forward_to: EmailAddress,
    native_forward: bool,
    default_from_name: String,
    campaign: Option<String>,
    log_messages: bool,
    relay: Arc<dyn OutboundRelay>,
}

impl Dispatcher {
    /// # Errors
    ///
    /// Returns a [`DispatchError`] for which
    /// [`is_configuration`](DispatchError::is_configuration) holds when a
    /// configured address is missing or malformed.
    pub fn new(config: &Config, relay: Arc<dyn OutboundRelay>) -> Result<Self, DispatchError> {
        config.validate()?;

        Ok(Self {
            gate: PolicyGate::from_config(config),
            codec: AliasCodec::from_config(config)?,
            bcc: BccList::from_config(config)?,
            forward_to: config.forward_to()?,
            native_forward: config.native_forward,
            default_from_name: config.default_from_name.clone(),
            campaign: config.campaign_name.clone(),
            log_messages: config.enable_logs,
            relay,
        })
    }

    /// Dispatch one message.
    ///
    /// # Errors
    ///
    /// Fails only when the inbound collaborator does, or the message cannot be
    /// parsed. Relay failures are not errors; see [`DropReason`].
    pub async fn dispatch<I>(&self, inbound: &mut I) -> Result<Outcome, DispatchError>
    where
        I: Inbound + ?Sized,
    {
        let raw = inbound.read_raw().await?;
        let message = ParsedMessage::parse(&raw)?;
        let from = inbound.envelope_from().to_string();
        let to = inbound.envelope_to().to_string();

        if self.log_messages {
            log_message(&from, &to, &message);
        }

        let decision = self.gate.decide(&from);
        internal!(level = DEBUG, "Sender {from} decided: {decision}");

        match decision {
            Decision::Reject => {
                internal!(level = INFO, "Rejecting message from {from}: {BLOCKED_REASON}");
                inbound.reject(BLOCKED_REASON).await?;

                Ok(Outcome::Rejected {
                    reason: BLOCKED_REASON.to_string(),
                })
            }
            Decision::MaskAndRelay => Ok(self.unmask(&from, &to, &message).await),
            Decision::ForwardWithAlias if self.native_forward => {
                inbound.forward(&self.forward_to, &raw).await?;

                Ok(Outcome::Forwarded {
                    to: self.forward_to.clone(),
                })
            }
            Decision::ForwardWithAlias => Ok(self.mask(&from, &message).await),
        }
    }

    /// A hidden sender replying through an alias: relay from the owned
    /// mailbox back to the sender embedded in it.
    async fn unmask(&self, from: &str, alias: &str, message: &ParsedMessage) -> Outcome {
        let decoded = decode(alias);

        let (Some(owned), Some(target)) = (decoded.owned.identity(), decoded.sender.identity())
        else {
            internal!(level = WARN, "No reply target in {alias}, dropping message from {from}");
            return Outcome::Dropped(DropReason::NoReplyTarget);
        };

        let sender = if owned.name.is_empty() {
            Identity::new(owned.address, self.default_from_name.as_str())
        } else {
            owned
        };

        self.send(self.outbound(sender, target, from, true, message)).await
    }

    /// Anyone else: relay to the forwarding target from a fresh alias.
    async fn mask(&self, from: &str, message: &ParsedMessage) -> Outcome {
        // The envelope sender stands in for a missing `From:` header
        let sender = if message.from.address.is_empty() {
            NamedAddress::new(from, message.from.name.as_str())
        } else {
            message.from.clone()
        };

        let alias = match self.codec.encode(&message.to, &sender) {
            Ok(alias) => alias,
            Err(err) => {
                internal!(level = WARN, "Unable to alias message from {from}: {err}");
                return Outcome::Dropped(DropReason::Unaliasable(err));
            }
        };

        let sender = Identity::new(alias.mailbox().clone(), alias.sender().name.as_str());
        let target = Identity::unnamed(self.forward_to.clone());

        self.send(self.outbound(sender, target, from, false, message)).await
    }

    fn outbound(
        &self,
        sender: Identity,
        target: Identity,
        envelope_from: &str,
        hidden: bool,
        message: &ParsedMessage,
    ) -> OutboundMessage {
        OutboundMessage::new(sender, target, message.subject.as_str())
            .with_text(message.text.clone())
            .with_html(message.html.clone())
            .with_bcc(self.bcc.for_sender(envelope_from, hidden))
            .with_campaign(self.campaign.clone())
    }

    async fn send(&self, message: OutboundMessage) -> Outcome {
        match self.relay.send(&message).await {
            Ok(receipt) => {
                if receipt.is_success() {
                    outgoing!(level = INFO, "Relayed {message}: {:?}", receipt.statuses);
                } else {
                    outgoing!(
                        level = WARN,
                        "Relay accepted {message} with failed statuses: {:?}",
                        receipt.statuses
                    );
                }
                Outcome::Relayed { message, receipt }
            }
            Err(err) => {
                outgoing!(level = ERROR, "Relay failed for {message}, dropping: {err}");
                Outcome::Dropped(DropReason::RelayFailed(err))
            }
        }
    }
}

fn log_message(from: &str, to: &str, message: &ParsedMessage) {
    incoming!(level = INFO, "Subject: {}", message.subject);
    incoming!(level = INFO, "From: {from} To: {to}");
    incoming!(level = INFO, "Text: {:?}", message.text);
    incoming!(level = INFO, "HTML: {:?}", message.html);
    incoming!(level = INFO, "Message-ID: {:?}", message.message_id);
    incoming!(level = INFO, "In-Reply-To: {:?}", message.in_reply_to);
    incoming!(level = INFO, "References: {:?}", message.references);

    if message.attachments.is_empty() {
        incoming!(level = INFO, "No attachments");
    }
    for attachment in &message.attachments {
        incoming!(level = INFO, "Attachment: {attachment}");
    }
}
