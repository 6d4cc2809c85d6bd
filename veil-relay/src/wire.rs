//! Mailjet v3.1 send API bodies

use serde::{Deserialize, Serialize};
use veil_common::{EmailAddress, Identity};

use crate::message::{OutboundMessage, RelayReceipt};

#[derive(Debug, Serialize)]
pub(crate) struct SendRequest<'a> {
    #[serde(rename = "Messages")]
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    #[serde(rename = "From")]
    from: Contact,
    #[serde(rename = "To")]
    to: Vec<Contact>,
    #[serde(rename = "Subject")]
    subject: &'a str,
    #[serde(rename = "TextPart", skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(rename = "HTMLPart", skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(rename = "Bcc", skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<BlindContact>,
    #[serde(rename = "CustomCampaign", skip_serializing_if = "Option::is_none")]
    campaign: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Contact {
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "Name")]
    name: String,
}

impl From<&Identity> for Contact {
    fn from(identity: &Identity) -> Self {
        Self {
            email: identity.address.to_string(),
            name: identity.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BlindContact {
    #[serde(rename = "Email")]
    email: String,
}

impl From<&EmailAddress> for BlindContact {
    fn from(address: &EmailAddress) -> Self {
        Self {
            email: address.to_string(),
        }
    }
}

impl<'a> From<&'a OutboundMessage> for SendRequest<'a> {
    fn from(message: &'a OutboundMessage) -> Self {
        Self {
            messages: [Message {
                from: Contact::from(&message.from),
                to: message.to.iter().map(Contact::from).collect(),
                subject: &message.subject,
                text: message.text.as_deref(),
                html: message.html.as_deref(),
                bcc: message.bcc.iter().map(BlindContact::from).collect(),
                campaign: message.campaign.as_deref(),
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendResponse {
    #[serde(rename = "Messages", default)]
    messages: Vec<MessageResult>,
}

#[derive(Debug, Deserialize)]
struct MessageResult {
    #[serde(rename = "Status")]
    status: String,
}

impl From<SendResponse> for RelayReceipt {
    fn from(response: SendResponse) -> Self {
        Self {
            statuses: response
                .messages
                .into_iter()
                .map(|message| message.status)
                .collect(),
        }
    }
}
