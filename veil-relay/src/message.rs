use std::fmt::{self, Display};

use veil_common::{EmailAddress, Identity};

/// A message ready to be relayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: Identity,
    pub to: Vec<Identity>,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    /// Blind copies; omitted from the request when empty
    pub bcc: Vec<EmailAddress>,
    /// Provider-side campaign to file the message under
    pub campaign: Option<String>,
}

impl OutboundMessage {
    #[must_use]
    pub fn new(from: Identity, to: Identity, subject: impl Into<String>) -> Self {
        Self {
            from,
            to: vec![to],
            subject: subject.into(),
            text: None,
            html: None,
            bcc: Vec::default(),
            campaign: None,
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.text = text;
        self
    }

    #[must_use]
    pub fn with_html(mut self, html: Option<String>) -> Self {
        self.html = html;
        self
    }

    #[must_use]
    pub fn with_bcc(mut self, bcc: Vec<EmailAddress>) -> Self {
        self.bcc = bcc;
        self
    }

    #[must_use]
    pub fn with_campaign(mut self, campaign: Option<String>) -> Self {
        self.campaign = campaign;
        self
    }
}

impl Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "From: {} To: [", self.from)?;
        for (i, to) in self.to.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(to, f)?;
        }
        write!(f, "] Subject: {:?}", self.subject)
    }
}

/// What the provider reported back for an accepted request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayReceipt {
    /// One status per message in the request, e.g. `success`
    pub statuses: Vec<String>,
}

impl RelayReceipt {
    /// Whether every message was reported as sent
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.statuses.is_empty() && self.statuses.iter().all(|status| status == "success")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let message = OutboundMessage::new(
            Identity::new(EmailAddress::parse("a+b=c.com@mine.com").unwrap(), "Bob"),
            Identity::unnamed(EmailAddress::parse("me@home.net").unwrap()),
            "Hello",
        );

        assert_eq!(
            message.to_string(),
            "From: Bob <a+b=c.com@mine.com> To: [me@home.net] Subject: \"Hello\""
        );
    }

    #[test]
    fn test_receipt_success() {
        assert!(!RelayReceipt::default().is_success());
        assert!(
            RelayReceipt {
                statuses: vec!["success".to_string()]
            }
            .is_success()
        );
        assert!(
            !RelayReceipt {
                statuses: vec!["success".to_string(), "error".to_string()]
            }
            .is_success()
        );
    }
}
