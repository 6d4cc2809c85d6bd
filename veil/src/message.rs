//! The parts of an inbound message veil cares about

use std::fmt::{self, Display};

use mailparse::{DispositionType, MailAddr, MailHeaderMap, ParsedMail, SingleInfo};
use veil_common::{NamedAddress, incoming};

use crate::error::DispatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: Option<String>,
    pub disposition: Disposition,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}, {} bytes)",
            self.filename.as_deref().unwrap_or("<unnamed>"),
            self.disposition,
            self.mime_type,
            self.content.len()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMessage {
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    pub from: NamedAddress,
    pub to: Vec<NamedAddress>,
    pub attachments: Vec<Attachment>,
    pub message_id: Option<String>,
    pub in_reply_to: Option<String>,
    pub references: Option<String>,
}

impl ParsedMessage {
    /// Parse a raw RFC 5322 message.
    ///
    /// Only the first `text/plain` and first `text/html` leaves become the
    /// bodies; every other leaf is kept as an attachment. Group addresses in
    /// `To:` are flattened into their members.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Parse`] if the message structure is not valid
    /// MIME. Undecodable parts within a valid structure are not errors.
    pub fn parse(raw: &[u8]) -> Result<Self, DispatchError> {
        let mail = mailparse::parse_mail(raw)?;

        let mut message = Self {
            subject: mail.headers.get_first_value("Subject").unwrap_or_default(),
            message_id: mail.headers.get_first_value("Message-ID"),
            in_reply_to: mail.headers.get_first_value("In-Reply-To"),
            references: mail.headers.get_first_value("References"),
            from: addresses(&mail, "From").into_iter().next().unwrap_or_default(),
            to: addresses(&mail, "To"),
            ..Self::default()
        };

        message.collect_parts(&mail);

        Ok(message)
    }

    /// Walk the MIME tree. A leaf that cannot be decoded is logged and
    /// skipped, or kept with empty content if it is an attachment.
    fn collect_parts(&mut self, part: &ParsedMail<'_>) {
        if !part.subparts.is_empty() {
            for subpart in &part.subparts {
                self.collect_parts(subpart);
            }
            return;
        }

        let disposition = part.get_content_disposition();
        let mime_type = part.ctype.mimetype.to_ascii_lowercase();
        let is_attachment = matches!(disposition.disposition, DispositionType::Attachment);

        if !is_attachment && (mime_type == "text/plain" || mime_type == "text/html") {
            let slot = if mime_type == "text/plain" {
                &mut self.text
            } else {
                &mut self.html
            };

            if slot.is_none() {
                match part.get_body() {
                    Ok(body) => *slot = Some(body),
                    Err(err) => {
                        incoming!(level = WARN, "Skipping undecodable {mime_type} part: {err}");
                    }
                }
                return;
            }
        }

        let filename = disposition
            .params
            .get("filename")
            .or_else(|| part.ctype.params.get("name"))
            .cloned();

        let content = part.get_body_raw().unwrap_or_else(|err| {
            incoming!(
                level = WARN,
                "Unable to decode attachment {filename:?} ({mime_type}): {err}"
            );
            Vec::new()
        });

        self.attachments.push(Attachment {
            filename,
            disposition: if is_attachment {
                Disposition::Attachment
            } else {
                Disposition::Inline
            },
            mime_type,
            content,
        });
    }
}

fn named(single: &SingleInfo) -> NamedAddress {
    NamedAddress::new(
        single.addr.as_str(),
        single.display_name.clone().unwrap_or_default(),
    )
}

/// Every mailbox in the first `header`, skipping it if it does not parse
fn addresses(mail: &ParsedMail<'_>, header: &str) -> Vec<NamedAddress> {
    mail.headers
        .get_first_header(header)
        .and_then(|header| mailparse::addrparse_header(header).ok())
        .map(|list| {
            list.iter()
                .flat_map(|addr| match addr {
                    MailAddr::Single(single) => vec![named(single)],
                    MailAddr::Group(group) => group.addrs.iter().map(named).collect(),
                })
                .collect()
        })
        .unwrap_or_default()
}
