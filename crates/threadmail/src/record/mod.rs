//! Mail text format of a mirrored record
//!
//! A record is a block of `Key: value` header lines, a blank line, and the
//! body. The header order is fixed so rewrites of unchanged nodes produce
//! byte-identical files.

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use mailparse::MailHeaderMap;

use crate::models::{MessageId, Node};

/// Recipient written to every record unless configured otherwise
pub const DEFAULT_RECIPIENT: &str = "everyone@example.com";

/// RFC 2822 date with a numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 +0000`
///
/// Seconds are kept so consecutive synthetic ordering values stay distinct.
const MAIL_DATE: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Format unix seconds the way Date and X-Date headers carry them
pub fn format_date(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .unwrap_or_default()
        .format(MAIL_DATE)
        .to_string()
}

/// One record ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    /// Synthetic ordering value, formatted as a date
    pub date: String,
    /// Creation time reported by the source
    pub x_date: String,
    pub message_id: MessageId,
    pub score: i64,
    pub in_reply_to: Option<MessageId>,
    pub body: String,
}

impl Email {
    /// Build the record for `node`
    ///
    /// `order` is the synthetic ordering value for the Date header. The
    /// parent is cited in In-Reply-To only when it is itself a reply target.
    pub fn for_node(parent: Option<&Node>, node: &Node, order: i64, recipient: &str) -> Self {
        let subject = if node.kind().is_comment() {
            node.subject().to_string()
        } else {
            format!("({} points) {}", node.score(), node.subject())
        };

        let in_reply_to = parent
            .filter(|p| p.parent_linkage())
            .map(|p| p.message_id());

        Self {
            from: node.author().to_string(),
            to: recipient.to_string(),
            subject,
            date: format_date(order),
            x_date: format_date(node.created_at()),
            message_id: node.message_id(),
            score: node.score(),
            in_reply_to,
            body: node.body().to_string(),
        }
    }

    /// The header block, without the separating blank line
    pub fn header(&self) -> String {
        let mut header = format!(
            "From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Date: {}\n\
             X-Date: {}\n\
             Message-ID: {}\n\
             X-Score: {}\n\
             Content-Type: text/plain; charset=\"UTF-8\"",
            single_line(&self.from),
            single_line(&self.to),
            single_line(&self.subject),
            self.date,
            self.x_date,
            self.message_id,
            self.score,
        );
        if let Some(parent) = &self.in_reply_to {
            header.push_str(&format!("\nIn-Reply-To: {}", parent));
        }
        header
    }
}

/// Header values must not break the header block
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n\n{}", self.header(), self.body)
    }
}

/// A record read back from the store
#[derive(Debug, Clone)]
pub struct StoredRecord {
    message_id: Option<String>,
    x_date: Option<String>,
    headers: Vec<(String, String)>,
    body: String,
}

impl StoredRecord {
    /// Parse raw record text as an RFC 822 message
    ///
    /// Line endings in the body are normalized to `\n`, so a record a mail
    /// client saved with CRLF compares equal to the text it was written as.
    pub fn parse(raw: &str) -> Result<Self> {
        let mail = mailparse::parse_mail(raw.as_bytes()).context("Failed to parse record")?;
        let body = mail.get_body_raw().context("Failed to decode record body")?;

        Ok(Self {
            message_id: mail.headers.get_first_value("Message-ID"),
            x_date: mail.headers.get_first_value("X-Date"),
            headers: mail
                .headers
                .iter()
                .map(|h| (h.get_key(), h.get_value()))
                .collect(),
            body: String::from_utf8_lossy(&body).replace("\r\n", "\n"),
        })
    }

    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim())
    }

    pub fn message_id(&self) -> Option<MessageId> {
        self.message_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(MessageId::new)
    }

    /// Creation time the record was written with
    pub fn x_date(&self) -> Option<&str> {
        self.x_date.as_deref().map(str::trim)
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}
