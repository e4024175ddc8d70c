//! Message-ID of a mirrored record

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix embedded in every Hacker News Message-ID
const HN_PREFIX: &str = "<hackernews-";

/// Value of a record's Message-ID header
///
/// This is the key records are looked up by; it must stay byte-stable
/// across releases or existing mailboxes would be duplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Message-ID for a Hacker News item, e.g. `<hackernews-8863>`
    pub fn hacker_news(id: u64) -> Self {
        Self(format!("{}{}>", HN_PREFIX, id))
    }

    /// Recover the Hacker News item id from a Message-ID
    pub fn hacker_news_id(&self) -> Option<u64> {
        self.0
            .strip_prefix(HN_PREFIX)?
            .strip_suffix('>')?
            .parse()
            .ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
