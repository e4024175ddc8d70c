//! Source-independent view of one fetched item

use super::{HnItem, MessageId};

/// Author and subject shown for items deleted at the source
pub const DELETED: &str = "-Deleted-";

/// Kind of item, which decides subject formatting and reply linkage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Story,
    Comment,
    Job,
    Poll,
    PollOpt,
    /// A type string this version does not know about
    Other(String),
}

impl NodeKind {
    /// Parse a Hacker News `type` value
    pub fn parse(s: &str) -> Self {
        match s {
            "story" => NodeKind::Story,
            "comment" => NodeKind::Comment,
            "job" => NodeKind::Job,
            "poll" => NodeKind::Poll,
            "pollopt" => NodeKind::PollOpt,
            other => NodeKind::Other(other.to_string()),
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, NodeKind::Comment)
    }
}

/// A Hacker News item with its derived subject and body
///
/// Built once per fetch by [`crate::source::normalize_item`] and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct HnNode {
    item: HnItem,
    kind: NodeKind,
    subject: String,
    body: String,
}

impl HnNode {
    pub(crate) fn new(item: HnItem, subject: String, body: String) -> Self {
        let kind = NodeKind::parse(&item.kind);
        Self {
            item,
            kind,
            subject,
            body,
        }
    }

    /// The raw item this node was built from
    pub fn item(&self) -> &HnItem {
        &self.item
    }
}

/// One node of a mirrored thread
///
/// Each source contributes a variant; the synchronizer only talks to the
/// accessors below.
#[derive(Debug, Clone)]
pub enum Node {
    HackerNews(HnNode),
}

impl Node {
    /// Stable identity of the node across runs
    pub fn identity(&self) -> String {
        match self {
            Node::HackerNews(n) => n.item.id.to_string(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        match self {
            Node::HackerNews(n) => &n.kind,
        }
    }

    /// Display name of the author, or [`DELETED`]
    pub fn author(&self) -> &str {
        match self {
            Node::HackerNews(n) if n.item.deleted => DELETED,
            Node::HackerNews(n) => &n.item.by,
        }
    }

    /// Creation time reported by the source, unix seconds
    pub fn created_at(&self) -> i64 {
        match self {
            Node::HackerNews(n) => n.item.time,
        }
    }

    pub fn subject(&self) -> &str {
        match self {
            Node::HackerNews(n) => &n.subject,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Node::HackerNews(n) => &n.body,
        }
    }

    pub fn score(&self) -> i64 {
        match self {
            Node::HackerNews(n) => n.item.score,
        }
    }

    pub fn is_removed(&self) -> bool {
        match self {
            Node::HackerNews(n) => n.item.deleted,
        }
    }

    /// Child identities in display order
    pub fn children(&self) -> Vec<String> {
        match self {
            Node::HackerNews(n) => n.item.kids.iter().map(|id| id.to_string()).collect(),
        }
    }

    /// Whether children of this node cite it in In-Reply-To
    ///
    /// Only comments are reply targets; the story at the root never is.
    pub fn parent_linkage(&self) -> bool {
        self.kind().is_comment()
    }

    pub fn message_id(&self) -> MessageId {
        match self {
            Node::HackerNews(n) => MessageId::hacker_news(n.item.id),
        }
    }
}
