//! Raw Hacker News item as returned by the Firebase API

use serde::{Deserialize, Serialize};

/// One item from the Hacker News API
///
/// Field reference: <https://github.com/HackerNews/API>. Every field except
/// `id` may be absent, so missing fields fall back to their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnItem {
    /// The item's unique id
    pub id: u64,
    /// True if the item is deleted
    pub deleted: bool,
    /// One of "job", "story", "comment", "poll", or "pollopt"
    #[serde(rename = "type")]
    pub kind: String,
    /// Username of the item's author
    pub by: String,
    /// Creation date, unix seconds
    pub time: i64,
    /// Comment, story or poll text (HTML)
    pub text: String,
    /// True if the item is dead
    pub dead: bool,
    /// Parent comment or story; for pollopts, the poll
    pub parent: u64,
    /// Ids of the item's comments, in ranked display order
    pub kids: Vec<u64>,
    /// URL of the story
    pub url: String,
    /// Story score, or votes for a pollopt
    pub score: i64,
    /// Title of the story, poll or job
    pub title: String,
    /// Related pollopts, in display order
    pub parts: Vec<u64>,
    /// Total comment count for stories and polls
    pub descendants: u64,
}
