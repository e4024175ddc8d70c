//! Domain models for mirrored threads

mod item;
mod message;
mod node;

pub use item::HnItem;
pub use message::MessageId;
pub use node::{HnNode, Node, NodeKind, DELETED};
