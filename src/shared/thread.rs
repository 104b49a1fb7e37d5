//! Thread Tree
//!
//! The recursive data structure holding one task's conversation: an ordered
//! sequence of top-level messages, each carrying an ordered sequence of
//! replies, recursively and without a depth limit.
//!
//! Nodes are addressed by a `Path`: `path[0]` indexes the top-level
//! sequence and every subsequent index descends into `.replies`. Resolution
//! is total (an index out of range at any depth yields `None`, never a
//! panic) so callers can reject a stale path before mutating anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered list of indices addressing one node in a thread.
pub type Path = Vec<usize>;

/// One message node in a conversation thread.
///
/// `replies` is always present in the serialized form (an empty list when
/// there are none) so that recursive traversal never has to handle a
/// missing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    /// Formatted text, prefixed with the encoded sender header.
    pub content: String,
    /// Nested replies, oldest first.
    #[serde(default)]
    pub replies: Vec<ThreadMessage>,
}

impl ThreadMessage {
    /// Create a leaf message with no replies.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            replies: Vec::new(),
        }
    }
}

/// One task's conversation document, the unit of persistence.
///
/// At most one document exists per task; it is created lazily on the first
/// message and replaced wholesale on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDocument {
    /// Owning task (foreign key to the task entity).
    pub task_id: Uuid,
    /// Ordered top-level messages.
    pub thread: Vec<ThreadMessage>,
    /// Timestamp of the last mutation, used for recency sorting.
    pub updated_at: DateTime<Utc>,
}

impl ConversationDocument {
    /// The shape returned when no document exists yet. Callers must not
    /// distinguish "no conversation" from "empty conversation".
    pub fn empty(task_id: Uuid) -> Self {
        Self {
            task_id,
            thread: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Resolve a path to a node in the thread.
///
/// Returns `None` if the path is empty or any index is out of range at any
/// depth. An index into a node whose `replies` is empty is out of range,
/// not an implicit empty list.
pub fn resolve<'a>(thread: &'a [ThreadMessage], path: &[usize]) -> Option<&'a ThreadMessage> {
    let (&first, rest) = path.split_first()?;
    let mut node = thread.get(first)?;
    for &index in rest {
        node = node.replies.get(index)?;
    }
    Some(node)
}

/// Mutable counterpart of [`resolve`], used by the mutation layer.
pub fn resolve_mut<'a>(
    thread: &'a mut [ThreadMessage],
    path: &[usize],
) -> Option<&'a mut ThreadMessage> {
    let (&first, rest) = path.split_first()?;
    let mut node = thread.get_mut(first)?;
    for &index in rest {
        node = node.replies.get_mut(index)?;
    }
    Some(node)
}

/// One row of a flattened thread, ready for indented rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatMessage {
    /// Path addressing this node in the source tree.
    pub path: Path,
    /// Nesting depth (0 for top-level messages).
    pub depth: usize,
    /// The node's content, header prefix included.
    pub content: String,
}

/// Flatten a thread depth-first into display rows.
///
/// Each message is followed by its replies, so the output reads top to
/// bottom the way the nested thread renders: a message, then its whole
/// reply subtree, then the next sibling.
pub fn flatten(thread: &[ThreadMessage]) -> Vec<FlatMessage> {
    let mut rows = Vec::new();
    let mut path = Vec::new();
    for (index, message) in thread.iter().enumerate() {
        path.push(index);
        flatten_into(message, &mut path, &mut rows);
        path.pop();
    }
    rows
}

fn flatten_into(message: &ThreadMessage, path: &mut Path, rows: &mut Vec<FlatMessage>) {
    rows.push(FlatMessage {
        path: path.clone(),
        depth: path.len() - 1,
        content: message.content.clone(),
    });
    for (index, reply) in message.replies.iter().enumerate() {
        path.push(index);
        flatten_into(reply, path, rows);
        path.pop();
    }
}
