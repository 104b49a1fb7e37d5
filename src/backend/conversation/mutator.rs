//! Conversation Mutations
//!
//! Pure functions computing a new thread from an old one plus a mutation
//! request. Nothing here touches shared state: every operation takes the
//! current thread by reference and returns the complete replacement tree
//! for the store to persist, or an error with the input untouched.
//!
//! All three operations share the relocate-to-bottom rule: the top-level
//! thread whose subtree was just touched moves to the end of the top-level
//! sequence, surfacing recently active threads at the bottom the way a chat
//! log orders by recency. The relocation is deliberately not idempotent on
//! ordering: every touch moves the thread again, so "last touched" is
//! always last.

use crate::shared::error::ConversationError;
use crate::shared::thread::{resolve_mut, ThreadMessage};

/// Append a message as a new top-level entry at the end of the thread.
///
/// # Errors
///
/// `MalformedContent` if the message content is empty or blank.
pub fn append(
    thread: &[ThreadMessage],
    message: ThreadMessage,
) -> Result<Vec<ThreadMessage>, ConversationError> {
    validate_content(&message.content)?;
    let mut next = thread.to_vec();
    next.push(message);
    Ok(next)
}

/// Append a message to the replies of the node at `parent_path`, then
/// relocate the touched top-level thread to the end.
///
/// # Errors
///
/// - `MalformedContent` if the message content is empty or blank
/// - `InvalidPath` if `parent_path` does not resolve; the thread is not
///   mutated and must not be persisted
pub fn reply(
    thread: &[ThreadMessage],
    parent_path: &[usize],
    message: ThreadMessage,
) -> Result<Vec<ThreadMessage>, ConversationError> {
    validate_content(&message.content)?;
    let mut next = thread.to_vec();
    let parent = resolve_mut(&mut next, parent_path)
        .ok_or_else(|| ConversationError::invalid_path(parent_path))?;
    parent.replies.push(message);
    relocate_to_end(&mut next, parent_path[0]);
    Ok(next)
}

/// Replace the content of the node at `target_path`, leaving its replies
/// untouched, then relocate the touched top-level thread to the end.
///
/// Applies uniformly: editing a top-level message moves that message;
/// editing a nested reply moves its top-level ancestor.
///
/// # Errors
///
/// - `MalformedContent` if the replacement content is empty or blank
/// - `InvalidPath` if `target_path` does not resolve
pub fn edit(
    thread: &[ThreadMessage],
    target_path: &[usize],
    new_content: &str,
) -> Result<Vec<ThreadMessage>, ConversationError> {
    validate_content(new_content)?;
    let mut next = thread.to_vec();
    let target = resolve_mut(&mut next, target_path)
        .ok_or_else(|| ConversationError::invalid_path(target_path))?;
    target.content = new_content.to_string();
    relocate_to_end(&mut next, target_path[0]);
    Ok(next)
}

/// Move the top-level entry at `index` to the end of the sequence,
/// preserving the relative order of everything else.
fn relocate_to_end(thread: &mut Vec<ThreadMessage>, index: usize) {
    let touched = thread.remove(index);
    thread.push(touched);
}

fn validate_content(content: &str) -> Result<(), ConversationError> {
    if content.trim().is_empty() {
        return Err(ConversationError::malformed("content must not be empty"));
    }
    Ok(())
}
