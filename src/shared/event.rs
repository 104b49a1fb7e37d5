//! Realtime Wire Types
//!
//! Frames exchanged over the live connection. A client opens one socket,
//! sends an `INIT` frame naming the task it is viewing, and from then on
//! receives `ThreadUpdate` events for that task. Updates are tagged with
//! the originating user so receivers can suppress self-notifications.

use crate::shared::thread::ThreadMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client-to-server frames.
///
/// One socket watches one task at a time; a later `INIT` re-targets the
/// same connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    /// Select which task's updates this connection receives.
    #[serde(rename = "INIT")]
    Init {
        #[serde(rename = "taskId")]
        task_id: Uuid,
    },
}

/// Server-to-client event: a task's conversation changed.
///
/// Carries the full canonical thread rather than a delta; receivers
/// re-render from it directly, and a client that missed events while
/// disconnected reconciles the same way via a full fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadUpdate {
    /// Task whose conversation changed.
    pub task_id: Uuid,
    /// The complete thread after the mutation.
    pub thread: Vec<ThreadMessage>,
    /// User whose action produced the update; receivers matching this
    /// suppress their own unread increment.
    pub current_user: String,
    /// When the mutation was persisted.
    pub updated_at: DateTime<Utc>,
}

impl ThreadUpdate {
    pub fn new(task_id: Uuid, thread: Vec<ThreadMessage>, current_user: impl Into<String>) -> Self {
        Self {
            task_id,
            thread,
            current_user: current_user.into(),
            updated_at: Utc::now(),
        }
    }
}
