//! Realtime Registry
//!
//! Process-wide shared state for the realtime layer: one broadcast channel
//! per task (created on first touch), the set of live connections with the
//! task each is watching, and per-user unread counters for tasks changing
//! while the user looks elsewhere.
//!
//! Presence is derived from connection lifetime: a user is online while at
//! least one of their connections is registered.

use crate::shared::event::ThreadUpdate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Capacity of each per-task broadcast channel.
const CHANNEL_CAPACITY: usize = 100;

/// One live connection: who holds it and which task it is watching.
#[derive(Debug, Clone)]
struct Connection {
    username: String,
    watching: Option<Uuid>,
}

/// Shared realtime state. Cheap to clone; all clones see the same registry.
#[derive(Clone, Default)]
pub struct RealtimeState {
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<ThreadUpdate>>>>,
    connections: Arc<Mutex<HashMap<Uuid, Connection>>>,
    unread: Arc<Mutex<HashMap<String, HashMap<Uuid, u64>>>>,
}

impl RealtimeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live connection for a user. Returns the connection id
    /// used for later watch/unregister calls.
    pub fn register(&self, username: &str) -> Uuid {
        let connection_id = Uuid::new_v4();
        self.connections.lock().unwrap().insert(
            connection_id,
            Connection {
                username: username.to_string(),
                watching: None,
            },
        );
        tracing::info!("[Realtime] {} connected ({})", username, connection_id);
        connection_id
    }

    /// Drop a connection. The user goes offline once their last connection
    /// is gone; unread counters survive the disconnect.
    pub fn unregister(&self, connection_id: Uuid) {
        if let Some(connection) = self.connections.lock().unwrap().remove(&connection_id) {
            tracing::info!(
                "[Realtime] {} disconnected ({})",
                connection.username,
                connection_id
            );
        }
    }

    /// Point a connection at a task and clear the owner's unread counter
    /// for it. Returns a receiver for that task's updates.
    pub fn watch(&self, connection_id: Uuid, task_id: Uuid) -> broadcast::Receiver<ThreadUpdate> {
        let username = {
            let mut connections = self.connections.lock().unwrap();
            match connections.get_mut(&connection_id) {
                Some(connection) => {
                    connection.watching = Some(task_id);
                    Some(connection.username.clone())
                }
                None => None,
            }
        };
        if let Some(username) = username {
            self.clear_unread(&username, task_id);
        }
        self.sender_for(task_id).subscribe()
    }

    /// Deliver an update to every subscriber of the task's channel and bump
    /// unread counters for connected users who are neither the originator
    /// nor currently watching the task.
    ///
    /// Fire-and-forget: zero subscribers is not an error, and a slow
    /// receiver lagging out of the channel is its own problem to reconcile.
    pub fn broadcast(&self, task_id: Uuid, update: ThreadUpdate) {
        let originating_user = update.current_user.clone();

        let delivered = {
            let channels = self.channels.lock().unwrap();
            match channels.get(&task_id) {
                Some(sender) => sender.send(update).unwrap_or(0),
                None => 0,
            }
        };
        tracing::debug!(
            "[Realtime] Update for task {} delivered to {} subscribers",
            task_id,
            delivered
        );

        // Distinct connected users, minus the originator and anyone with a
        // connection on this task.
        let mut to_bump: Vec<String> = Vec::new();
        {
            let connections = self.connections.lock().unwrap();
            for connection in connections.values() {
                if connection.username == originating_user {
                    continue;
                }
                let viewing = connections
                    .values()
                    .any(|c| c.username == connection.username && c.watching == Some(task_id));
                if !viewing && !to_bump.contains(&connection.username) {
                    to_bump.push(connection.username.clone());
                }
            }
        }
        if !to_bump.is_empty() {
            let mut unread = self.unread.lock().unwrap();
            for username in to_bump {
                *unread
                    .entry(username)
                    .or_default()
                    .entry(task_id)
                    .or_insert(0) += 1;
            }
        }
    }

    /// Presence read model: `username -> online`.
    pub fn presence(&self) -> HashMap<String, bool> {
        self.connections
            .lock()
            .unwrap()
            .values()
            .map(|connection| (connection.username.clone(), true))
            .collect()
    }

    /// Unread counters for one user: `task_id -> count`.
    pub fn unread_for(&self, username: &str) -> HashMap<Uuid, u64> {
        self.unread
            .lock()
            .unwrap()
            .get(username)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop channels with no remaining subscribers. Run periodically so
    /// abandoned tasks do not accumulate senders.
    pub fn cleanup_inactive_channels(&self) {
        self.channels
            .lock()
            .unwrap()
            .retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Subscriber count for a task's channel.
    pub fn subscriber_count(&self, task_id: Uuid) -> usize {
        self.channels
            .lock()
            .unwrap()
            .get(&task_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    fn sender_for(&self, task_id: Uuid) -> broadcast::Sender<ThreadUpdate> {
        self.channels
            .lock()
            .unwrap()
            .entry(task_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    fn clear_unread(&self, username: &str, task_id: Uuid) {
        if let Some(per_task) = self.unread.lock().unwrap().get_mut(username) {
            per_task.remove(&task_id);
        }
    }
}
