//! Conversation Store
//!
//! Owns one conversation document per task on top of the repository seam.
//! Reads return an empty document shape when none exists; writes are
//! whole-document replaces that bump `updated_at`.
//!
//! Two concurrent read-modify-write cycles on the same task would race at
//! the storage layer (last writer wins), so the store serializes them: each
//! task gets its own async mutex from a keyed registry, held across the
//! read, the pure transform, and the write. Cycles on different tasks never
//! contend. Every storage call is wrapped in a bounded timeout; an
//! unresponsive store surfaces as a failed operation rather than a hung
//! request.

use crate::shared::error::ConversationError;
use crate::shared::thread::{ConversationDocument, ThreadMessage};
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::repository::ConversationRepository;

/// Default bound on a single storage read or write.
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;

/// Per-task conversation document store.
#[derive(Clone)]
pub struct ConversationStore {
    repository: Arc<dyn ConversationRepository>,
    /// Per-task write locks, created on first touch.
    locks: Arc<StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
    storage_timeout: Duration,
}

impl ConversationStore {
    pub fn new(repository: Arc<dyn ConversationRepository>, storage_timeout: Duration) -> Self {
        Self {
            repository,
            locks: Arc::new(StdMutex::new(HashMap::new())),
            storage_timeout,
        }
    }

    /// Load the document for a task.
    ///
    /// A task with no conversation yet yields an empty document; callers
    /// must not distinguish the two cases.
    pub async fn get(&self, task_id: Uuid) -> Result<ConversationDocument, ConversationError> {
        let found = self.bounded(self.repository.find(task_id)).await?;
        Ok(found.unwrap_or_else(|| ConversationDocument::empty(task_id)))
    }

    /// Replace the document for a task with the given thread.
    ///
    /// The caller must already hold the complete desired tree; this is a
    /// full replace, not a patch. Returns the persisted document.
    pub async fn upsert(
        &self,
        task_id: Uuid,
        thread: Vec<ThreadMessage>,
    ) -> Result<ConversationDocument, ConversationError> {
        let updated_at = Utc::now();
        self.bounded(self.repository.upsert(task_id, &thread, updated_at))
            .await?;
        Ok(ConversationDocument {
            task_id,
            thread,
            updated_at,
        })
    }

    /// Run one serialized read-modify-write cycle for a task.
    ///
    /// Acquires the task's lock, loads the current thread, applies the pure
    /// transform, and persists the result. A transform error (invalid path,
    /// malformed content) aborts the cycle with nothing written.
    pub async fn mutate<F>(
        &self,
        task_id: Uuid,
        transform: F,
    ) -> Result<ConversationDocument, ConversationError>
    where
        F: FnOnce(Vec<ThreadMessage>) -> Result<Vec<ThreadMessage>, ConversationError>,
    {
        let lock = self.task_lock(task_id);
        let _guard = lock.lock().await;

        let current = self.get(task_id).await?;
        let next = transform(current.thread)?;
        self.upsert(task_id, next).await
    }

    /// Conversations ordered by last activity, most recent first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<ConversationDocument>, ConversationError> {
        self.bounded(self.repository.recent(limit)).await
    }

    /// Drop lock registry entries no cycle currently holds. Run
    /// periodically so touched-once tasks do not accumulate locks.
    pub fn cleanup_idle_locks(&self) {
        self.locks
            .lock()
            .expect("task lock registry poisoned")
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of registered per-task locks.
    pub fn lock_count(&self) -> usize {
        self.locks.lock().expect("task lock registry poisoned").len()
    }

    fn task_lock(&self, task_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("task lock registry poisoned");
        locks
            .entry(task_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = Result<T, ConversationError>>,
    ) -> Result<T, ConversationError> {
        match tokio::time::timeout(self.storage_timeout, operation).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    "[Store] Storage operation exceeded {}ms bound",
                    self.storage_timeout.as_millis()
                );
                Err(ConversationError::StorageTimeout {
                    timeout_ms: self.storage_timeout.as_millis() as u64,
                })
            }
        }
    }
}
