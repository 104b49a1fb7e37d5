//! Annotation Engine
//!
//! The pipeline converting one batch of field changes into appended system
//! messages:
//!
//! 1. mint a change-group id for the batch
//! 2. record every delta individually under that id
//! 3. look up templates per delta; misses are skipped silently
//! 4. substitute owner placeholders from the latest recorded owner change
//! 5. prefix each line with the acting user's tag and the current time
//! 6. append through the mutator, persist, and broadcast as one update
//!
//! Note the deliberate decoupling in step 4: template *selection* keys on
//! the batch's own old/new values, but placeholder *substitution* reads the
//! latest recorded owner transition, which may lag the batch. Preserved
//! as-is from the product's documented behavior; flag changes to it for
//! product review rather than normalizing here.

use crate::backend::annotator::changes::{ChangeLog, FieldChange, FieldChangeRecord, TaskDirectory};
use crate::backend::annotator::templates::{
    substitute_owners, TemplateCatalog, NEW_OWNER_TOKEN, OLD_OWNER_TOKEN,
};
use crate::backend::conversation::mutator;
use crate::backend::conversation::store::ConversationStore;
use crate::backend::realtime::registry::RealtimeState;
use crate::shared::error::ConversationError;
use crate::shared::event::ThreadUpdate;
use crate::shared::prefix::{encode_header, sender_tag, HeaderStamp};
use crate::shared::thread::ThreadMessage;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Converts task field-change batches into conversation annotations.
pub struct AutoAnnotator {
    store: ConversationStore,
    realtime: RealtimeState,
    catalog: Arc<dyn TemplateCatalog>,
    directory: Arc<dyn TaskDirectory>,
    change_log: Arc<dyn ChangeLog>,
}

impl AutoAnnotator {
    pub fn new(
        store: ConversationStore,
        realtime: RealtimeState,
        catalog: Arc<dyn TemplateCatalog>,
        directory: Arc<dyn TaskDirectory>,
        change_log: Arc<dyn ChangeLog>,
    ) -> Self {
        Self {
            store,
            realtime,
            catalog,
            directory,
            change_log,
        }
    }

    /// Process one batch of field changes for a task.
    ///
    /// Returns the number of messages appended. A batch that resolves zero
    /// templates records its deltas but leaves the thread untouched and
    /// broadcasts nothing.
    pub async fn annotate(
        &self,
        task_id: Uuid,
        acting_user: &str,
        changes: Vec<FieldChange>,
    ) -> Result<usize, ConversationError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let group_id = Uuid::new_v4();
        let changed_at = Utc::now();
        tracing::info!(
            "[Annotator] Change group {} on task {}: {} field(s) by {}",
            group_id,
            task_id,
            changes.len(),
            acting_user
        );

        let mut lines = Vec::new();
        for change in &changes {
            self.change_log
                .record(FieldChangeRecord {
                    task_id,
                    group_id,
                    field: change.field.clone(),
                    old_value: change.old_value.clone(),
                    new_value: change.new_value.clone(),
                    acting_user: acting_user.to_string(),
                    changed_at,
                })
                .await?;

            // Selection keys on the batch's own values; a miss means "no
            // annotation for this transition" and is not an error.
            let Some(template_lines) =
                self.catalog
                    .lookup(&change.field, &change.old_value, &change.new_value)
            else {
                tracing::debug!(
                    "[Annotator] No template for {} '{}' -> '{}', skipping",
                    change.field,
                    change.old_value,
                    change.new_value
                );
                continue;
            };

            for line in template_lines {
                lines.push(self.resolve_line(task_id, line).await?);
            }
        }

        if lines.is_empty() {
            return Ok(0);
        }

        let header = encode_header(&sender_tag(acting_user), &HeaderStamp::now());
        let appended = lines.len();

        let document = self
            .store
            .mutate(task_id, move |thread| {
                let mut next = thread;
                for line in lines {
                    next = mutator::append(&next, ThreadMessage::new(format!("{header}{line}")))?;
                }
                Ok(next)
            })
            .await?;

        self.realtime.broadcast(
            task_id,
            ThreadUpdate::new(task_id, document.thread.clone(), acting_user),
        );
        tracing::info!(
            "[Annotator] Appended {} message(s) to task {}",
            appended,
            task_id
        );

        Ok(appended)
    }

    /// Substitute owner placeholders in one template line, if it has any.
    ///
    /// Values come from the latest recorded owner transition for the task.
    /// With no owner history at all, the placeholders render as empty.
    async fn resolve_line(&self, task_id: Uuid, line: String) -> Result<String, ConversationError> {
        if !line.contains(OLD_OWNER_TOKEN) && !line.contains(NEW_OWNER_TOKEN) {
            return Ok(line);
        }
        let owners = self.directory.latest_owner_change(task_id).await?;
        Ok(match owners {
            Some(change) => substitute_owners(&line, &change.old_owner, &change.new_owner),
            None => substitute_owners(&line, "", ""),
        })
    }
}
