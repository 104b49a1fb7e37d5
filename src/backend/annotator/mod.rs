//! Automatic Change Annotator
//!
//! Turns task field-change events into system messages in the task's
//! conversation. A batch of changes from one edit action gets a single
//! correlation id (the change group), each delta is recorded individually
//! under that id, and every delta with a matching template contributes
//! messages appended through the same mutation pipeline user messages use.
//!
//! - **`templates`** - the template catalog collaborator and placeholder
//!   substitution
//! - **`changes`** - change-group records, the change log, and the
//!   owner-history lookup
//! - **`engine`** - the annotation pipeline itself
//! - **`handlers`** - the field-change HTTP intake

pub mod changes;
pub mod engine;
pub mod handlers;
pub mod templates;

pub use engine::AutoAnnotator;
