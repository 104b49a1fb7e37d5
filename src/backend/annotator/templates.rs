//! Annotation Templates
//!
//! The template lookup collaborator: a pure table from
//! `(field, old value, new value)` to the message lines a transition
//! produces. A miss is not an error: most field transitions have no chat
//! annotation, and the annotator skips them silently.
//!
//! Owner templates may carry `@oldowner` / `@newowner` placeholders;
//! substitution happens later in the engine, against the latest recorded
//! owner transition rather than the values that selected the template.

use std::collections::HashMap;

/// Placeholder for the previous owner in owner-change templates.
pub const OLD_OWNER_TOKEN: &str = "@oldowner";
/// Placeholder for the new owner in owner-change templates.
pub const NEW_OWNER_TOKEN: &str = "@newowner";

/// Pure lookup of annotation templates.
pub trait TemplateCatalog: Send + Sync {
    /// Template message lines for a field transition, or `None` when the
    /// transition has no annotation.
    fn lookup(&self, field: &str, old_value: &str, new_value: &str) -> Option<Vec<String>>;
}

/// Catalog backed by an in-memory table.
#[derive(Default)]
pub struct StaticTemplateCatalog {
    entries: HashMap<(String, String, String), Vec<String>>,
}

impl StaticTemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the template lines for one `(field, old, new)` transition.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
        messages: Vec<String>,
    ) {
        self.entries.insert(
            (field.into(), old_value.into(), new_value.into()),
            messages,
        );
    }

    /// The stock catalog: status transitions and the owner handover.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(
            "status",
            "Pending",
            "In Progress",
            vec!["Work started on this task.".to_string()],
        );
        catalog.insert(
            "status",
            "In Progress",
            "Completed",
            vec!["Task marked as completed.".to_string()],
        );
        catalog.insert(
            "status",
            "Pending",
            "Completed",
            vec!["Task marked as completed.".to_string()],
        );
        catalog.insert(
            "status",
            "Completed",
            "In Progress",
            vec!["Task reopened.".to_string()],
        );
        catalog.insert(
            "owner",
            "*",
            "*",
            vec![format!(
                "{} handed this task over to {}.",
                OLD_OWNER_TOKEN, NEW_OWNER_TOKEN
            )],
        );
        catalog
    }
}

impl TemplateCatalog for StaticTemplateCatalog {
    fn lookup(&self, field: &str, old_value: &str, new_value: &str) -> Option<Vec<String>> {
        self.entries
            .get(&(field.to_string(), old_value.to_string(), new_value.to_string()))
            .or_else(|| {
                // Wildcard entry for fields whose annotation does not
                // depend on the concrete values (owner handovers).
                self.entries
                    .get(&(field.to_string(), "*".to_string(), "*".to_string()))
            })
            .cloned()
    }
}

/// Substitute owner placeholders in one template line.
///
/// `old_owner`/`new_owner` come from the latest recorded owner transition.
/// When that transition is a no-op (old == new), the `@newowner` mention is
/// dropped entirely instead of rendering a redundant "X became X" message,
/// and `@oldowner` still renders the name. Dropping the mention also takes
/// the preposition it hangs off, so no "handed this task over to ." is left
/// behind.
pub fn substitute_owners(line: &str, old_owner: &str, new_owner: &str) -> String {
    if old_owner != new_owner {
        return line
            .replace(OLD_OWNER_TOKEN, old_owner)
            .replace(NEW_OWNER_TOKEN, new_owner);
    }

    let rendered = line.replace(OLD_OWNER_TOKEN, old_owner);
    let Some(pos) = rendered.find(NEW_OWNER_TOKEN) else {
        return rendered;
    };

    let mut head = rendered[..pos].trim_end();
    let (stem, last_word) = match head.rfind(' ') {
        Some(cut) => (&head[..cut], &head[cut + 1..]),
        None => ("", head),
    };
    if matches!(last_word, "to" | "by" | "with" | "for" | "over") && !stem.is_empty() {
        head = stem.trim_end();
    }

    let tail = rendered[pos + NEW_OWNER_TOKEN.len()..].trim_start();
    if tail.is_empty() {
        head.to_string()
    } else if tail.starts_with(|c: char| c.is_ascii_punctuation()) {
        format!("{head}{tail}")
    } else {
        format!("{head} {tail}")
    }
}
