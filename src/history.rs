//! Undo/Redo history for document edits.
//!
//! Every user action that creates, changes or deletes an entity records one
//! [`HistoryEntry`] holding both the before and after state, so the same
//! entry can be undone and redone any number of times. Passive changes
//! (tool switches, zoom, page navigation) are never recorded.

use crate::model::{Annotation, EntityKind, EntityRecord, RunKey, TextEdit};
use crate::store::StateStore;

// ============================================================================
// History Entries
// ============================================================================

/// One reversible operation.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    /// An entity was created
    Added {
        /// The entity as created
        record: EntityRecord,
    },
    /// An entity was deleted
    Removed {
        /// Position it held in its collection
        index: usize,
        /// The entity as it was (restored on undo)
        record: EntityRecord,
    },
    /// An entity was moved, resized or restyled
    Modified {
        /// State before the change
        before: EntityRecord,
        /// State after the change
        after: EntityRecord,
    },
    /// A text run's edit was created, changed or reverted
    TextEdited {
        /// The run
        key: RunKey,
        /// Edit before the change (`None`: run was unedited)
        before: Option<TextEdit>,
        /// Edit after the change (`None`: run reverted)
        after: Option<TextEdit>,
    },
    /// Annotations removed by a bulk clear
    AnnotationsCleared {
        /// Each removed annotation with the index it held
        removed: Vec<(usize, Annotation)>,
    },
    /// A page's rotation changed
    PageRotated {
        /// 1-based page
        page: u32,
        /// Degrees before
        before: i32,
        /// Degrees after
        after: i32,
    },
}

impl HistoryEntry {
    /// Get a human-readable description of this entry
    pub fn description(&self) -> String {
        match self {
            HistoryEntry::Added { record } => format!("Add {}", record.kind().name()),
            HistoryEntry::Removed { record, .. } => format!("Delete {}", record.kind().name()),
            HistoryEntry::Modified { before, after } => {
                if before.bounds() != after.bounds() {
                    format!("Move/resize {}", after.kind().name())
                } else {
                    format!("Edit {}", after.kind().name())
                }
            }
            HistoryEntry::TextEdited { after: None, .. } => "Revert text".to_string(),
            HistoryEntry::TextEdited {
                before: Some(b),
                after: Some(a),
                ..
            } if b.new_text == a.new_text && b.font_size == a.font_size => {
                "Move text".to_string()
            }
            HistoryEntry::TextEdited { .. } => "Edit text".to_string(),
            HistoryEntry::AnnotationsCleared { removed } => {
                format!("Clear {} annotations", removed.len())
            }
            HistoryEntry::PageRotated { page, .. } => format!("Rotate page {page}"),
        }
    }
}

// ============================================================================
// Undo Stack
// ============================================================================

/// The undo/redo history stack.
///
/// Maintains two stacks, most recent entry at the end of each. Pushing a
/// new entry clears the redo stack; undo moves an entry from the undo stack
/// to the redo stack and redo moves it back.
#[derive(Debug, Clone)]
pub struct UndoStack {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_history: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::with_limit(crate::constants::DEFAULT_MAX_HISTORY)
    }
}

impl UndoStack {
    /// Create a stack with the default history limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack that keeps at most `max_history` undo entries.
    pub fn with_limit(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_history: max_history.max(1),
        }
    }

    /// Push an entry to the undo stack and clear the redo stack.
    pub fn push(&mut self, entry: HistoryEntry) {
        log::debug!("📝 Undo: pushed '{}'", entry.description());
        self.undo_stack.push(entry);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.max_history {
            let excess = self.undo_stack.len() - self.max_history;
            self.undo_stack.drain(..excess);
        }
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Move the newest undo entry onto the redo stack and return it.
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.undo_stack.pop()?;
        log::debug!("⏪ Undo: '{}'", entry.description());
        self.redo_stack.push(entry.clone());
        Some(entry)
    }

    /// Move the newest redo entry back onto the undo stack and return it.
    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        log::debug!("⏩ Redo: '{}'", entry.description());
        self.undo_stack.push(entry.clone());
        Some(entry)
    }

    /// Description of the entry the next undo would revert.
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(HistoryEntry::description)
    }

    /// Description of the entry the next redo would reapply.
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(HistoryEntry::description)
    }

    /// Entries that can be undone, oldest first.
    pub fn undo_entries(&self) -> &[HistoryEntry] {
        &self.undo_stack
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ Undo history cleared");
    }

    /// Number of entries that can be undone.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of entries that can be redone.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Undo/Redo Execution
// ============================================================================

/// Undo the newest entry. Returns false if there was nothing to undo.
pub fn undo(store: &mut StateStore) -> bool {
    let Some(entry) = store.history_mut().pop_undo() else {
        return false;
    };
    apply_undo(&entry, store);
    store.notify_history();
    true
}

/// Redo the newest undone entry. Returns false if there was nothing to redo.
pub fn redo(store: &mut StateStore) -> bool {
    let Some(entry) = store.history_mut().pop_redo() else {
        return false;
    };
    apply_redo(&entry, store);
    store.notify_history();
    true
}

fn apply_undo(entry: &HistoryEntry, store: &mut StateStore) {
    match entry {
        HistoryEntry::Added { record } => {
            store.remove_record(record.entity_ref());
        }
        HistoryEntry::Removed { index, record } => {
            store.insert_record(record.clone(), Some(*index));
        }
        HistoryEntry::Modified { before, .. } => {
            store.replace_record(before.clone());
        }
        HistoryEntry::TextEdited { key, before, .. } => {
            store.set_text_edit(*key, before.clone());
        }
        HistoryEntry::AnnotationsCleared { removed } => {
            for (index, annotation) in removed {
                store.insert_record(EntityRecord::Annotation(annotation.clone()), Some(*index));
            }
        }
        HistoryEntry::PageRotated { page, before, .. } => {
            store.set_page_rotation(*page, *before);
        }
    }
}

fn apply_redo(entry: &HistoryEntry, store: &mut StateStore) {
    match entry {
        HistoryEntry::Added { record } => {
            store.insert_record(record.clone(), None);
        }
        HistoryEntry::Removed { record, .. } => {
            store.remove_record(record.entity_ref());
        }
        HistoryEntry::Modified { after, .. } => {
            store.replace_record(after.clone());
        }
        HistoryEntry::TextEdited { key, after, .. } => {
            store.set_text_edit(*key, after.clone());
        }
        HistoryEntry::AnnotationsCleared { removed } => {
            for (_, annotation) in removed {
                store.remove_record(crate::model::EntityRef::new(
                    EntityKind::Annotation,
                    annotation.id,
                ));
            }
        }
        HistoryEntry::PageRotated { page, after, .. } => {
            store.set_page_rotation(*page, *after);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
