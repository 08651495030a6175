//! Typed events published by the state store.

use std::fmt;

use crate::model::{EntityRef, RunKey, Tool};

/// Scalar slots of the store addressable through `get`/`set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    CurrentPage,
    PageCount,
    Scale,
    CurrentTool,
    Selection,
}

impl Slot {
    pub fn name(&self) -> &'static str {
        match self {
            Slot::CurrentPage => "currentPage",
            Slot::PageCount => "pageCount",
            Slot::Scale => "scale",
            Slot::CurrentTool => "currentTool",
            Slot::Selection => "selection",
        }
    }
}

/// What the select tool currently has picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    Entity(EntityRef),
    Run(RunKey),
}

/// The value held in a [`Slot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotValue {
    CurrentPage(u32),
    PageCount(u32),
    Scale(f32),
    CurrentTool(Tool),
    Selection(Option<Selection>),
}

impl SlotValue {
    pub fn slot(&self) -> Slot {
        match self {
            SlotValue::CurrentPage(_) => Slot::CurrentPage,
            SlotValue::PageCount(_) => Slot::PageCount,
            SlotValue::Scale(_) => Slot::Scale,
            SlotValue::CurrentTool(_) => Slot::CurrentTool,
            SlotValue::Selection(_) => Slot::Selection,
        }
    }
}

/// Entity collections owned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    TextOverlays,
    TextEdits,
    Annotations,
    Redactions,
    Signatures,
    Stamps,
}

impl CollectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            CollectionKind::TextOverlays => "textOverlays",
            CollectionKind::TextEdits => "textEdits",
            CollectionKind::Annotations => "annotations",
            CollectionKind::Redactions => "patches",
            CollectionKind::Signatures => "signatures",
            CollectionKind::Stamps => "stamps",
        }
    }

    pub fn all() -> &'static [CollectionKind] {
        &[
            CollectionKind::TextOverlays,
            CollectionKind::TextEdits,
            CollectionKind::Annotations,
            CollectionKind::Redactions,
            CollectionKind::Signatures,
            CollectionKind::Stamps,
        ]
    }
}

/// Everything the store can announce.
///
/// Collection helpers emit the specific event (`Added`, `Removed`,
/// `Updated`) first and the generic `Changed` right after it.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    SlotChanged { old: SlotValue, new: SlotValue },
    Added { collection: CollectionKind, index: usize },
    Removed { collection: CollectionKind, index: usize },
    Updated { collection: CollectionKind, index: usize },
    Changed { collection: CollectionKind, len: usize },
    PageRotated { page: u32, old: i32, new: i32 },
    RunsRegistered { page: u32, count: usize },
    HistoryChanged { undo: usize, redo: usize },
    NoticePosted,
}

impl StoreEvent {
    pub fn topic(&self) -> Topic {
        match self {
            StoreEvent::SlotChanged { new, .. } => Topic::Slot(new.slot()),
            StoreEvent::Added { collection, .. } => Topic::Added(*collection),
            StoreEvent::Removed { collection, .. } => Topic::Removed(*collection),
            StoreEvent::Updated { collection, .. } => Topic::Updated(*collection),
            StoreEvent::Changed { collection, .. } => Topic::Changed(*collection),
            StoreEvent::PageRotated { .. } => Topic::PageRotation,
            StoreEvent::RunsRegistered { .. } => Topic::Runs,
            StoreEvent::HistoryChanged { .. } => Topic::History,
            StoreEvent::NoticePosted => Topic::Notice,
        }
    }

    /// Whether the event alters state that a saved session captures.
    pub fn is_persistent_change(&self) -> bool {
        match self {
            StoreEvent::SlotChanged { new, .. } => matches!(
                new.slot(),
                Slot::CurrentPage | Slot::Scale | Slot::CurrentTool
            ),
            StoreEvent::Changed { .. } | StoreEvent::PageRotated { .. } => true,
            _ => false,
        }
    }
}

/// Subscription filter; one per event variant family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Slot(Slot),
    Added(CollectionKind),
    Removed(CollectionKind),
    Updated(CollectionKind),
    Changed(CollectionKind),
    PageRotation,
    Runs,
    History,
    Notice,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Slot(slot) => write!(f, "{}:changed", slot.name()),
            Topic::Added(c) => write!(f, "{}:added", c.name()),
            Topic::Removed(c) => write!(f, "{}:removed", c.name()),
            Topic::Updated(c) => write!(f, "{}:updated", c.name()),
            Topic::Changed(c) => write!(f, "{}:changed", c.name()),
            Topic::PageRotation => f.write_str("pageRotations:changed"),
            Topic::Runs => f.write_str("runs:registered"),
            Topic::History => f.write_str("history:changed"),
            Topic::Notice => f.write_str("notice:posted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_names() {
        assert_eq!(Topic::Added(CollectionKind::TextOverlays).to_string(), "textOverlays:added");
        assert_eq!(Topic::Slot(Slot::Scale).to_string(), "scale:changed");
    }

    #[test]
    fn test_persistent_changes() {
        let zoom = StoreEvent::SlotChanged {
            old: SlotValue::Scale(1.0),
            new: SlotValue::Scale(2.0),
        };
        assert!(zoom.is_persistent_change());

        let select = StoreEvent::SlotChanged {
            old: SlotValue::Selection(None),
            new: SlotValue::Selection(None),
        };
        assert!(!select.is_persistent_change());
        assert!(!StoreEvent::HistoryChanged { undo: 1, redo: 0 }.is_persistent_change());
    }
}
