//! Single source of truth for document-editing state.
//!
//! The store is an ordinary value owned by the editor and passed by
//! reference, so independent editors never share state. Every mutation
//! that goes through a notifying helper is announced on the [`EventBus`];
//! the `*_silently` variants exist for live gesture frames, which are
//! committed through the notifying path once the gesture ends.

mod bus;
mod collection;
mod event;

use std::collections::BTreeMap;

pub use bus::{EventBus, SubscriberError, SubscriberResult, Subscription};
pub use collection::{Collection, DocumentState, Identified};
pub use event::{CollectionKind, Selection, Slot, SlotValue, StoreEvent, Topic};

use crate::error::EditError;
use crate::history::{HistoryEntry, UndoStack};
use crate::model::{
    Annotation, EntityId, EntityKind, EntityRecord, EntityRef, RedactedArea, ResolvedRun, RunKey,
    Signature, Stamp, TextEdit, TextOverlay, TextRun, Tool, resolve_run,
};

// ============================================================================
// Notices
// ============================================================================

/// Severity of a transient user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A transient notification for the UI (e.g. "Text cannot be empty").
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

// ============================================================================
// State Store
// ============================================================================

/// Document-editing state plus the bus that announces changes to it.
#[derive(Debug)]
pub struct StateStore {
    current_page: u32,
    page_count: u32,
    scale: f32,
    tool: Tool,
    selection: Option<Selection>,
    document: DocumentState,
    /// Text runs reported by the renderer, keyed by (page, index).
    runs: BTreeMap<RunKey, TextRun>,
    history: UndoStack,
    notices: Vec<Notice>,
    next_id: EntityId,
    bus: EventBus,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::with_history(UndoStack::default())
    }
}

impl StateStore {
    /// Create an empty store with the default history limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store around an existing undo stack.
    pub fn with_history(history: UndoStack) -> Self {
        Self {
            current_page: 1,
            page_count: 0,
            scale: 1.0,
            tool: Tool::default(),
            selection: None,
            document: DocumentState::default(),
            runs: BTreeMap::new(),
            history,
            notices: Vec::new(),
            next_id: 1,
            bus: EventBus::new(),
        }
    }

    fn emit(&mut self, event: StoreEvent) {
        log::trace!("store: {}", event.topic());
        self.bus.emit(&event);
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Subscribe to one topic. Subscribers run in registration order.
    pub fn on<F>(&mut self, topic: Topic, callback: F) -> Subscription
    where
        F: FnMut(&StoreEvent) -> SubscriberResult + 'static,
    {
        self.bus.on(topic, callback)
    }

    /// Subscribe to every event.
    pub fn on_any<F>(&mut self, callback: F) -> Subscription
    where
        F: FnMut(&StoreEvent) -> SubscriberResult + 'static,
    {
        self.bus.on_any(callback)
    }

    /// Unsubscribe. Returns false for an unknown subscription.
    pub fn off(&mut self, subscription: Subscription) -> bool {
        self.bus.off(subscription)
    }

    // ------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------

    /// Current value of a scalar slot.
    pub fn get(&self, slot: Slot) -> SlotValue {
        match slot {
            Slot::CurrentPage => SlotValue::CurrentPage(self.current_page),
            Slot::PageCount => SlotValue::PageCount(self.page_count),
            Slot::Scale => SlotValue::Scale(self.scale),
            Slot::CurrentTool => SlotValue::CurrentTool(self.tool),
            Slot::Selection => SlotValue::Selection(self.selection),
        }
    }

    /// Replace a slot's value and announce `{old, new}`.
    ///
    /// Writing the value the slot already holds is not a change and emits
    /// nothing. Returns whether the value changed.
    pub fn set(&mut self, value: SlotValue) -> bool {
        let old = self.get(value.slot());
        if old == value {
            return false;
        }
        match value {
            SlotValue::CurrentPage(page) => self.current_page = page,
            SlotValue::PageCount(count) => self.page_count = count,
            SlotValue::Scale(scale) => self.scale = scale,
            SlotValue::CurrentTool(tool) => self.tool = tool,
            SlotValue::Selection(selection) => self.selection = selection,
        }
        self.emit(StoreEvent::SlotChanged { old, new: value });
        true
    }

    /// Page shown in the viewer (1-based).
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Number of pages in the loaded document.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Zoom factor between page space and screen space.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Active tool.
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Entity or run picked by the select tool.
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Set the viewed page. Returns whether it changed.
    pub fn set_current_page(&mut self, page: u32) -> bool {
        self.set(SlotValue::CurrentPage(page))
    }

    /// Set the page count. Returns whether it changed.
    pub fn set_page_count(&mut self, count: u32) -> bool {
        self.set(SlotValue::PageCount(count))
    }

    /// Set the zoom factor. Returns whether it changed.
    pub fn set_scale(&mut self, scale: f32) -> bool {
        self.set(SlotValue::Scale(scale))
    }

    /// Switch the active tool. Returns whether it changed.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        self.set(SlotValue::CurrentTool(tool))
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) -> bool {
        self.set(SlotValue::Selection(selection))
    }

    /// Reject pages outside the loaded document. With no document loaded
    /// (page count 0) only page 0 is rejected.
    pub fn check_page(&self, page: u32) -> Result<(), EditError> {
        if page == 0 || (self.page_count > 0 && page > self.page_count) {
            return Err(EditError::PageOutOfRange {
                page,
                page_count: self.page_count,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    /// All persisted entity collections.
    pub fn document(&self) -> &DocumentState {
        &self.document
    }

    /// The collection holding `T`, in paint order.
    pub fn items<T: Collection>(&self) -> &[T] {
        T::items(&self.document)
    }

    fn changed<T: Collection>(&mut self) {
        let len = T::items(&self.document).len();
        self.emit(StoreEvent::Changed {
            collection: T::KIND,
            len,
        });
    }

    /// Append an item. Emits `added` then `changed`; returns its index.
    pub fn push<T: Collection>(&mut self, item: T) -> usize {
        let items = T::items_mut(&mut self.document);
        items.push(item);
        let index = items.len() - 1;
        self.emit(StoreEvent::Added {
            collection: T::KIND,
            index,
        });
        self.changed::<T>();
        index
    }

    /// Insert at `index`, clamped to the collection length.
    pub fn insert_at<T: Collection>(&mut self, index: usize, item: T) -> usize {
        let items = T::items_mut(&mut self.document);
        let index = index.min(items.len());
        items.insert(index, item);
        self.emit(StoreEvent::Added {
            collection: T::KIND,
            index,
        });
        self.changed::<T>();
        index
    }

    /// Remove the item at `index`. Out-of-range is a silent no-op.
    pub fn remove_at<T: Collection>(&mut self, index: usize) -> Option<T> {
        let items = T::items_mut(&mut self.document);
        if index >= items.len() {
            return None;
        }
        let removed = items.remove(index);
        self.emit(StoreEvent::Removed {
            collection: T::KIND,
            index,
        });
        self.changed::<T>();
        Some(removed)
    }

    /// Remove every item matching `predicate`, returning each with the
    /// index it held before the call. One `removed` per item, then a
    /// single `changed`; nothing is emitted when no item matched.
    pub fn remove_where<T, F>(&mut self, mut predicate: F) -> Vec<(usize, T)>
    where
        T: Collection,
        F: FnMut(&T) -> bool,
    {
        let items = std::mem::take(T::items_mut(&mut self.document));
        let mut kept = Vec::with_capacity(items.len());
        let mut removed = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            if predicate(&item) {
                removed.push((index, item));
            } else {
                kept.push(item);
            }
        }
        *T::items_mut(&mut self.document) = kept;

        if removed.is_empty() {
            return removed;
        }
        for (index, _) in &removed {
            self.emit(StoreEvent::Removed {
                collection: T::KIND,
                index: *index,
            });
        }
        self.changed::<T>();
        removed
    }

    /// Replace the item at `index`. Out-of-range is a silent no-op.
    pub fn update_at<T: Collection>(&mut self, index: usize, value: T) -> bool {
        let Some(slot) = T::items_mut(&mut self.document).get_mut(index) else {
            return false;
        };
        *slot = value;
        self.notify_updated::<T>(index);
        true
    }

    /// Direct access for live gesture frames; emits nothing.
    pub fn item_mut<T: Collection>(&mut self, index: usize) -> Option<&mut T> {
        T::items_mut(&mut self.document).get_mut(index)
    }

    /// Announce an in-place change made through [`StateStore::item_mut`].
    pub fn notify_updated<T: Collection>(&mut self, index: usize) {
        self.emit(StoreEvent::Updated {
            collection: T::KIND,
            index,
        });
        self.changed::<T>();
    }

    /// Index of the entity with `id` in its collection.
    pub fn index_of<T: Identified>(&self, id: EntityId) -> Option<usize> {
        T::items(&self.document).iter().position(|item| item.id() == id)
    }

    /// Look up an entity by id.
    pub fn find<T: Identified>(&self, id: EntityId) -> Option<&T> {
        T::items(&self.document).iter().find(|item| item.id() == id)
    }

    // ------------------------------------------------------------------
    // Records (kind-erased access for history and gestures)
    // ------------------------------------------------------------------

    /// Kind-erased copy of an entity.
    pub fn record(&self, entity: EntityRef) -> Option<EntityRecord> {
        let id = entity.id;
        match entity.kind {
            EntityKind::Overlay => self.find::<TextOverlay>(id).cloned().map(EntityRecord::Overlay),
            EntityKind::Annotation => self
                .find::<Annotation>(id)
                .cloned()
                .map(EntityRecord::Annotation),
            EntityKind::Redaction => self
                .find::<RedactedArea>(id)
                .cloned()
                .map(EntityRecord::Redaction),
            EntityKind::Signature => self
                .find::<Signature>(id)
                .cloned()
                .map(EntityRecord::Signature),
            EntityKind::Stamp => self.find::<Stamp>(id).cloned().map(EntityRecord::Stamp),
        }
    }

    /// Index of an entity in the collection of its kind.
    pub fn position_of(&self, entity: EntityRef) -> Option<usize> {
        let id = entity.id;
        match entity.kind {
            EntityKind::Overlay => self.index_of::<TextOverlay>(id),
            EntityKind::Annotation => self.index_of::<Annotation>(id),
            EntityKind::Redaction => self.index_of::<RedactedArea>(id),
            EntityKind::Signature => self.index_of::<Signature>(id),
            EntityKind::Stamp => self.index_of::<Stamp>(id),
        }
    }

    /// All entities on `page`, in paint order (later entries on top).
    pub fn records_on_page(&self, page: u32) -> Vec<EntityRecord> {
        let doc = &self.document;
        doc.redactions
            .iter()
            .cloned()
            .map(EntityRecord::Redaction)
            .chain(doc.annotations.iter().cloned().map(EntityRecord::Annotation))
            .chain(doc.signatures.iter().cloned().map(EntityRecord::Signature))
            .chain(doc.stamps.iter().cloned().map(EntityRecord::Stamp))
            .chain(doc.text_overlays.iter().cloned().map(EntityRecord::Overlay))
            .filter(|r| r.page() == page)
            .collect()
    }

    /// Insert a record at `index` (or append). Returns the final index.
    pub fn insert_record(&mut self, record: EntityRecord, index: Option<usize>) -> usize {
        match record {
            EntityRecord::Overlay(o) => self.insert_item(o, index),
            EntityRecord::Annotation(a) => self.insert_item(a, index),
            EntityRecord::Redaction(r) => self.insert_item(r, index),
            EntityRecord::Signature(s) => self.insert_item(s, index),
            EntityRecord::Stamp(s) => self.insert_item(s, index),
        }
    }

    fn insert_item<T: Collection>(&mut self, item: T, index: Option<usize>) -> usize {
        match index {
            Some(index) => self.insert_at(index, item),
            None => self.push(item),
        }
    }

    /// Remove an entity by reference, clearing the selection if it pointed
    /// at it. `None` when the entity is already gone.
    pub fn remove_record(&mut self, entity: EntityRef) -> Option<(usize, EntityRecord)> {
        let index = self.position_of(entity)?;
        let record = match entity.kind {
            EntityKind::Overlay => self.remove_at::<TextOverlay>(index).map(EntityRecord::Overlay),
            EntityKind::Annotation => self
                .remove_at::<Annotation>(index)
                .map(EntityRecord::Annotation),
            EntityKind::Redaction => self
                .remove_at::<RedactedArea>(index)
                .map(EntityRecord::Redaction),
            EntityKind::Signature => self
                .remove_at::<Signature>(index)
                .map(EntityRecord::Signature),
            EntityKind::Stamp => self.remove_at::<Stamp>(index).map(EntityRecord::Stamp),
        }?;
        if self.selection == Some(Selection::Entity(entity)) {
            self.set_selection(None);
        }
        Some((index, record))
    }

    /// Overwrite the stored entity with the same kind and id, notifying.
    pub fn replace_record(&mut self, record: EntityRecord) -> bool {
        self.replace_record_with(record, true)
    }

    /// Overwrite without notifying (live drag/resize frames).
    pub fn replace_record_silently(&mut self, record: EntityRecord) -> bool {
        self.replace_record_with(record, false)
    }

    fn replace_record_with(&mut self, record: EntityRecord, notify: bool) -> bool {
        match record {
            EntityRecord::Overlay(o) => self.replace_item(o, notify),
            EntityRecord::Annotation(a) => self.replace_item(a, notify),
            EntityRecord::Redaction(r) => self.replace_item(r, notify),
            EntityRecord::Signature(s) => self.replace_item(s, notify),
            EntityRecord::Stamp(s) => self.replace_item(s, notify),
        }
    }

    fn replace_item<T: Identified>(&mut self, item: T, notify: bool) -> bool {
        let Some(index) = self.index_of::<T>(item.id()) else {
            return false;
        };
        if notify {
            self.update_at(index, item)
        } else if let Some(slot) = self.item_mut::<T>(index) {
            *slot = item;
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------
    // Text edits and runs
    // ------------------------------------------------------------------

    /// The edit applied to a run, if any.
    pub fn text_edit(&self, key: RunKey) -> Option<&TextEdit> {
        self.document.text_edits.iter().find(|e| e.key() == key)
    }

    /// Index of a run's edit in the text edit collection.
    pub fn text_edit_index(&self, key: RunKey) -> Option<usize> {
        self.document.text_edits.iter().position(|e| e.key() == key)
    }

    /// Upsert (`Some`) or revert (`None`) the edit of one run.
    ///
    /// At most one edit exists per run. Returns false when nothing changed.
    pub fn set_text_edit(&mut self, key: RunKey, edit: Option<TextEdit>) -> bool {
        match (self.text_edit_index(key), edit) {
            (Some(index), Some(edit)) => {
                if self.document.text_edits[index] == edit {
                    return false;
                }
                self.update_at(index, edit)
            }
            (None, Some(edit)) => {
                self.push(edit);
                true
            }
            (Some(index), None) => self.remove_at::<TextEdit>(index).is_some(),
            (None, None) => false,
        }
    }

    /// Upsert or remove without notifying (live drag/resize frames).
    pub fn set_text_edit_silently(&mut self, key: RunKey, edit: Option<TextEdit>) {
        let index = self.text_edit_index(key);
        let edits = &mut self.document.text_edits;
        match (index, edit) {
            (Some(index), Some(edit)) => edits[index] = edit,
            (None, Some(edit)) => edits.push(edit),
            (Some(index), None) => {
                edits.remove(index);
            }
            (None, None) => {}
        }
    }

    /// Replace the runs of `page` with a fresh set from the renderer.
    pub fn register_runs(&mut self, page: u32, runs: Vec<TextRun>) {
        self.runs.retain(|key, _| key.page != page);
        let count = runs.len();
        for run in runs {
            self.runs.insert(run.key, run);
        }
        log::debug!("Registered {count} text runs on page {page}");
        self.emit(StoreEvent::RunsRegistered { page, count });
    }

    /// A registered run as the renderer reported it.
    pub fn run(&self, key: RunKey) -> Option<&TextRun> {
        self.runs.get(&key)
    }

    /// The run as currently displayed: its edit if any, else the original.
    pub fn resolved_run(&self, key: RunKey) -> Option<ResolvedRun> {
        resolve_run(self.run(key), self.text_edit(key))
    }

    /// Every run of `page` as displayed, including edits whose run has not
    /// been registered (yet).
    pub fn resolved_runs_on(&self, page: u32) -> Vec<ResolvedRun> {
        let mut keys: Vec<RunKey> = self
            .runs
            .range(RunKey::new(page, 0)..=RunKey::new(page, usize::MAX))
            .map(|(key, _)| *key)
            .collect();
        for edit in &self.document.text_edits {
            if edit.page == page && !self.runs.contains_key(&edit.key()) {
                keys.push(edit.key());
            }
        }
        keys.sort();
        keys.into_iter()
            .filter_map(|key| self.resolved_run(key))
            .collect()
    }

    // ------------------------------------------------------------------
    // Page rotations
    // ------------------------------------------------------------------

    /// Rotation of a page in degrees; 0 when never rotated.
    pub fn page_rotation(&self, page: u32) -> i32 {
        self.document.page_rotations.get(&page).copied().unwrap_or(0)
    }

    /// Store a page's rotation; 0 removes the entry.
    pub fn set_page_rotation(&mut self, page: u32, degrees: i32) -> bool {
        let old = self.page_rotation(page);
        if old == degrees {
            return false;
        }
        if degrees == 0 {
            self.document.page_rotations.remove(&page);
        } else {
            self.document.page_rotations.insert(page, degrees);
        }
        self.emit(StoreEvent::PageRotated {
            page,
            old,
            new: degrees,
        });
        true
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Undo/redo history.
    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut UndoStack {
        &mut self.history
    }

    /// Record a user action. Clears the redo stack.
    pub fn add_to_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        self.notify_history();
    }

    /// Drop all undo and redo entries.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.notify_history();
    }

    pub(crate) fn notify_history(&mut self) {
        let undo = self.history.undo_count();
        let redo = self.history.redo_count();
        self.emit(StoreEvent::HistoryChanged { undo, redo });
    }

    // ------------------------------------------------------------------
    // Ids and document lifecycle
    // ------------------------------------------------------------------

    /// Hand out a session-unique entity id.
    pub fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Start over for a newly loaded document.
    pub fn reset(&mut self, page_count: u32) {
        self.runs.clear();
        self.set_selection(None);
        self.replace_document(DocumentState::default());
        self.history.clear();
        self.notify_history();
        self.set_page_count(page_count);
        self.set_current_page(1);
    }

    /// Swap in a whole document state (session restore).
    ///
    /// Announces `changed` for every collection and every rotation that
    /// differs. Ids allocated afterwards never collide with restored ones.
    pub fn replace_document(&mut self, document: DocumentState) {
        let old = std::mem::replace(&mut self.document, document);
        self.next_id = self.next_id.max(self.document.max_id() + 1);

        if let Some(Selection::Entity(entity)) = self.selection
            && self.position_of(entity).is_none()
        {
            self.set_selection(None);
        }

        for kind in CollectionKind::all() {
            let len = self.document.len_of(*kind);
            self.emit(StoreEvent::Changed {
                collection: *kind,
                len,
            });
        }

        let pages: std::collections::BTreeSet<u32> = old
            .page_rotations
            .keys()
            .chain(self.document.page_rotations.keys())
            .copied()
            .collect();
        for page in pages {
            let before = old.page_rotations.get(&page).copied().unwrap_or(0);
            let after = self.page_rotation(page);
            if before != after {
                self.emit(StoreEvent::PageRotated {
                    page,
                    old: before,
                    new: after,
                });
            }
        }
    }

    // ------------------------------------------------------------------
    // Notices
    // ------------------------------------------------------------------

    /// Queue a transient message for the UI.
    pub fn post_notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        log::info!("Notice ({level:?}): {message}");
        self.notices.push(Notice { level, message });
        self.emit(StoreEvent::NoticePosted);
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};
    use crate::model::{OverlayDraft, TextEditOverrides};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(store: &mut StateStore) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        store.on_any(move |event| {
            sink.borrow_mut().push(event.topic().to_string());
            Ok(())
        });
        log
    }

    fn overlay(id: EntityId) -> TextOverlay {
        OverlayDraft::new(1, 10.0, 10.0, "Note").build(id).unwrap()
    }

    fn run(page: u32, index: usize, text: &str) -> TextRun {
        TextRun {
            key: RunKey::new(page, index),
            text: text.to_string(),
            x: 20.0,
            y: 30.0,
            width: 60.0,
            font_size: 12.0,
            font_name: "Helvetica".to_string(),
        }
    }

    #[test]
    fn test_set_notifies_old_and_new() {
        let mut store = StateStore::new();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        store.on(Topic::Slot(Slot::Scale), move |event| {
            *sink.borrow_mut() = Some(event.clone());
            Ok(())
        });

        assert!(store.set_scale(1.5));
        assert_eq!(
            *seen.borrow(),
            Some(StoreEvent::SlotChanged {
                old: SlotValue::Scale(1.0),
                new: SlotValue::Scale(1.5)
            })
        );
        assert_eq!(store.get(Slot::Scale), SlotValue::Scale(1.5));
        assert!(!store.set_scale(1.5));
    }

    #[test]
    fn test_collection_helpers_emit_specific_then_changed() {
        let mut store = StateStore::new();
        let log = recorder(&mut store);

        store.push(overlay(1));
        store.update_at(0, overlay(1));
        store.remove_at::<TextOverlay>(0);

        assert_eq!(
            *log.borrow(),
            vec![
                "textOverlays:added",
                "textOverlays:changed",
                "textOverlays:updated",
                "textOverlays:changed",
                "textOverlays:removed",
                "textOverlays:changed",
            ]
        );
    }

    #[test]
    fn test_invalid_index_is_silent_noop() {
        let mut store = StateStore::new();
        let log = recorder(&mut store);
        assert!(store.remove_at::<TextOverlay>(3).is_none());
        assert!(!store.update_at(3, overlay(1)));
        assert!(store.remove_where::<TextOverlay, _>(|_| true).is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_remove_where_reports_original_indices() {
        let mut store = StateStore::new();
        for id in 1..=4 {
            store.push(overlay(id));
        }
        let removed = store.remove_where::<TextOverlay, _>(|o| o.id % 2 == 0);
        let indices: Vec<usize> = removed.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(store.items::<TextOverlay>().len(), 2);
    }

    #[test]
    fn test_failing_subscriber_does_not_block_store() {
        let mut store = StateStore::new();
        store.on_any(|_| Err(SubscriberError::new("listener broke")));
        let log = recorder(&mut store);
        store.push(overlay(1));
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(store.items::<TextOverlay>().len(), 1);
    }

    #[test]
    fn test_remove_record_clears_selection() {
        let mut store = StateStore::new();
        store.push(overlay(7));
        let entity = EntityRef::new(EntityKind::Overlay, 7);
        store.set_selection(Some(Selection::Entity(entity)));

        let (index, record) = store.remove_record(entity).unwrap();
        assert_eq!(index, 0);
        assert_eq!(record.id(), 7);
        assert_eq!(store.selection(), None);
        assert!(store.remove_record(entity).is_none());
    }

    #[test]
    fn test_replace_record_silently_emits_nothing() {
        let mut store = StateStore::new();
        store.push(overlay(1));
        let log = recorder(&mut store);
        let moved = EntityRecord::Overlay(overlay(1))
            .moved_to(Point::new(90.0, 90.0))
            .unwrap();
        assert!(store.replace_record_silently(moved.clone()));
        assert!(log.borrow().is_empty());
        assert_eq!(store.items::<TextOverlay>()[0].x, 90.0);

        assert!(store.replace_record(moved));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_one_edit_per_run() {
        let mut store = StateStore::new();
        let source = run(2, 5, "Invoice");
        store.register_runs(2, vec![source.clone()]);
        let key = source.key;

        let first = TextEdit::from_run(&source, &TextEditOverrides::text("Bill"));
        assert!(store.set_text_edit(key, Some(first.clone())));
        let mut second = first.clone();
        second.apply(&TextEditOverrides::text("Receipt"));
        assert!(store.set_text_edit(key, Some(second)));
        assert_eq!(store.items::<TextEdit>().len(), 1);
        assert_eq!(store.resolved_run(key).unwrap().text, "Receipt");

        assert!(store.set_text_edit(key, None));
        let reverted = store.resolved_run(key).unwrap();
        assert_eq!(reverted.text, "Invoice");
        assert_eq!((reverted.x, reverted.y), (20.0, 30.0));
        assert!(!store.set_text_edit(key, None));
    }

    #[test]
    fn test_resolved_runs_include_orphan_edits() {
        let mut store = StateStore::new();
        let a = run(1, 0, "A");
        let c = run(1, 2, "C");
        store.register_runs(1, vec![a, c]);
        let orphan = TextEdit::from_run(&run(1, 1, "B"), &TextEditOverrides::text("b"));
        store.set_text_edit(orphan.key(), Some(orphan));
        store.register_runs(2, vec![run(2, 0, "other")]);

        let texts: Vec<String> = store
            .resolved_runs_on(1)
            .into_iter()
            .map(|r| r.text)
            .collect();
        assert_eq!(texts, vec!["A", "b", "C"]);
    }

    #[test]
    fn test_replace_document_bumps_ids() {
        let mut store = StateStore::new();
        let mut doc = DocumentState::default();
        doc.redactions
            .push(RedactedArea::new(41, 1, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap());
        doc.page_rotations.insert(2, 90);

        let log = recorder(&mut store);
        store.replace_document(doc);
        assert_eq!(store.allocate_id(), 42);
        assert_eq!(store.page_rotation(2), 90);
        assert!(log.borrow().contains(&"pageRotations:changed".to_string()));
        assert!(log.borrow().contains(&"patches:changed".to_string()));
    }

    #[test]
    fn test_page_rotation_zero_removes_entry() {
        let mut store = StateStore::new();
        assert!(store.set_page_rotation(1, 180));
        assert!(!store.set_page_rotation(1, 180));
        assert!(store.set_page_rotation(1, 0));
        assert!(store.document().page_rotations.is_empty());
    }

    #[test]
    fn test_check_page() {
        let mut store = StateStore::new();
        assert!(store.check_page(0).is_err());
        assert!(store.check_page(50).is_ok());
        store.set_page_count(3);
        assert!(store.check_page(3).is_ok());
        assert_eq!(
            store.check_page(4),
            Err(EditError::PageOutOfRange {
                page: 4,
                page_count: 3
            })
        );
    }

    #[test]
    fn test_notices_drain() {
        let mut store = StateStore::new();
        store.post_notice(NoticeLevel::Warning, "Text cannot be empty");
        let notices = store.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert!(store.take_notices().is_empty());
    }
}
