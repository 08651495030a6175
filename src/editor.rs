//! The editor: owns the state store and wires gestures, history and
//! session persistence to it.
//!
//! Every user action goes through an [`Editor`] method. Actions that change
//! the document record exactly one history entry; actions rejected for
//! invalid input return an [`EditError`] and queue a [`Notice`] for the UI.

use web_time::Instant;

use crate::collaborators::{ExportDocument, OcrResult, RenderedTextItem, runs_from_items};
use crate::config::EditorConfig;
use crate::error::EditError;
use crate::geometry::{Rect, Viewport};
use crate::history::{self, HistoryEntry, UndoStack};
use crate::interaction::{GestureOutcome, GesturePhase, InteractionController, PointerEvent};
use crate::model::{
    Annotation, EntityId, EntityKind, EntityRecord, EntityRef, OverlayDraft, OverlayPatch,
    PenStyle, RunKey, Signature, Stamp, TextEdit, TextEditOverrides, TextOverlay, Tool,
};
use crate::session::{MemoryStorage, RestoreOutcome, SessionError, SessionManager, SessionStorage};
use crate::store::{Notice, NoticeLevel, Selection, StateStore};

/// One editing session over one loaded document.
#[derive(Debug)]
pub struct Editor<S: SessionStorage> {
    store: StateStore,
    interaction: InteractionController,
    session: SessionManager<S>,
}

impl Editor<MemoryStorage> {
    /// Editor with default settings and a process-local session store.
    pub fn in_memory() -> Self {
        Self::new(&EditorConfig::default(), MemoryStorage::new())
    }
}

impl<S: SessionStorage> Editor<S> {
    pub fn new(config: &EditorConfig, storage: S) -> Self {
        let mut store =
            StateStore::with_history(UndoStack::with_limit(config.history.max_history));
        let mut session = SessionManager::new(storage, &config.session);
        session.attach(&mut store);
        Self {
            store,
            interaction: InteractionController::new(config.interaction.clone()),
            session,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Direct store access, e.g. to subscribe to events.
    pub fn store_mut(&mut self) -> &mut StateStore {
        &mut self.store
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn session(&self) -> &SessionManager<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionManager<S> {
        &mut self.session
    }

    // ========================================================================
    // Document lifecycle
    // ========================================================================

    /// Start editing newly loaded document bytes, restoring the stored
    /// session when it belongs to the same document.
    pub fn load_document(&mut self, bytes: &[u8], page_count: u32) -> RestoreOutcome {
        self.interaction.cancel(&mut self.store);
        let outcome = self.session.open_document(&mut self.store, bytes, page_count);
        log::info!("Loaded document ({} pages): {:?}", page_count, outcome);
        outcome
    }

    /// Register the text content the renderer reported for `page`.
    pub fn register_text_items(&mut self, page: u32, items: &[RenderedTextItem], viewport: &Viewport) {
        let runs = runs_from_items(page, items, viewport);
        log::debug!("Page {}: {} text runs", page, runs.len());
        self.store.register_runs(page, runs);
    }

    // ========================================================================
    // Overlays, signatures and stamps
    // ========================================================================

    /// Add a text overlay and select it.
    pub fn add_text_overlay(&mut self, draft: OverlayDraft) -> Result<EntityId, EditError> {
        self.interaction.cancel(&mut self.store);
        let result = self.build_overlay(draft);
        let overlay = self.report(result)?;
        Ok(self.add_record(EntityRecord::Overlay(overlay)))
    }

    /// Add recognized text as an overlay over the region it was found in.
    pub fn insert_ocr_result(&mut self, result: &OcrResult) -> Result<EntityId, EditError> {
        log::debug!(
            "OCR result: {} words at {:.0}% confidence",
            result.word_count,
            result.confidence
        );
        self.add_text_overlay(result.to_draft())
    }

    /// Change an overlay's text or style.
    ///
    /// `Ok(false)` when the overlay no longer exists or nothing changed.
    pub fn update_overlay(&mut self, id: EntityId, patch: &OverlayPatch) -> Result<bool, EditError> {
        self.interaction.cancel(&mut self.store);
        let Some(before) = self.store.find::<TextOverlay>(id).cloned() else {
            return Ok(false);
        };
        let result = patch.apply(&before);
        let after = self.report(result)?;
        if after == before {
            return Ok(false);
        }
        self.store.replace_record(EntityRecord::Overlay(after.clone()));
        self.store.add_to_history(HistoryEntry::Modified {
            before: EntityRecord::Overlay(before),
            after: EntityRecord::Overlay(after),
        });
        Ok(true)
    }

    pub fn delete_overlay(&mut self, id: EntityId) -> bool {
        self.delete_item(EntityRef::new(EntityKind::Overlay, id))
    }

    pub fn add_signature(&mut self, page: u32, rect: Rect, image: &str) -> Result<EntityId, EditError> {
        self.interaction.cancel(&mut self.store);
        let result = self
            .store
            .check_page(page)
            .and_then(|()| Signature::new(0, page, rect, image));
        let mut signature = self.report(result)?;
        signature.id = self.store.allocate_id();
        Ok(self.add_record(EntityRecord::Signature(signature)))
    }

    pub fn add_stamp(&mut self, page: u32, rect: Rect, label: &str, color: &str) -> Result<EntityId, EditError> {
        self.interaction.cancel(&mut self.store);
        let result = self
            .store
            .check_page(page)
            .and_then(|()| Stamp::new(0, page, rect, label, color));
        let mut stamp = self.report(result)?;
        stamp.id = self.store.allocate_id();
        Ok(self.add_record(EntityRecord::Stamp(stamp)))
    }

    /// Delete any entity. `false` when it is already gone.
    pub fn delete_item(&mut self, entity: EntityRef) -> bool {
        self.interaction.cancel(&mut self.store);
        let Some((index, record)) = self.store.remove_record(entity) else {
            log::debug!("Delete of missing {} {}", entity.kind.name(), entity.id);
            return false;
        };
        log::debug!("Deleted {} {}", entity.kind.name(), entity.id);
        self.store.add_to_history(HistoryEntry::Removed { index, record });
        true
    }

    /// Delete whatever the select tool has selected. A selected run is
    /// reverted instead.
    pub fn delete_selection(&mut self) -> bool {
        self.interaction.cancel(&mut self.store);
        match self.store.selection() {
            Some(Selection::Entity(entity)) => self.delete_item(entity),
            Some(Selection::Run(key)) => self.revert_run(key),
            None => false,
        }
    }

    fn build_overlay(&mut self, draft: OverlayDraft) -> Result<TextOverlay, EditError> {
        self.store.check_page(draft.page)?;
        let mut overlay = draft.build(0)?;
        overlay.id = self.store.allocate_id();
        Ok(overlay)
    }

    fn add_record(&mut self, record: EntityRecord) -> EntityId {
        let entity = record.entity_ref();
        self.store.insert_record(record.clone(), None);
        self.store.add_to_history(HistoryEntry::Added { record });
        self.store.set_selection(Some(Selection::Entity(entity)));
        log::debug!("Added {} {}", entity.kind.name(), entity.id);
        entity.id
    }

    // ========================================================================
    // Text runs
    // ========================================================================

    /// Edit a rendered text run, creating its edit on first use.
    ///
    /// `Ok(false)` when the edit would not change anything.
    pub fn edit_run(&mut self, key: RunKey, overrides: &TextEditOverrides) -> Result<bool, EditError> {
        self.interaction.cancel(&mut self.store);
        let result = self.next_edit(key, overrides);
        let (before, after) = self.report(result)?;
        if before.as_ref() == Some(&after) {
            return Ok(false);
        }
        self.store.set_text_edit(key, Some(after.clone()));
        self.store.add_to_history(HistoryEntry::TextEdited {
            key,
            before,
            after: Some(after),
        });
        Ok(true)
    }

    /// Drop a run's edit so it shows its original text at its original
    /// position again. `false` when the run was not edited.
    pub fn revert_run(&mut self, key: RunKey) -> bool {
        self.interaction.cancel(&mut self.store);
        let Some(before) = self.store.text_edit(key).cloned() else {
            return false;
        };
        self.store.set_text_edit(key, None);
        self.store.add_to_history(HistoryEntry::TextEdited {
            key,
            before: Some(before),
            after: None,
        });
        true
    }

    fn next_edit(
        &self,
        key: RunKey,
        overrides: &TextEditOverrides,
    ) -> Result<(Option<TextEdit>, TextEdit), EditError> {
        if let Some(text) = &overrides.text
            && text.trim().is_empty()
        {
            return Err(EditError::EmptyText);
        }
        let before = self.store.text_edit(key).cloned();
        let after = match &before {
            Some(edit) => {
                let mut next = edit.clone();
                next.apply(overrides);
                next
            }
            None => {
                let run = self.store.run(key).ok_or(EditError::UnknownRun {
                    page: key.page,
                    index: key.index,
                })?;
                TextEdit::from_run(run, overrides)
            }
        };
        Ok((before, after))
    }

    // ========================================================================
    // Page-level edits
    // ========================================================================

    /// Rotate a page by `delta` degrees; returns the new rotation.
    pub fn rotate_page(&mut self, page: u32, delta: i32) -> Result<i32, EditError> {
        self.interaction.cancel(&mut self.store);
        let result = self.store.check_page(page).and_then(|()| {
            if delta % 90 == 0 {
                Ok(())
            } else {
                Err(EditError::InvalidRotation(delta))
            }
        });
        self.report(result)?;

        let before = self.store.page_rotation(page);
        let after = (before + delta.rem_euclid(360)).rem_euclid(360);
        if self.store.set_page_rotation(page, after) {
            self.store
                .add_to_history(HistoryEntry::PageRotated { page, before, after });
        }
        Ok(after)
    }

    /// Remove every annotation, or those of one page, as one undoable step.
    /// Returns how many were removed.
    pub fn clear_annotations(&mut self, page: Option<u32>) -> usize {
        self.interaction.cancel(&mut self.store);
        let removed = self
            .store
            .remove_where::<Annotation, _>(|a| page.is_none_or(|p| a.page == p));
        if removed.is_empty() {
            return 0;
        }
        if let Some(Selection::Entity(entity)) = self.store.selection()
            && entity.kind == EntityKind::Annotation
            && removed.iter().any(|(_, a)| a.id == entity.id)
        {
            self.store.set_selection(None);
        }
        let count = removed.len();
        log::debug!("Cleared {} annotations", count);
        self.store
            .add_to_history(HistoryEntry::AnnotationsCleared { removed });
        count
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn undo(&mut self) -> bool {
        self.interaction.cancel(&mut self.store);
        history::undo(&mut self.store)
    }

    pub fn redo(&mut self) -> bool {
        self.interaction.cancel(&mut self.store);
        history::redo(&mut self.store)
    }

    pub fn can_undo(&self) -> bool {
        self.store.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.history().can_redo()
    }

    // ========================================================================
    // Tool, page and zoom
    // ========================================================================

    /// Switch tools, cancelling any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        if self.interaction.phase() != GesturePhase::Idle {
            self.interaction.cancel(&mut self.store);
        }
        if tool != Tool::Select {
            self.store.set_selection(None);
        }
        self.store.set_tool(tool)
    }

    pub fn set_pen(&mut self, pen: PenStyle) {
        self.interaction.set_pen(pen);
    }

    pub fn set_page(&mut self, page: u32) -> Result<bool, EditError> {
        let result = self.store.check_page(page);
        self.report(result)?;
        self.interaction.cancel(&mut self.store);
        Ok(self.store.set_current_page(page))
    }

    /// Set the zoom factor. Non-finite or non-positive values are ignored.
    pub fn set_scale(&mut self, scale: f32) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            log::debug!("Ignoring invalid scale {}", scale);
            return false;
        }
        self.interaction.cancel(&mut self.store);
        self.store.set_scale(scale)
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    pub fn pointer_down(&mut self, event: PointerEvent) -> GestureOutcome {
        self.interaction.pointer_down(&mut self.store, event)
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> GestureOutcome {
        self.interaction.pointer_move(&mut self.store, event)
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> GestureOutcome {
        self.interaction.pointer_up(&mut self.store, event)
    }

    /// Escape: abort the gesture in progress.
    pub fn cancel_gesture(&mut self) -> GestureOutcome {
        self.interaction.cancel(&mut self.store)
    }

    // ========================================================================
    // Session and output
    // ========================================================================

    /// Run a due auto-save. Call from the host's timer or frame loop.
    /// Deferred while a gesture holds uncommitted live frames.
    pub fn poll_autosave(&mut self, now: Instant) -> bool {
        if self.interaction.phase() != GesturePhase::Idle {
            log::trace!("Auto-save deferred until the gesture ends");
            return false;
        }
        self.session.poll(&self.store, now)
    }

    /// Save now, bypassing the debounce. A gesture in progress is cancelled
    /// first.
    pub fn flush_session(&mut self) -> Result<(), SessionError> {
        self.interaction.cancel(&mut self.store);
        self.session.flush(&self.store).inspect_err(|e| {
            log::warn!("Session flush failed: {}", e);
        })
    }

    /// Re-check the stored session against the document bytes.
    pub fn restore_session(&mut self, bytes: &[u8]) -> RestoreOutcome {
        self.interaction.cancel(&mut self.store);
        self.session.restore(&mut self.store, bytes)
    }

    pub fn export(&self) -> ExportDocument {
        ExportDocument::capture(&self.store)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.store.take_notices()
    }

    /// Queue a notice for a rejected action and pass the result through.
    fn report<T>(&mut self, result: Result<T, EditError>) -> Result<T, EditError> {
        if let Err(e) = &result {
            self.store.post_notice(NoticeLevel::Warning, e.to_string());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::TextRun;

    fn editor(pages: u32) -> Editor<MemoryStorage> {
        let mut editor = Editor::in_memory();
        editor.load_document(b"%PDF-1.7 test", pages);
        editor
    }

    fn invoice_run() -> TextRun {
        TextRun {
            key: RunKey::new(2, 5),
            text: "Invoice".to_string(),
            x: 120.0,
            y: 48.0,
            width: 70.0,
            font_size: 12.0,
            font_name: "Helvetica".to_string(),
        }
    }

    #[test]
    fn test_add_overlay_selects_and_records() {
        let mut editor = editor(3);
        let id = editor
            .add_text_overlay(OverlayDraft::new(1, 100.0, 100.0, "Hello"))
            .unwrap();
        assert_eq!(editor.store().items::<TextOverlay>().len(), 1);
        assert_eq!(
            editor.store().selection(),
            Some(Selection::Entity(EntityRef::new(EntityKind::Overlay, id)))
        );
        assert_eq!(editor.store().history().undo_count(), 1);
    }

    #[test]
    fn test_empty_text_rejected_with_notice() {
        let mut editor = editor(3);
        let err = editor
            .add_text_overlay(OverlayDraft::new(1, 0.0, 0.0, "   "))
            .unwrap_err();
        assert_eq!(err, EditError::EmptyText);
        assert!(editor.store().items::<TextOverlay>().is_empty());
        assert!(!editor.can_undo());

        let notices = editor.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Text cannot be empty");
        assert!(editor.take_notices().is_empty());
    }

    #[test]
    fn test_page_out_of_range_rejected() {
        let mut editor = editor(2);
        let err = editor
            .add_text_overlay(OverlayDraft::new(5, 0.0, 0.0, "x"))
            .unwrap_err();
        assert!(matches!(err, EditError::PageOutOfRange { page: 5, page_count: 2 }));
        assert!(editor.add_signature(0, Rect::new(0.0, 0.0, 10.0, 10.0), "data:").is_err());
    }

    #[test]
    fn test_update_overlay() {
        let mut editor = editor(1);
        let id = editor
            .add_text_overlay(OverlayDraft::new(1, 0.0, 0.0, "Draft"))
            .unwrap();
        assert!(editor.update_overlay(id, &OverlayPatch::text("Final")).unwrap());
        assert!(!editor.update_overlay(id, &OverlayPatch::text("Final")).unwrap());
        assert!(editor.update_overlay(id, &OverlayPatch::text("")).is_err());
        assert!(!editor.update_overlay(999, &OverlayPatch::text("x")).unwrap());
        assert_eq!(editor.store().history().undo_count(), 2);

        editor.undo();
        assert_eq!(editor.store().find::<TextOverlay>(id).unwrap().text, "Draft");
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut editor = editor(1);
        assert!(!editor.delete_overlay(42));
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_edit_and_revert_run() {
        let mut editor = editor(3);
        let run = invoice_run();
        editor.store_mut().register_runs(2, vec![run.clone()]);

        assert!(editor.edit_run(run.key, &TextEditOverrides::text("Bill")).unwrap());
        assert_eq!(editor.store().resolved_run(run.key).unwrap().text, "Bill");
        assert!(!editor.edit_run(run.key, &TextEditOverrides::text("Bill")).unwrap());

        assert!(editor.revert_run(run.key));
        let resolved = editor.store().resolved_run(run.key).unwrap();
        assert_eq!(resolved.text, "Invoice");
        assert_eq!((resolved.x, resolved.y), (120.0, 48.0));
        assert!(!editor.revert_run(run.key));
        assert_eq!(editor.store().history().undo_count(), 2);
    }

    #[test]
    fn test_edit_unknown_run() {
        let mut editor = editor(3);
        let err = editor
            .edit_run(RunKey::new(1, 0), &TextEditOverrides::text("x"))
            .unwrap_err();
        assert_eq!(err, EditError::UnknownRun { page: 1, index: 0 });
    }

    #[test]
    fn test_rotate_page() {
        let mut editor = editor(2);
        assert_eq!(editor.rotate_page(1, 90).unwrap(), 90);
        assert_eq!(editor.rotate_page(1, -180).unwrap(), 270);
        assert_eq!(editor.rotate_page(1, 90).unwrap(), 0);
        assert!(editor.store().document().page_rotations.is_empty());
        assert_eq!(editor.rotate_page(1, 45), Err(EditError::InvalidRotation(45)));
        assert_eq!(editor.store().history().undo_count(), 3);

        editor.undo();
        assert_eq!(editor.store().page_rotation(1), 270);
    }

    #[test]
    fn test_rotate_page_large_delta() {
        let mut editor = editor(2);
        editor.rotate_page(1, 270).unwrap();
        // 2147483610 is 90 * 23860929 and wraps to +90.
        assert_eq!(editor.rotate_page(1, 2_147_483_610).unwrap(), 0);
        assert_eq!(editor.rotate_page(2, -2_147_483_610).unwrap(), 270);
        assert_eq!(
            editor.rotate_page(2, i32::MIN),
            Err(EditError::InvalidRotation(i32::MIN))
        );
    }

    #[test]
    fn test_clear_annotations_single_entry() {
        let mut editor = editor(2);
        let pen = PenStyle::default();
        for (page, x) in [(1, 0.0), (2, 10.0), (1, 20.0)] {
            let shape = crate::model::AnnotationShape::Rectangle {
                start: Point::new(x, 0.0),
                end: Point::new(x + 5.0, 5.0),
            };
            let id = editor.store_mut().allocate_id();
            let annotation = Annotation::new(id, page, shape, &pen).unwrap();
            editor.store_mut().push(annotation);
        }

        assert_eq!(editor.clear_annotations(Some(1)), 2);
        assert_eq!(editor.store().items::<Annotation>().len(), 1);
        assert_eq!(editor.clear_annotations(Some(1)), 0);
        assert_eq!(editor.store().history().undo_count(), 1);

        editor.undo();
        let pages: Vec<u32> = editor.store().items::<Annotation>().iter().map(|a| a.page).collect();
        assert_eq!(pages, vec![1, 2, 1]);
    }

    #[test]
    fn test_tool_switch_is_not_recorded() {
        let mut editor = editor(1);
        assert!(editor.set_tool(Tool::Freehand));
        assert!(!editor.set_tool(Tool::Freehand));
        assert!(editor.set_scale(2.0));
        assert!(!editor.set_scale(f32::NAN));
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_signature_and_stamp() {
        let mut editor = editor(1);
        let sig = editor
            .add_signature(1, Rect::new(10.0, 10.0, 120.0, 40.0), "data:image/png;base64,AA==")
            .unwrap();
        let stamp = editor
            .add_stamp(1, Rect::new(200.0, 10.0, 100.0, 40.0), "PAID", "#2e7d32")
            .unwrap();
        assert_ne!(sig, stamp);
        assert!(editor.add_stamp(1, Rect::new(0.0, 0.0, 10.0, 10.0), " ", "#000").is_err());

        assert!(editor.delete_selection());
        assert!(editor.store().items::<Stamp>().is_empty());
        assert_eq!(editor.store().items::<Signature>().len(), 1);
    }

    #[test]
    fn test_edits_mark_session_dirty() {
        let mut editor = editor(1);
        assert!(!editor.session().is_dirty());
        editor
            .add_text_overlay(OverlayDraft::new(1, 0.0, 0.0, "x"))
            .unwrap();
        assert!(editor.session().is_dirty());
        editor.flush_session().unwrap();
        assert!(!editor.session().is_dirty());
    }
}
