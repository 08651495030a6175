//! Drag and resize gestures on existing entities and text runs.
//!
//! Both gestures capture a snapshot of their target when they start. Live
//! frames write to the store silently; the pointer-up restores the snapshot
//! and then writes the final value through the notifying path, so
//! subscribers see exactly one change per gesture and one history entry is
//! recorded. Cancelling restores the snapshot.

use web_time::Instant;

use super::resize::{Handle, resize_bounds, resize_font};
use super::{GestureOutcome, PointerEvent};
use crate::config::InteractionConfig;
use crate::geometry::{Point, Rect};
use crate::history::HistoryEntry;
use crate::model::{EntityRecord, EntityRef, RunKey, TextEdit, TextEditOverrides};
use crate::store::StateStore;

/// What a drag or resize acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Item(EntityRef),
    Run(RunKey),
}

/// Target state captured when the gesture started.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Snapshot {
    Item(EntityRecord),
    Run {
        key: RunKey,
        edit: Option<TextEdit>,
    },
}

/// A candidate value for the target.
#[derive(Debug, Clone, PartialEq)]
enum Change {
    Item(EntityRecord),
    Run(TextEdit),
}

impl Snapshot {
    pub(crate) fn capture(store: &StateStore, target: DragTarget) -> Option<Self> {
        match target {
            DragTarget::Item(entity) => store.record(entity).map(Snapshot::Item),
            DragTarget::Run(key) => {
                let edit = store.text_edit(key).cloned();
                if edit.is_none() && store.run(key).is_none() {
                    return None;
                }
                Some(Snapshot::Run { key, edit })
            }
        }
    }

    pub(crate) fn target(&self) -> DragTarget {
        match self {
            Snapshot::Item(record) => DragTarget::Item(record.entity_ref()),
            Snapshot::Run { key, .. } => DragTarget::Run(*key),
        }
    }

    /// Whether the target was deleted by another code path.
    fn is_stale(&self, store: &StateStore) -> bool {
        match self {
            Snapshot::Item(record) => store.position_of(record.entity_ref()).is_none(),
            Snapshot::Run { key, edit: Some(_) } => store.text_edit(*key).is_none(),
            Snapshot::Run { key, edit: None } => store.run(*key).is_none(),
        }
    }

    fn restore(&self, store: &mut StateStore) {
        match self {
            Snapshot::Item(record) => {
                store.replace_record_silently(record.clone());
            }
            Snapshot::Run { key, edit } => store.set_text_edit_silently(*key, edit.clone()),
        }
    }

    /// The run edit with `overrides` applied, starting from the snapshot.
    fn run_edit(store: &StateStore, key: RunKey, base: &Option<TextEdit>, overrides: &TextEditOverrides) -> Option<TextEdit> {
        match base {
            Some(edit) => {
                let mut edit = edit.clone();
                edit.apply(overrides);
                Some(edit)
            }
            None => store.run(key).map(|run| TextEdit::from_run(run, overrides)),
        }
    }

    fn write_live(store: &mut StateStore, change: Change) {
        match change {
            Change::Item(record) => {
                store.replace_record_silently(record);
            }
            Change::Run(edit) => store.set_text_edit_silently(edit.key(), Some(edit)),
        }
    }

    /// Write the final value through the notifying path and record it.
    fn commit(&self, store: &mut StateStore, change: Change) -> GestureOutcome {
        self.restore(store);
        match (self, change) {
            (Snapshot::Item(before), Change::Item(after)) => {
                if *before == after {
                    return GestureOutcome::Discarded;
                }
                store.replace_record(after.clone());
                store.add_to_history(HistoryEntry::Modified {
                    before: before.clone(),
                    after,
                });
                GestureOutcome::Committed
            }
            (Snapshot::Run { key, edit: before }, Change::Run(after)) => {
                let unchanged = match before {
                    Some(before) => *before == after,
                    None => store
                        .run(*key)
                        .is_some_and(|run| TextEdit::from_run(run, &TextEditOverrides::default()) == after),
                };
                if unchanged {
                    return GestureOutcome::Discarded;
                }
                store.set_text_edit(*key, Some(after.clone()));
                store.add_to_history(HistoryEntry::TextEdited {
                    key: *key,
                    before: before.clone(),
                    after: Some(after),
                });
                GestureOutcome::Committed
            }
            _ => GestureOutcome::Discarded,
        }
    }
}

// ============================================================================
// Drag
// ============================================================================

/// Moving an entity or run. Armed on pointer-down, active once confirmed.
#[derive(Debug, Clone)]
pub struct DragGesture {
    snapshot: Snapshot,
    start: Point,
    /// Target's top-left corner when the gesture started.
    origin: Point,
    started_at: Instant,
    active: bool,
}

impl DragGesture {
    pub(crate) fn arm(store: &StateStore, target: DragTarget, event: &PointerEvent) -> Option<Self> {
        let snapshot = Snapshot::capture(store, target)?;
        let origin = match &snapshot {
            Snapshot::Item(record) if record.is_movable() => record.bounds().top_left(),
            Snapshot::Item(_) => return None,
            Snapshot::Run { key, .. } => store.resolved_run(*key)?.bounds().top_left(),
        };
        log::debug!("Drag armed on {:?}", snapshot.target());
        Some(Self {
            snapshot,
            start: event.pos,
            origin,
            started_at: event.at,
            active: false,
        })
    }

    pub fn target(&self) -> DragTarget {
        self.snapshot.target()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the pointer has travelled the threshold on either axis.
    fn travelled(&self, pos: Point, settings: &InteractionConfig) -> bool {
        let dx = (pos.x - self.start.x).abs();
        let dy = (pos.y - self.start.y).abs();
        dx >= settings.drag_threshold || dy >= settings.drag_threshold
    }

    /// A press becomes a live drag once the confirm delay has passed and the
    /// pointer has travelled the threshold.
    fn confirms(&self, event: &PointerEvent, settings: &InteractionConfig) -> bool {
        let elapsed = event.at.saturating_duration_since(self.started_at);
        elapsed >= settings.drag_confirm_delay() && self.travelled(event.pos, settings)
    }

    fn change_at(&self, store: &StateStore, pos: Point) -> Option<Change> {
        let origin = self.origin.offset(pos.x - self.start.x, pos.y - self.start.y);
        match &self.snapshot {
            Snapshot::Item(record) => record.moved_to(origin).map(Change::Item),
            Snapshot::Run { key, edit } => {
                Snapshot::run_edit(store, *key, edit, &TextEditOverrides::position(origin))
                    .map(Change::Run)
            }
        }
    }

    pub(crate) fn update(&mut self, store: &mut StateStore, event: &PointerEvent, settings: &InteractionConfig) -> GestureOutcome {
        if self.snapshot.is_stale(store) {
            log::debug!("Drag target {:?} disappeared, discarding", self.target());
            return GestureOutcome::Discarded;
        }
        if !self.active {
            if !self.confirms(event, settings) {
                return GestureOutcome::None;
            }
            self.active = true;
            log::debug!("Drag confirmed on {:?}", self.target());
        }
        match self.change_at(store, event.pos) {
            Some(change) => {
                Snapshot::write_live(store, change);
                GestureOutcome::Updated
            }
            None => GestureOutcome::None,
        }
    }

    pub(crate) fn finish(mut self, store: &mut StateStore, event: &PointerEvent, settings: &InteractionConfig) -> GestureOutcome {
        if self.snapshot.is_stale(store) {
            return GestureOutcome::Discarded;
        }
        // Release only checks travel, so a fast flick still moves the target.
        if !self.active && self.travelled(event.pos, settings) {
            self.active = true;
        }
        if !self.active {
            log::trace!("Click on {:?}, no drag", self.target());
            return GestureOutcome::Discarded;
        }
        match self.change_at(store, event.pos) {
            Some(change) => self.snapshot.commit(store, change),
            None => {
                self.snapshot.restore(store);
                GestureOutcome::Discarded
            }
        }
    }

    pub(crate) fn cancel(&self, store: &mut StateStore) {
        if self.active && !self.snapshot.is_stale(store) {
            self.snapshot.restore(store);
        }
    }
}

// ============================================================================
// Resize
// ============================================================================

/// Which property a resize handle edits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeKind {
    /// Font size of an overlay or run, from vertical travel
    Font { start_size: f32 },
    /// Bounding box, from the handle's edges
    Bounds { handle: Handle, start: Rect },
}

/// Resizing from a handle. Active from pointer-down.
#[derive(Debug, Clone)]
pub struct ResizeGesture {
    snapshot: Snapshot,
    start: Point,
    kind: ResizeKind,
}

impl ResizeGesture {
    /// Grab the font handle of an overlay or run.
    pub(crate) fn font(store: &StateStore, target: DragTarget, pos: Point) -> Option<Self> {
        let snapshot = Snapshot::capture(store, target)?;
        let start_size = match &snapshot {
            Snapshot::Item(EntityRecord::Overlay(overlay)) => overlay.font_size,
            Snapshot::Item(_) => return None,
            Snapshot::Run { key, .. } => store.resolved_run(*key)?.font_size,
        };
        Some(Self::begin(snapshot, pos, ResizeKind::Font { start_size }))
    }

    /// Grab a bounding-box handle of a resizable entity.
    pub(crate) fn bounds(store: &StateStore, entity: EntityRef, handle: Handle, pos: Point) -> Option<Self> {
        let snapshot = Snapshot::capture(store, DragTarget::Item(entity))?;
        let start = match &snapshot {
            Snapshot::Item(record) if record.is_movable() => record.bounds(),
            _ => return None,
        };
        Some(Self::begin(snapshot, pos, ResizeKind::Bounds { handle, start }))
    }

    fn begin(snapshot: Snapshot, pos: Point, kind: ResizeKind) -> Self {
        log::debug!("Resize started on {:?} ({:?})", snapshot.target(), kind);
        Self {
            snapshot,
            start: pos,
            kind,
        }
    }

    pub fn target(&self) -> DragTarget {
        self.snapshot.target()
    }

    pub fn kind(&self) -> ResizeKind {
        self.kind
    }

    fn change_at(&self, store: &StateStore, pos: Point, settings: &InteractionConfig) -> Option<Change> {
        let dx = pos.x - self.start.x;
        let dy = pos.y - self.start.y;
        match (self.kind, &self.snapshot) {
            (ResizeKind::Font { start_size }, snapshot) => {
                let size = resize_font(
                    start_size,
                    dy,
                    settings.font_resize_ratio,
                    settings.min_font_size,
                    settings.max_font_size,
                );
                match snapshot {
                    Snapshot::Item(EntityRecord::Overlay(overlay)) => {
                        let mut overlay = overlay.clone();
                        overlay.font_size = size;
                        Some(Change::Item(EntityRecord::Overlay(overlay)))
                    }
                    Snapshot::Item(_) => None,
                    Snapshot::Run { key, edit } => {
                        Snapshot::run_edit(store, *key, edit, &TextEditOverrides::font_size(size))
                            .map(Change::Run)
                    }
                }
            }
            (ResizeKind::Bounds { handle, start }, Snapshot::Item(record)) => {
                let rect = resize_bounds(
                    &start,
                    handle,
                    dx,
                    dy,
                    settings.min_overlay_width,
                    settings.min_overlay_height,
                );
                record.with_bounds(rect).map(Change::Item)
            }
            (ResizeKind::Bounds { .. }, Snapshot::Run { .. }) => None,
        }
    }

    pub(crate) fn update(&mut self, store: &mut StateStore, event: &PointerEvent, settings: &InteractionConfig) -> GestureOutcome {
        if self.snapshot.is_stale(store) {
            log::debug!("Resize target {:?} disappeared, discarding", self.target());
            return GestureOutcome::Discarded;
        }
        match self.change_at(store, event.pos, settings) {
            Some(change) => {
                Snapshot::write_live(store, change);
                GestureOutcome::Updated
            }
            None => GestureOutcome::None,
        }
    }

    pub(crate) fn finish(self, store: &mut StateStore, event: &PointerEvent, settings: &InteractionConfig) -> GestureOutcome {
        if self.snapshot.is_stale(store) {
            return GestureOutcome::Discarded;
        }
        match self.change_at(store, event.pos, settings) {
            Some(change) => self.snapshot.commit(store, change),
            None => {
                self.snapshot.restore(store);
                GestureOutcome::Discarded
            }
        }
    }

    pub(crate) fn cancel(&self, store: &mut StateStore) {
        if !self.snapshot.is_stale(store) {
            self.snapshot.restore(store);
        }
    }
}
