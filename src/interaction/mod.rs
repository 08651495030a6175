//! Pointer gesture handling.
//!
//! The [`InteractionController`] turns pointer-down/move/up streams into
//! entity mutations, one gesture at a time. Each gesture goes
//! `idle → armed → active → committed | discarded`; switching tools,
//! pressing escape or starting a new gesture cancels the current one and
//! leaves the store as it was before the gesture became active.

mod drawing;
mod gesture;
mod resize;
mod selection;

pub use drawing::DrawGesture;
pub use gesture::{DragGesture, DragTarget, ResizeGesture, ResizeKind};
pub use resize::{Handle, hit_handle, resize_bounds, resize_font};
pub use selection::{OcrRequest, SelectionGesture, SelectionPurpose, SelectionRect};

use web_time::Instant;

use crate::config::InteractionConfig;
use crate::geometry::{HitTest, Point};
use crate::model::{AnnotationShape, EntityKind, PenStyle, Tool};
use crate::store::{Selection, StateStore};

/// One pointer sample in page-local screen units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// 1-based page under the pointer
    pub page: u32,
    pub pos: Point,
    pub at: Instant,
}

impl PointerEvent {
    pub fn new(page: u32, x: f32, y: f32, at: Instant) -> Self {
        Self {
            page,
            pos: Point::new(x, y),
            at,
        }
    }
}

/// Result of feeding one pointer event to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing happened
    None,
    /// A gesture started and is waiting for movement
    Armed,
    /// A live frame was applied
    Updated,
    /// The gesture changed the document and recorded one history entry
    Committed,
    /// The gesture ended without changing the document
    Discarded,
    /// The gesture was aborted and its live changes rolled back
    Cancelled,
    /// A region was picked for the OCR collaborator
    OcrRequested(OcrRequest),
    /// The add-text tool was clicked; the caller should collect text
    TextPlacementRequested { page: u32, at: Point },
}

/// Coarse state of the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Armed,
    Active,
}

/// The gesture in progress. At most one exists at a time.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Drag(DragGesture),
    Resize(ResizeGesture),
    Select(SelectionGesture),
    Draw(DrawGesture),
}

impl Gesture {
    pub fn phase(&self) -> GesturePhase {
        match self {
            Gesture::Idle => GesturePhase::Idle,
            Gesture::Drag(drag) if !drag.is_active() => GesturePhase::Armed,
            Gesture::Select(select) if !select.is_active() => GesturePhase::Armed,
            _ => GesturePhase::Active,
        }
    }
}

/// Translates pointer streams into store mutations.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    settings: InteractionConfig,
    pen: PenStyle,
    gesture: Gesture,
}

impl InteractionController {
    pub fn new(settings: InteractionConfig) -> Self {
        Self {
            settings,
            pen: PenStyle::default(),
            gesture: Gesture::Idle,
        }
    }

    pub fn settings(&self) -> &InteractionConfig {
        &self.settings
    }

    pub fn pen(&self) -> &PenStyle {
        &self.pen
    }

    pub fn set_pen(&mut self, pen: PenStyle) {
        self.pen = pen;
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    /// Normalized rectangle of an in-progress region selection, for the
    /// visual indicator.
    pub fn selection_rect(&self) -> Option<SelectionRect> {
        match &self.gesture {
            Gesture::Select(select) => Some(select.normalized()),
            _ => None,
        }
    }

    /// Shape of an in-progress drawing.
    pub fn draft_annotation(&self) -> Option<(u32, AnnotationShape)> {
        match &self.gesture {
            Gesture::Draw(draw) => draw.preview().map(|shape| (draw.page(), shape)),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Pointer events
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, store: &mut StateStore, event: PointerEvent) -> GestureOutcome {
        if self.phase() != GesturePhase::Idle {
            self.cancel(store);
        }
        if store.check_page(event.page).is_err() {
            log::debug!("Pointer down on invalid page {}", event.page);
            return GestureOutcome::None;
        }

        let tool = store.tool();
        match tool {
            Tool::Select => self.begin_select_tool(store, &event),
            Tool::AddText => GestureOutcome::TextPlacementRequested {
                page: event.page,
                at: event.pos,
            },
            Tool::Freehand | Tool::Rectangle | Tool::Circle => {
                match DrawGesture::start(tool, event.page, event.pos) {
                    Some(draw) => {
                        self.gesture = Gesture::Draw(draw);
                        GestureOutcome::Armed
                    }
                    None => GestureOutcome::None,
                }
            }
            Tool::OcrSelect | Tool::Erase => match SelectionPurpose::for_tool(tool) {
                Some(purpose) => {
                    self.gesture =
                        Gesture::Select(SelectionGesture::new(purpose, event.page, event.pos));
                    GestureOutcome::Armed
                }
                None => GestureOutcome::None,
            },
        }
    }

    pub fn pointer_move(&mut self, store: &mut StateStore, event: PointerEvent) -> GestureOutcome {
        let outcome = match &mut self.gesture {
            Gesture::Idle => return GestureOutcome::None,
            Gesture::Drag(drag) => drag.update(store, &event, &self.settings),
            Gesture::Resize(resize) => resize.update(store, &event, &self.settings),
            Gesture::Select(select) => {
                select.update(event.pos);
                GestureOutcome::Updated
            }
            Gesture::Draw(draw) => {
                draw.add_point(event.pos);
                GestureOutcome::Updated
            }
        };
        if outcome == GestureOutcome::Discarded {
            self.gesture = Gesture::Idle;
        }
        outcome
    }

    pub fn pointer_up(&mut self, store: &mut StateStore, event: PointerEvent) -> GestureOutcome {
        let outcome = match std::mem::take(&mut self.gesture) {
            Gesture::Idle => GestureOutcome::None,
            Gesture::Drag(drag) => drag.finish(store, &event, &self.settings),
            Gesture::Resize(resize) => resize.finish(store, &event, &self.settings),
            Gesture::Select(select) => select.finish(store, event.pos, &self.settings),
            Gesture::Draw(draw) => draw.finish(store, event.pos, &self.pen),
        };
        log::debug!("Gesture ended: {outcome:?}");
        outcome
    }

    /// Abort the current gesture, rolling back any live changes.
    pub fn cancel(&mut self, store: &mut StateStore) -> GestureOutcome {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => GestureOutcome::None,
            Gesture::Drag(drag) => {
                drag.cancel(store);
                log::debug!("Drag cancelled");
                GestureOutcome::Cancelled
            }
            Gesture::Resize(resize) => {
                resize.cancel(store);
                log::debug!("Resize cancelled");
                GestureOutcome::Cancelled
            }
            Gesture::Select(_) | Gesture::Draw(_) => {
                log::debug!("Gesture cancelled");
                GestureOutcome::Cancelled
            }
        }
    }

    // ------------------------------------------------------------------
    // Select tool
    // ------------------------------------------------------------------

    /// Handles of the selection first, then entities, then text runs.
    fn begin_select_tool(&mut self, store: &mut StateStore, event: &PointerEvent) -> GestureOutcome {
        if let Some(resize) = self.grab_handle(store, event) {
            self.gesture = Gesture::Resize(resize);
            return GestureOutcome::Armed;
        }

        let hit_entity = store
            .records_on_page(event.page)
            .into_iter()
            .rev()
            .find(|record| record.hit_test(&event.pos));
        if let Some(record) = hit_entity {
            let entity = record.entity_ref();
            store.set_selection(Some(Selection::Entity(entity)));
            if let Some(drag) = DragGesture::arm(store, DragTarget::Item(entity), event) {
                self.gesture = Gesture::Drag(drag);
                return GestureOutcome::Armed;
            }
            return GestureOutcome::None;
        }

        let hit_run = store
            .resolved_runs_on(event.page)
            .into_iter()
            .rev()
            .find(|run| run.bounds().contains(&event.pos));
        if let Some(run) = hit_run {
            store.set_selection(Some(Selection::Run(run.key)));
            if let Some(drag) = DragGesture::arm(store, DragTarget::Run(run.key), event) {
                self.gesture = Gesture::Drag(drag);
                return GestureOutcome::Armed;
            }
            return GestureOutcome::None;
        }

        store.set_selection(None);
        GestureOutcome::None
    }

    /// Resize gesture for a handle of the selected item under the pointer.
    ///
    /// Overlays: the south-east handle edits font size, the others the box.
    /// Signatures and stamps: all eight handles edit the box.
    /// Text runs: only the south-east font handle.
    fn grab_handle(&self, store: &StateStore, event: &PointerEvent) -> Option<ResizeGesture> {
        let radius = self.settings.handle_hit_radius;
        match store.selection()? {
            Selection::Entity(entity) => {
                let record = store.record(entity)?;
                if record.page() != event.page {
                    return None;
                }
                let handle = hit_handle(&record.bounds(), &event.pos, radius, Handle::all())?;
                match entity.kind {
                    EntityKind::Overlay if handle == Handle::SouthEast => {
                        ResizeGesture::font(store, DragTarget::Item(entity), event.pos)
                    }
                    EntityKind::Overlay | EntityKind::Signature | EntityKind::Stamp => {
                        ResizeGesture::bounds(store, entity, handle, event.pos)
                    }
                    EntityKind::Annotation | EntityKind::Redaction => None,
                }
            }
            Selection::Run(key) => {
                let run = store.resolved_run(key)?;
                if key.page != event.page {
                    return None;
                }
                hit_handle(&run.bounds(), &event.pos, radius, &[Handle::SouthEast])?;
                ResizeGesture::font(store, DragTarget::Run(key), event.pos)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::{EntityRef, OverlayDraft, RunKey, TextOverlay, TextRun};
    use std::time::Duration;

    struct Clock(Instant);

    impl Clock {
        fn at(&self, ms: u64) -> Instant {
            self.0 + Duration::from_millis(ms)
        }
    }

    fn setup() -> (StateStore, InteractionController, Clock) {
        let mut store = StateStore::new();
        store.set_page_count(3);
        let overlay = OverlayDraft::new(1, 100.0, 100.0, "Note")
            .with_size(200.0, 30.0)
            .build(store.allocate_id())
            .unwrap();
        store.push(overlay);
        (store, InteractionController::default(), Clock(Instant::now()))
    }

    fn overlay(store: &StateStore) -> &TextOverlay {
        &store.items::<TextOverlay>()[0]
    }

    fn ev(page: u32, x: f32, y: f32, at: Instant) -> PointerEvent {
        PointerEvent::new(page, x, y, at)
    }

    #[test]
    fn test_click_selects_without_mutation() {
        let (mut store, mut ctl, clock) = setup();
        assert_eq!(ctl.pointer_down(&mut store, ev(1, 150.0, 110.0, clock.at(0))), GestureOutcome::Armed);
        assert_eq!(ctl.phase(), GesturePhase::Armed);
        ctl.pointer_move(&mut store, ev(1, 152.0, 111.0, clock.at(150)));
        let outcome = ctl.pointer_up(&mut store, ev(1, 153.0, 112.0, clock.at(200)));

        assert_eq!(outcome, GestureOutcome::Discarded);
        assert_eq!(overlay(&store).x, 100.0);
        assert_eq!(store.history().undo_count(), 0);
        assert_eq!(
            store.selection(),
            Some(Selection::Entity(EntityRef::new(EntityKind::Overlay, 1)))
        );
    }

    #[test]
    fn test_drag_needs_delay_before_confirming() {
        let (mut store, mut ctl, clock) = setup();
        ctl.pointer_down(&mut store, ev(1, 150.0, 110.0, clock.at(0)));
        assert_eq!(ctl.pointer_move(&mut store, ev(1, 170.0, 110.0, clock.at(50))), GestureOutcome::None);
        assert_eq!(ctl.phase(), GesturePhase::Armed);
        assert_eq!(ctl.pointer_move(&mut store, ev(1, 175.0, 110.0, clock.at(120))), GestureOutcome::Updated);
        assert_eq!(ctl.phase(), GesturePhase::Active);
        assert_eq!(overlay(&store).x, 125.0);
    }

    #[test]
    fn test_fast_flick_commits_on_release() {
        let (mut store, mut ctl, clock) = setup();
        ctl.pointer_down(&mut store, ev(1, 150.0, 110.0, clock.at(0)));
        assert_eq!(ctl.pointer_move(&mut store, ev(1, 200.0, 110.0, clock.at(30))), GestureOutcome::None);
        let outcome = ctl.pointer_up(&mut store, ev(1, 200.0, 110.0, clock.at(60)));

        assert_eq!(outcome, GestureOutcome::Committed);
        assert_eq!(overlay(&store).x, 150.0);
        assert_eq!(store.history().undo_count(), 1);
    }

    #[test]
    fn test_drag_commits_once_with_net_displacement() {
        let (mut store, mut ctl, clock) = setup();
        ctl.pointer_down(&mut store, ev(1, 150.0, 110.0, clock.at(0)));
        for (i, x) in [160.0, 180.0, 200.0].iter().enumerate() {
            ctl.pointer_move(&mut store, ev(1, *x, 120.0, clock.at(110 + i as u64 * 10)));
        }
        let outcome = ctl.pointer_up(&mut store, ev(1, 210.0, 130.0, clock.at(200)));

        assert_eq!(outcome, GestureOutcome::Committed);
        assert_eq!((overlay(&store).x, overlay(&store).y), (160.0, 120.0));
        assert_eq!(store.history().undo_count(), 1);

        crate::history::undo(&mut store);
        assert_eq!((overlay(&store).x, overlay(&store).y), (100.0, 100.0));
    }

    #[test]
    fn test_live_frames_are_silent_commit_notifies_once() {
        let (mut store, mut ctl, clock) = setup();
        let updates = std::rc::Rc::new(std::cell::Cell::new(0));
        let counter = std::rc::Rc::clone(&updates);
        store.on(
            crate::store::Topic::Updated(crate::store::CollectionKind::TextOverlays),
            move |_| {
                counter.set(counter.get() + 1);
                Ok(())
            },
        );
        ctl.pointer_down(&mut store, ev(1, 150.0, 110.0, clock.at(0)));
        ctl.pointer_move(&mut store, ev(1, 170.0, 110.0, clock.at(120)));
        ctl.pointer_move(&mut store, ev(1, 190.0, 110.0, clock.at(130)));
        ctl.pointer_up(&mut store, ev(1, 200.0, 110.0, clock.at(140)));
        assert_eq!(updates.get(), 1);
    }

    #[test]
    fn test_tool_switch_cancel_restores_position() {
        let (mut store, mut ctl, clock) = setup();
        ctl.pointer_down(&mut store, ev(1, 150.0, 110.0, clock.at(0)));
        ctl.pointer_move(&mut store, ev(1, 250.0, 210.0, clock.at(150)));
        assert_eq!(overlay(&store).x, 200.0);

        assert_eq!(ctl.cancel(&mut store), GestureOutcome::Cancelled);
        assert_eq!((overlay(&store).x, overlay(&store).y), (100.0, 100.0));
        assert_eq!(store.history().undo_count(), 0);
        assert_eq!(ctl.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_deleted_target_discards_silently() {
        let (mut store, mut ctl, clock) = setup();
        ctl.pointer_down(&mut store, ev(1, 150.0, 110.0, clock.at(0)));
        store.remove_record(EntityRef::new(EntityKind::Overlay, 1));
        let outcome = ctl.pointer_move(&mut store, ev(1, 200.0, 150.0, clock.at(150)));
        assert_eq!(outcome, GestureOutcome::Discarded);
        assert_eq!(ctl.phase(), GesturePhase::Idle);
        assert_eq!(ctl.pointer_up(&mut store, ev(1, 200.0, 150.0, clock.at(160))), GestureOutcome::None);
        assert!(store.items::<TextOverlay>().is_empty());
    }

    #[test]
    fn test_font_handle_resize() {
        let (mut store, mut ctl, clock) = setup();
        store.set_selection(Some(Selection::Entity(EntityRef::new(EntityKind::Overlay, 1))));
        // South-east handle of (100,100,200,30) is at (300,130).
        assert_eq!(ctl.pointer_down(&mut store, ev(1, 300.0, 130.0, clock.at(0))), GestureOutcome::Armed);
        assert_eq!(ctl.phase(), GesturePhase::Active);
        ctl.pointer_move(&mut store, ev(1, 300.0, 155.0, clock.at(10)));
        assert_eq!(overlay(&store).font_size, 19.0);
        let outcome = ctl.pointer_up(&mut store, ev(1, 300.0, 180.0, clock.at(20)));
        assert_eq!(outcome, GestureOutcome::Committed);
        assert_eq!(overlay(&store).font_size, 24.0);
        assert_eq!(store.history().undo_count(), 1);
    }

    #[test]
    fn test_edge_handle_respects_floors() {
        let (mut store, mut ctl, clock) = setup();
        store.set_selection(Some(Selection::Entity(EntityRef::new(EntityKind::Overlay, 1))));
        // East handle at (300,115).
        ctl.pointer_down(&mut store, ev(1, 300.0, 115.0, clock.at(0)));
        ctl.pointer_up(&mut store, ev(1, 0.0, 115.0, clock.at(10)));
        assert_eq!(overlay(&store).bounds(), Rect::new(100.0, 100.0, 50.0, 30.0));
    }

    #[test]
    fn test_run_drag_creates_edit_lazily() {
        let (mut store, mut ctl, clock) = setup();
        let key = RunKey::new(2, 0);
        store.register_runs(
            2,
            vec![TextRun {
                key,
                text: "Invoice".to_string(),
                x: 40.0,
                y: 40.0,
                width: 60.0,
                font_size: 12.0,
                font_name: "Helvetica".to_string(),
            }],
        );
        ctl.pointer_down(&mut store, ev(2, 50.0, 45.0, clock.at(0)));
        assert_eq!(store.selection(), Some(Selection::Run(key)));
        ctl.pointer_move(&mut store, ev(2, 60.0, 55.0, clock.at(150)));
        let outcome = ctl.pointer_up(&mut store, ev(2, 70.0, 65.0, clock.at(160)));

        assert_eq!(outcome, GestureOutcome::Committed);
        let edit = store.text_edit(key).unwrap();
        assert_eq!(edit.position(), Point::new(60.0, 60.0));
        assert_eq!(edit.original_x(), 40.0);
        assert_eq!(edit.original_y(), 40.0);

        crate::history::undo(&mut store);
        assert!(store.text_edit(key).is_none());
    }

    #[test]
    fn test_empty_space_clears_selection() {
        let (mut store, mut ctl, clock) = setup();
        store.set_selection(Some(Selection::Entity(EntityRef::new(EntityKind::Overlay, 1))));
        assert_eq!(ctl.pointer_down(&mut store, ev(1, 500.0, 500.0, clock.at(0))), GestureOutcome::None);
        assert_eq!(store.selection(), None);
    }

    #[test]
    fn test_add_text_requests_placement() {
        let (mut store, mut ctl, clock) = setup();
        store.set_tool(Tool::AddText);
        assert_eq!(
            ctl.pointer_down(&mut store, ev(2, 10.0, 20.0, clock.at(0))),
            GestureOutcome::TextPlacementRequested {
                page: 2,
                at: Point::new(10.0, 20.0)
            }
        );
    }

    #[test]
    fn test_invalid_page_is_ignored() {
        let (mut store, mut ctl, clock) = setup();
        store.set_tool(Tool::Erase);
        assert_eq!(ctl.pointer_down(&mut store, ev(9, 10.0, 20.0, clock.at(0))), GestureOutcome::None);
        assert_eq!(ctl.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_selection_rect_is_normalized_mid_gesture() {
        let (mut store, mut ctl, clock) = setup();
        store.set_tool(Tool::OcrSelect);
        ctl.pointer_down(&mut store, ev(1, 80.0, 80.0, clock.at(0)));
        ctl.pointer_move(&mut store, ev(1, 30.0, 40.0, clock.at(10)));
        let rect = ctl.selection_rect().unwrap();
        assert_eq!(rect.rect, Rect::new(30.0, 40.0, 50.0, 40.0));
        assert_eq!(ctl.phase(), GesturePhase::Active);
    }

    #[test]
    fn test_new_pointer_down_cancels_previous() {
        let (mut store, mut ctl, clock) = setup();
        ctl.pointer_down(&mut store, ev(1, 150.0, 110.0, clock.at(0)));
        ctl.pointer_move(&mut store, ev(1, 250.0, 110.0, clock.at(150)));
        ctl.pointer_down(&mut store, ev(1, 600.0, 600.0, clock.at(200)));
        assert_eq!(overlay(&store).x, 100.0);
        assert_eq!(store.history().undo_count(), 0);
    }
}
