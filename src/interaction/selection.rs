//! Rubber-band region selection for the OCR and erase tools.

use super::GestureOutcome;
use crate::config::InteractionConfig;
use crate::geometry::{Point, Rect, normalize_rect};
use crate::history::HistoryEntry;
use crate::model::{EntityRecord, RedactedArea, Tool};
use crate::store::StateStore;

/// What a finished selection turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPurpose {
    /// Handed to the OCR engine
    Ocr,
    /// Becomes a redacted area
    Erase,
}

impl SelectionPurpose {
    pub fn for_tool(tool: Tool) -> Option<Self> {
        match tool {
            Tool::OcrSelect => Some(SelectionPurpose::Ocr),
            Tool::Erase => Some(SelectionPurpose::Erase),
            _ => None,
        }
    }

    /// Both sides of the normalized rectangle must exceed this.
    pub fn min_size(&self, settings: &InteractionConfig) -> f32 {
        match self {
            SelectionPurpose::Ocr => settings.ocr_min_selection,
            SelectionPurpose::Erase => settings.erase_min_selection,
        }
    }
}

/// The transient rectangle of an in-progress selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub page: u32,
    pub rect: Rect,
}

/// Region handed to the OCR collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcrRequest {
    pub page: u32,
    /// Normalized, in screen units
    pub rect: Rect,
}

#[derive(Debug, Clone)]
pub struct SelectionGesture {
    purpose: SelectionPurpose,
    page: u32,
    anchor: Point,
    current: Point,
    moved: bool,
}

impl SelectionGesture {
    pub fn new(purpose: SelectionPurpose, page: u32, anchor: Point) -> Self {
        Self {
            purpose,
            page,
            anchor,
            current: anchor,
            moved: false,
        }
    }

    pub fn purpose(&self) -> SelectionPurpose {
        self.purpose
    }

    pub fn is_active(&self) -> bool {
        self.moved
    }

    pub fn update(&mut self, pos: Point) {
        self.current = pos;
        self.moved = true;
    }

    /// The rectangle as dragged; width and height may be negative.
    pub fn raw(&self) -> SelectionRect {
        SelectionRect {
            page: self.page,
            rect: Rect::new(
                self.anchor.x,
                self.anchor.y,
                self.current.x - self.anchor.x,
                self.current.y - self.anchor.y,
            ),
        }
    }

    pub fn normalized(&self) -> SelectionRect {
        let raw = self.raw();
        SelectionRect {
            page: raw.page,
            rect: normalize_rect(raw.rect),
        }
    }

    /// Consume the selection if it is big enough, otherwise discard it.
    pub(crate) fn finish(mut self, store: &mut StateStore, pos: Point, settings: &InteractionConfig) -> GestureOutcome {
        self.update(pos);
        let SelectionRect { page, rect } = self.normalized();
        let min = self.purpose.min_size(settings);
        if rect.width <= min || rect.height <= min {
            log::debug!(
                "Selection {:.0}x{:.0} below {:?} minimum {}, discarded",
                rect.width,
                rect.height,
                self.purpose,
                min
            );
            return GestureOutcome::Discarded;
        }

        match self.purpose {
            SelectionPurpose::Ocr => {
                log::info!("OCR requested for page {page} region {rect:?}");
                GestureOutcome::OcrRequested(OcrRequest { page, rect })
            }
            SelectionPurpose::Erase => {
                let id = store.allocate_id();
                match RedactedArea::new(id, page, rect) {
                    Ok(area) => {
                        let record = EntityRecord::Redaction(area.clone());
                        store.push(area);
                        store.add_to_history(HistoryEntry::Added { record });
                        GestureOutcome::Committed
                    }
                    Err(e) => {
                        log::debug!("Erase selection rejected: {e}");
                        GestureOutcome::Discarded
                    }
                }
            }
        }
    }
}
