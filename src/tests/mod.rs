//! Scenario tests that drive the editor end to end.
//!
//! Module-level behavior is tested next to each module; these tests cover
//! flows that cross the store, gestures, history and session persistence.

mod history_tests;

use std::time::Duration;

use web_time::Instant;

use crate::Editor;
use crate::interaction::PointerEvent;
use crate::session::MemoryStorage;

/// Document bytes used by most scenarios.
pub(crate) const DOC: &[u8] = b"%PDF-1.7\n1 0 obj << /Type /Catalog >> endobj\n";

/// Monotonic test clock; all pointer events are stamped relative to it.
pub(crate) struct Clock(Instant);

impl Clock {
    pub(crate) fn new() -> Self {
        Self(Instant::now())
    }

    pub(crate) fn at(&self, ms: u64) -> Instant {
        self.0 + Duration::from_millis(ms)
    }

    pub(crate) fn ev(&self, page: u32, x: f32, y: f32, ms: u64) -> PointerEvent {
        PointerEvent::new(page, x, y, self.at(ms))
    }
}

/// An editor with `DOC` loaded as a three-page document.
pub(crate) fn loaded_editor() -> Editor<MemoryStorage> {
    let mut editor = Editor::in_memory();
    editor.load_document(DOC, 3);
    editor
}
