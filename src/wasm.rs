//! Browser entry point.
//!
//! Exposes an [`Editor`] backed by `localStorage` to JavaScript. Structured
//! values cross the boundary as JSON strings.

use serde_json::json;
use wasm_bindgen::prelude::*;
use web_time::Instant;

use crate::collaborators::{OcrResult, RenderedTextItem};
use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::geometry::Viewport;
use crate::interaction::{GestureOutcome, PointerEvent};
use crate::logging;
use crate::model::{OverlayDraft, RunKey, TextEditOverrides, Tool};
use crate::session::{LocalStorage, RestoreOutcome};

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn outcome_json(outcome: &GestureOutcome) -> String {
    let value = match outcome {
        GestureOutcome::None => json!({ "kind": "none" }),
        GestureOutcome::Armed => json!({ "kind": "armed" }),
        GestureOutcome::Updated => json!({ "kind": "updated" }),
        GestureOutcome::Committed => json!({ "kind": "committed" }),
        GestureOutcome::Discarded => json!({ "kind": "discarded" }),
        GestureOutcome::Cancelled => json!({ "kind": "cancelled" }),
        GestureOutcome::OcrRequested(request) => json!({
            "kind": "ocrRequested",
            "page": request.page,
            "rect": request.rect,
        }),
        GestureOutcome::TextPlacementRequested { page, at } => json!({
            "kind": "textPlacementRequested",
            "page": page,
            "at": at,
        }),
    };
    value.to_string()
}

fn restore_name(outcome: &RestoreOutcome) -> &'static str {
    match outcome {
        RestoreOutcome::Restored => "restored",
        RestoreOutcome::NoSession => "noSession",
        RestoreOutcome::FingerprintMismatch => "fingerprintMismatch",
        RestoreOutcome::Incompatible { .. } => "incompatible",
        RestoreOutcome::Corrupt => "corrupt",
    }
}

/// Editing session for one document in the browser.
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor<LocalStorage>,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor using the configuration stored in `localStorage`.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmEditor {
        let config = EditorConfig::load_or_default();
        logging::init(config.preferences.log_level);
        log::info!("pagemark editor starting");
        WasmEditor {
            editor: Editor::new(&config, LocalStorage),
        }
    }

    /// Start editing a document; returns how the stored session was handled.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, bytes: &[u8], page_count: u32) -> String {
        restore_name(&self.editor.load_document(bytes, page_count)).to_string()
    }

    /// Register a page's text content, a JSON array of
    /// `{text, transform, fontName, width?}` items.
    #[wasm_bindgen(js_name = registerTextItems)]
    pub fn register_text_items(
        &mut self,
        page: u32,
        items_json: &str,
        page_height: f32,
        scale: f32,
    ) -> Result<usize, JsValue> {
        let items: Vec<RenderedTextItem> = serde_json::from_str(items_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid text items JSON: {}", e)))?;
        self.editor
            .register_text_items(page, &items, &Viewport::new(page_height, scale));
        Ok(items.len())
    }

    /// Switch tools by their persisted name, e.g. `"ocr-select"`.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, name: &str) -> Result<bool, JsValue> {
        let tool: Tool = serde_json::from_value(json!(name))
            .map_err(|_| JsValue::from_str(&format!("Unknown tool: {}", name)))?;
        Ok(self.editor.set_tool(tool))
    }

    #[wasm_bindgen(js_name = setPage)]
    pub fn set_page(&mut self, page: u32) -> Result<bool, JsValue> {
        self.editor.set_page(page).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&mut self, scale: f32) -> bool {
        self.editor.set_scale(scale)
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, page: u32, x: f32, y: f32) -> String {
        outcome_json(&self.editor.pointer_down(PointerEvent::new(page, x, y, Instant::now())))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, page: u32, x: f32, y: f32) -> String {
        outcome_json(&self.editor.pointer_move(PointerEvent::new(page, x, y, Instant::now())))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, page: u32, x: f32, y: f32) -> String {
        outcome_json(&self.editor.pointer_up(PointerEvent::new(page, x, y, Instant::now())))
    }

    #[wasm_bindgen(js_name = cancelGesture)]
    pub fn cancel_gesture(&mut self) -> String {
        outcome_json(&self.editor.cancel_gesture())
    }

    #[wasm_bindgen(js_name = addTextOverlay)]
    pub fn add_text_overlay(&mut self, page: u32, x: f32, y: f32, text: &str) -> Result<u64, JsValue> {
        self.editor
            .add_text_overlay(OverlayDraft::new(page, x, y, text))
            .map_err(js_error)
    }

    /// Insert an OCR result, `{text, wordCount, confidence, boundingRect, page}`.
    #[wasm_bindgen(js_name = insertOcrResult)]
    pub fn insert_ocr_result(&mut self, result_json: &str) -> Result<u64, JsValue> {
        let result: OcrResult = serde_json::from_str(result_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid OCR result JSON: {}", e)))?;
        self.editor.insert_ocr_result(&result).map_err(js_error)
    }

    #[wasm_bindgen(js_name = editRun)]
    pub fn edit_run(&mut self, page: u32, index: usize, text: &str) -> Result<bool, JsValue> {
        self.editor
            .edit_run(RunKey::new(page, index), &TextEditOverrides::text(text))
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = revertRun)]
    pub fn revert_run(&mut self, page: u32, index: usize) -> bool {
        self.editor.revert_run(RunKey::new(page, index))
    }

    #[wasm_bindgen(js_name = deleteSelection)]
    pub fn delete_selection(&mut self) -> bool {
        self.editor.delete_selection()
    }

    #[wasm_bindgen(js_name = rotatePage)]
    pub fn rotate_page(&mut self, page: u32, delta: i32) -> Result<i32, JsValue> {
        self.editor.rotate_page(page, delta).map_err(js_error)
    }

    /// Clear the annotations of one page, or all of them for `undefined`.
    #[wasm_bindgen(js_name = clearAnnotations)]
    pub fn clear_annotations(&mut self, page: Option<u32>) -> usize {
        self.editor.clear_annotations(page)
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    #[wasm_bindgen(getter, js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    #[wasm_bindgen(getter, js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Run a due auto-save; call from a timer.
    #[wasm_bindgen(js_name = pollAutosave)]
    pub fn poll_autosave(&mut self) -> bool {
        self.editor.poll_autosave(Instant::now())
    }

    #[wasm_bindgen(js_name = flushSession)]
    pub fn flush_session(&mut self) -> Result<(), JsValue> {
        self.editor.flush_session().map_err(js_error)
    }

    /// Entity collections as JSON, in the persisted session layout.
    #[wasm_bindgen(js_name = documentJson)]
    pub fn document_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.editor.store().document()).map_err(js_error)
    }

    /// Everything the document writer needs, in page units.
    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<String, JsValue> {
        self.editor.export().to_page_space().to_json().map_err(js_error)
    }

    /// Drain pending notices as a JSON array of `{level, message}`.
    #[wasm_bindgen(js_name = takeNotices)]
    pub fn take_notices(&mut self) -> String {
        let notices: Vec<_> = self
            .editor
            .take_notices()
            .into_iter()
            .map(|n| json!({ "level": format!("{:?}", n.level), "message": n.message }))
            .collect();
        serde_json::Value::Array(notices).to_string()
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}
