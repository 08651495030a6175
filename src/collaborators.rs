//! Records exchanged with the rendering engine, the OCR engine and the
//! document writer.
//!
//! None of those engines live in this crate; these are the shapes the
//! editor consumes from them and hands to them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Affine, Point, Rect, Viewport, place_text};
use crate::model::{
    Annotation, AnnotationShape, OverlayDraft, RedactedArea, RunKey, Signature, Stamp, TextEdit,
    TextOverlay, TextRun, TextStyle, estimate_width,
};
use crate::store::StateStore;

// ============================================================================
// Rendering engine
// ============================================================================

/// One text item as reported by the rendering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTextItem {
    pub text: String,
    /// Item transform in page space; its origin is the glyph baseline.
    pub transform: Affine,
    #[serde(default)]
    pub font_name: String,
    /// Advance width in page units, when the engine knows it.
    #[serde(default)]
    pub width: Option<f32>,
}

impl RenderedTextItem {
    /// Place this item on the rendered page as run `index` of `page`.
    pub fn to_run(&self, page: u32, index: usize, viewport: &Viewport) -> TextRun {
        let placement = place_text(&self.transform, viewport);
        let width = match self.width {
            Some(width) if width > 0.0 => width * viewport.scale,
            _ => estimate_width(&self.text, placement.font_size),
        };
        TextRun {
            key: RunKey::new(page, index),
            text: self.text.clone(),
            x: placement.x,
            y: placement.y,
            width,
            font_size: placement.font_size,
            font_name: self.font_name.clone(),
        }
    }
}

/// Convert a page's text content, skipping whitespace-only items but
/// keeping their indices so keys match the engine's numbering.
pub fn runs_from_items(page: u32, items: &[RenderedTextItem], viewport: &Viewport) -> Vec<TextRun> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.text.trim().is_empty())
        .map(|(index, item)| item.to_run(page, index, viewport))
        .collect()
}

// ============================================================================
// OCR engine
// ============================================================================

/// Text recognized inside a selected region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResult {
    pub text: String,
    pub word_count: usize,
    /// 0 to 100
    pub confidence: f32,
    /// Region the text was found in, screen units.
    pub bounding_rect: Rect,
    pub page: u32,
}

impl OcrResult {
    /// The overlay request this result stands for; it is handled exactly
    /// like a manually placed overlay.
    pub fn to_draft(&self) -> OverlayDraft {
        let rect = self.bounding_rect;
        OverlayDraft::new(self.page, rect.x, rect.y, self.text.trim()).with_size(rect.width, rect.height)
    }
}

// ============================================================================
// Document writer
// ============================================================================

/// A text edit resolved against its run, ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTextEdit {
    pub page: u32,
    pub index: usize,
    pub original_text: String,
    pub new_text: String,
    pub x: f32,
    pub y: f32,
    pub original_x: f32,
    pub original_y: f32,
    /// Width of the original run, for whiting it out.
    pub original_width: f32,
    pub font_size: f32,
    pub font_name: String,
    pub style: TextStyle,
}

impl ExportedTextEdit {
    fn resolve(edit: &TextEdit, run: Option<&TextRun>) -> Self {
        Self {
            page: edit.page,
            index: edit.index,
            original_text: edit.original_text().to_string(),
            new_text: edit.new_text.clone(),
            x: edit.x,
            y: edit.y,
            original_x: edit.original_x(),
            original_y: edit.original_y(),
            original_width: run.map_or_else(
                || estimate_width(edit.original_text(), edit.font_size),
                |r| r.width,
            ),
            font_size: edit.font_size,
            font_name: run.map(|r| r.font_name.clone()).unwrap_or_default(),
            style: edit.style.clone(),
        }
    }
}

/// The full entity set handed to the document writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Zoom the coordinates are expressed at; 1.0 once in page space.
    pub scale: f32,
    pub page_rotations: BTreeMap<u32, i32>,
    pub text_overlays: Vec<TextOverlay>,
    pub text_edits: Vec<ExportedTextEdit>,
    pub annotations: Vec<Annotation>,
    pub redactions: Vec<RedactedArea>,
    pub signatures: Vec<Signature>,
    pub stamps: Vec<Stamp>,
}

impl ExportDocument {
    /// Snapshot the store, in screen units at the current zoom.
    pub fn capture(store: &StateStore) -> Self {
        let doc = store.document();
        Self {
            scale: store.scale(),
            page_rotations: doc.page_rotations.clone(),
            text_overlays: doc.text_overlays.clone(),
            text_edits: doc
                .text_edits
                .iter()
                .map(|edit| ExportedTextEdit::resolve(edit, store.run(edit.key())))
                .collect(),
            annotations: doc.annotations.clone(),
            redactions: doc.redactions.clone(),
            signatures: doc.signatures.clone(),
            stamps: doc.stamps.clone(),
        }
    }

    /// Convert every coordinate and size to zoom-independent page units.
    ///
    /// Axis orientation is left as is; flipping to a bottom-up page
    /// space is the writer's business.
    pub fn to_page_space(&self) -> ExportDocument {
        let s = if self.scale > 0.0 { self.scale } else { 1.0 };
        let p = |p: &Point| Point::new(p.x / s, p.y / s);

        let mut out = self.clone();
        out.scale = 1.0;
        for o in &mut out.text_overlays {
            o.x /= s;
            o.y /= s;
            o.width /= s;
            o.height /= s;
            o.font_size /= s;
        }
        for e in &mut out.text_edits {
            e.x /= s;
            e.y /= s;
            e.original_x /= s;
            e.original_y /= s;
            e.original_width /= s;
            e.font_size /= s;
        }
        for a in &mut out.annotations {
            a.size /= s;
            a.shape = match &a.shape {
                AnnotationShape::Freehand { points } => AnnotationShape::Freehand {
                    points: points.iter().map(p).collect(),
                },
                AnnotationShape::Rectangle { start, end } => AnnotationShape::Rectangle {
                    start: p(start),
                    end: p(end),
                },
                AnnotationShape::Circle { start, end } => AnnotationShape::Circle {
                    start: p(start),
                    end: p(end),
                },
            };
        }
        for r in &mut out.redactions {
            (r.x, r.y, r.width, r.height) = (r.x / s, r.y / s, r.width / s, r.height / s);
        }
        for g in &mut out.signatures {
            (g.x, g.y, g.width, g.height) = (g.x / s, g.y / s, g.width / s, g.height / s);
        }
        for t in &mut out.stamps {
            (t.x, t.y, t.width, t.height) = (t.x / s, t.y / s, t.width / s, t.height / s);
        }
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
