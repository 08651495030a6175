//! Editing tools.

use serde::{Deserialize, Serialize};

/// The active editing tool. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    /// Select, move and resize existing items.
    #[default]
    Select,
    /// Place new text overlays.
    AddText,
    /// Freehand pen strokes.
    Freehand,
    /// Rectangle outlines.
    Rectangle,
    /// Circle/ellipse outlines.
    Circle,
    /// Rubber-band selection handed to OCR.
    OcrSelect,
    /// Rubber-band selection that becomes a redacted area.
    Erase,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::AddText => "Add Text",
            Tool::Freehand => "Draw",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
            Tool::OcrSelect => "OCR Region",
            Tool::Erase => "Erase",
        }
    }

    /// Get all available tools.
    pub fn all() -> &'static [Tool] {
        &[
            Tool::Select,
            Tool::AddText,
            Tool::Freehand,
            Tool::Rectangle,
            Tool::Circle,
            Tool::OcrSelect,
            Tool::Erase,
        ]
    }

    /// Tools that commit an annotation stroke or shape.
    pub fn is_drawing_tool(&self) -> bool {
        matches!(self, Tool::Freehand | Tool::Rectangle | Tool::Circle)
    }

    /// Tools driven by a rubber-band rectangle.
    pub fn is_region_tool(&self) -> bool {
        matches!(self, Tool::OcrSelect | Tool::Erase)
    }
}
