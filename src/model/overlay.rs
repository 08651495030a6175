//! Freestanding text overlays.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKGROUND, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_OVERLAY_HEIGHT,
    DEFAULT_OVERLAY_WIDTH, DEFAULT_TEXT_COLOR,
};
use crate::error::EditError;
use crate::geometry::{Point, Rect};
use crate::model::EntityId;

/// Horizontal text alignment inside an overlay box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// A text box added by the user on top of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlay {
    pub id: EntityId,
    pub text: String,
    /// 1-based page number.
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    pub color: String,
    /// `None` renders a transparent background.
    pub background_color: Option<String>,
    pub font_family: String,
    pub alignment: Alignment,
}

impl TextOverlay {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Input for a new overlay. Omitted fields get the documented defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayDraft {
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub font_size: Option<f32>,
    pub color: Option<String>,
    /// `Some(None)` asks for a transparent background explicitly.
    pub background_color: Option<Option<String>>,
    pub font_family: Option<String>,
    pub alignment: Option<Alignment>,
}

impl OverlayDraft {
    pub fn new(page: u32, x: f32, y: f32, text: impl Into<String>) -> Self {
        Self {
            page,
            x,
            y,
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_background(mut self, background: Option<String>) -> Self {
        self.background_color = Some(background);
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Check the draft and fill in every default, field by field.
    pub fn build(self, id: EntityId) -> Result<TextOverlay, EditError> {
        if self.text.trim().is_empty() {
            return Err(EditError::EmptyText);
        }
        let width = self.width.unwrap_or(DEFAULT_OVERLAY_WIDTH);
        let height = self.height.unwrap_or(DEFAULT_OVERLAY_HEIGHT);
        if width <= 0.0 || height <= 0.0 {
            return Err(EditError::non_positive_size(width, height));
        }
        if self.page < 1 {
            return Err(EditError::PageOutOfRange {
                page: self.page,
                page_count: 0,
            });
        }

        Ok(TextOverlay {
            id,
            text: self.text,
            page: self.page,
            x: self.x,
            y: self.y,
            width,
            height,
            font_size: self.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            color: self.color.unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
            background_color: self
                .background_color
                .unwrap_or_else(|| Some(DEFAULT_BACKGROUND.to_string())),
            font_family: self
                .font_family
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
            alignment: self.alignment.unwrap_or_default(),
        })
    }
}

/// A partial update of an existing overlay's content and style.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayPatch {
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub color: Option<String>,
    pub background_color: Option<Option<String>>,
    pub font_family: Option<String>,
    pub alignment: Option<Alignment>,
}

impl OverlayPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Apply to a copy of `overlay`, rejecting empty text.
    pub fn apply(&self, overlay: &TextOverlay) -> Result<TextOverlay, EditError> {
        let mut next = overlay.clone();
        if let Some(text) = &self.text {
            if text.trim().is_empty() {
                return Err(EditError::EmptyText);
            }
            next.text = text.clone();
        }
        if let Some(size) = self.font_size {
            next.font_size = size;
        }
        if let Some(color) = &self.color {
            next.color = color.clone();
        }
        if let Some(background) = &self.background_color {
            next.background_color = background.clone();
        }
        if let Some(family) = &self.font_family {
            next.font_family = family.clone();
        }
        if let Some(alignment) = self.alignment {
            next.alignment = alignment;
        }
        Ok(next)
    }
}
