//! Edits applied to text runs that already exist in the rendered page.
//!
//! A run is owned by the rendering engine and never changes; an edit is a
//! diff layered on top of it. Removing the edit is therefore the same as
//! reverting the run: [`resolve_run`] falls back to the original text and
//! position as soon as no edit is present.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Identifies a text run reported by the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunKey {
    /// 1-based page number.
    pub page: u32,
    /// Position of the run in the page's text content.
    pub index: usize,
}

impl RunKey {
    pub fn new(page: u32, index: usize) -> Self {
        Self { page, index }
    }
}

/// A unit of text as rendered, positioned in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub key: RunKey,
    pub text: String,
    pub x: f32,
    /// Top of the run's box.
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub font_name: String,
}

impl TextRun {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.font_size)
    }
}

/// Style overrides an edit may carry on top of the run's own style.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

/// Requested changes to a run. Unset fields leave the current value alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextEditOverrides {
    pub text: Option<String>,
    pub position: Option<Point>,
    pub font_size: Option<f32>,
    pub color: Option<String>,
    pub font_family: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

impl TextEditOverrides {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn font_size(size: f32) -> Self {
        Self {
            font_size: Some(size),
            ..Default::default()
        }
    }
}

/// The active edit of one run.
///
/// `original_text`, `original_x` and `original_y` are captured once, when
/// the edit is first created, and have no setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub page: u32,
    pub index: usize,
    original_text: String,
    pub new_text: String,
    pub x: f32,
    pub y: f32,
    original_x: f32,
    original_y: f32,
    pub font_size: f32,
    #[serde(default)]
    pub style: TextStyle,
}

impl TextEdit {
    /// Start an edit of `run`, snapshotting its current rendered state.
    pub fn from_run(run: &TextRun, overrides: &TextEditOverrides) -> Self {
        let mut edit = Self {
            page: run.key.page,
            index: run.key.index,
            original_text: run.text.clone(),
            new_text: run.text.clone(),
            x: run.x,
            y: run.y,
            original_x: run.x,
            original_y: run.y,
            font_size: run.font_size,
            style: TextStyle::default(),
        };
        edit.apply(overrides);
        edit
    }

    /// Apply further changes. Only the editable fields move.
    pub fn apply(&mut self, overrides: &TextEditOverrides) {
        if let Some(text) = &overrides.text {
            self.new_text = text.clone();
        }
        if let Some(position) = overrides.position {
            self.x = position.x;
            self.y = position.y;
        }
        if let Some(size) = overrides.font_size {
            self.font_size = size;
        }
        if let Some(color) = &overrides.color {
            self.style.color = Some(color.clone());
        }
        if let Some(family) = &overrides.font_family {
            self.style.font_family = Some(family.clone());
        }
        if let Some(bold) = overrides.bold {
            self.style.bold = bold;
        }
        if let Some(italic) = overrides.italic {
            self.style.italic = italic;
        }
    }

    pub fn key(&self) -> RunKey {
        RunKey::new(self.page, self.index)
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn original_x(&self) -> f32 {
        self.original_x
    }

    pub fn original_y(&self) -> f32 {
        self.original_y
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether the edit moved the run away from where it was rendered.
    pub fn is_moved(&self) -> bool {
        self.x != self.original_x || self.y != self.original_y
    }
}

/// What a run looks like once its edit (if any) is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRun {
    pub key: RunKey,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub font_name: String,
    pub style: TextStyle,
    pub edited: bool,
}

impl ResolvedRun {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.font_size)
    }
}

/// Resolve a run against its edit.
///
/// Without a run (e.g. a restored session whose page has not been rendered
/// yet) the edit alone still resolves, using its snapshot of the original.
pub fn resolve_run(run: Option<&TextRun>, edit: Option<&TextEdit>) -> Option<ResolvedRun> {
    match (run, edit) {
        (Some(run), None) => Some(ResolvedRun {
            key: run.key,
            text: run.text.clone(),
            x: run.x,
            y: run.y,
            width: run.width,
            font_size: run.font_size,
            font_name: run.font_name.clone(),
            style: TextStyle::default(),
            edited: false,
        }),
        (run, Some(edit)) => Some(ResolvedRun {
            key: edit.key(),
            text: edit.new_text.clone(),
            x: edit.x,
            y: edit.y,
            width: run.map_or_else(
                || estimate_width(&edit.new_text, edit.font_size),
                |r| r.width * edit.font_size / r.font_size.max(f32::EPSILON),
            ),
            font_size: edit.font_size,
            font_name: run.map(|r| r.font_name.clone()).unwrap_or_default(),
            style: edit.style.clone(),
            edited: true,
        }),
        (None, None) => None,
    }
}

/// Rough advance width when the renderer gave none.
pub fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5
}
