//! Box-shaped page items: redacted areas, signatures and stamps.

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::geometry::{Rect, normalize_rect};
use crate::model::EntityId;

fn check_box(rect: &Rect) -> Result<(), EditError> {
    if rect.width > 0.0 && rect.height > 0.0 {
        Ok(())
    } else {
        Err(EditError::non_positive_size(rect.width, rect.height))
    }
}

/// A region rendered opaque on export, hiding whatever is underneath.
///
/// Persisted under `patches` in the session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactedArea {
    pub id: EntityId,
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RedactedArea {
    /// Create from a committed selection. The rectangle is normalized first.
    pub fn new(id: EntityId, page: u32, rect: Rect) -> Result<Self, EditError> {
        let rect = normalize_rect(rect);
        check_box(&rect)?;
        Ok(Self {
            id,
            page,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        })
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A signature image placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub id: EntityId,
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Encoded image (data URL).
    pub image: String,
}

impl Signature {
    pub fn new(id: EntityId, page: u32, rect: Rect, image: impl Into<String>) -> Result<Self, EditError> {
        check_box(&rect)?;
        Ok(Self {
            id,
            page,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            image: image.into(),
        })
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A labelled rubber stamp ("APPROVED", "PAID", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamp {
    pub id: EntityId,
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: String,
    pub color: String,
}

impl Stamp {
    pub fn new(
        id: EntityId,
        page: u32,
        rect: Rect,
        label: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Self, EditError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(EditError::EmptyText);
        }
        check_box(&rect)?;
        Ok(Self {
            id,
            page,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            label,
            color: color.into(),
        })
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction_normalizes_input() {
        let area = RedactedArea::new(1, 1, Rect::new(50.0, 50.0, -20.0, -10.0)).unwrap();
        assert_eq!(area.bounds(), Rect::new(30.0, 40.0, 20.0, 10.0));
    }

    #[test]
    fn test_zero_area_rejected() {
        assert!(RedactedArea::new(1, 1, Rect::new(0.0, 0.0, 0.0, 5.0)).is_err());
        assert!(Signature::new(1, 1, Rect::new(0.0, 0.0, 10.0, -1.0), "data:").is_err());
    }

    #[test]
    fn test_stamp_requires_label() {
        let rect = Rect::new(0.0, 0.0, 120.0, 40.0);
        assert_eq!(
            Stamp::new(1, 1, rect, " ", "#c62828"),
            Err(EditError::EmptyText)
        );
        assert!(Stamp::new(1, 1, rect, "PAID", "#c62828").is_ok());
    }
}
