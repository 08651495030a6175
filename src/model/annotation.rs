//! Freehand and shape annotations.
//!
//! Annotations are immutable once committed. They leave the document only
//! through a bulk clear or an undo.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PEN_COLOR, DEFAULT_PEN_SIZE, STROKE_HIT_TOLERANCE};
use crate::error::EditError;
use crate::geometry::{HitTest, Point, Rect, hit_polyline};
use crate::model::EntityId;

/// Stroke color and width used by the drawing tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenStyle {
    pub color: String,
    pub size: f32,
}

impl Default for PenStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_PEN_COLOR.to_string(),
            size: DEFAULT_PEN_SIZE,
        }
    }
}

/// Geometry of an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationShape {
    /// Pen stroke through the given points.
    Freehand { points: Vec<Point> },
    /// Rectangle outline between two corners.
    Rectangle { start: Point, end: Point },
    /// Ellipse inscribed in the box between two corners.
    Circle { start: Point, end: Point },
}

impl AnnotationShape {
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationShape::Freehand { .. } => "freehand",
            AnnotationShape::Rectangle { .. } => "rectangle",
            AnnotationShape::Circle { .. } => "circle",
        }
    }

    /// Check the shape invariants.
    pub fn validate(&self) -> Result<(), EditError> {
        match self {
            AnnotationShape::Freehand { points } if points.is_empty() => {
                Err(EditError::EmptyStroke)
            }
            AnnotationShape::Rectangle { start, end } | AnnotationShape::Circle { start, end }
                if start == end =>
            {
                Err(EditError::DegenerateShape)
            }
            _ => Ok(()),
        }
    }

    /// Axis-aligned box around the shape.
    pub fn bounds(&self) -> Rect {
        match self {
            AnnotationShape::Freehand { points } => {
                let mut min = Point::new(f32::INFINITY, f32::INFINITY);
                let mut max = Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
                for p in points {
                    min.x = min.x.min(p.x);
                    min.y = min.y.min(p.y);
                    max.x = max.x.max(p.x);
                    max.y = max.y.max(p.y);
                }
                if points.is_empty() {
                    Rect::default()
                } else {
                    Rect::from_corners(min, max)
                }
            }
            AnnotationShape::Rectangle { start, end } | AnnotationShape::Circle { start, end } => {
                Rect::from_corners(*start, *end)
            }
        }
    }
}

/// A committed drawing on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: EntityId,
    pub page: u32,
    #[serde(flatten)]
    pub shape: AnnotationShape,
    pub color: String,
    /// Stroke width.
    pub size: f32,
}

impl Annotation {
    /// Create an annotation, rejecting shapes that break their invariants.
    pub fn new(
        id: EntityId,
        page: u32,
        shape: AnnotationShape,
        pen: &PenStyle,
    ) -> Result<Self, EditError> {
        shape.validate()?;
        Ok(Self {
            id,
            page,
            shape,
            color: pen.color.clone(),
            size: pen.size,
        })
    }

    pub fn bounds(&self) -> Rect {
        self.shape.bounds()
    }
}

impl HitTest for Annotation {
    fn hit_test(&self, point: &Point) -> bool {
        match &self.shape {
            AnnotationShape::Freehand { points } => {
                hit_polyline(point, points, self.size, STROKE_HIT_TOLERANCE)
            }
            AnnotationShape::Rectangle { .. } | AnnotationShape::Circle { .. } => {
                self.bounds().contains(point)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen() -> PenStyle {
        PenStyle {
            color: "#000".to_string(),
            size: 4.0,
        }
    }

    #[test]
    fn test_freehand_requires_a_point() {
        let empty = AnnotationShape::Freehand { points: vec![] };
        assert_eq!(Annotation::new(1, 1, empty, &pen()), Err(EditError::EmptyStroke));

        let dot = AnnotationShape::Freehand {
            points: vec![Point::new(3.0, 3.0)],
        };
        assert!(Annotation::new(1, 1, dot, &pen()).is_ok());
    }

    #[test]
    fn test_shapes_require_distinct_corners() {
        let p = Point::new(5.0, 5.0);
        let rect = AnnotationShape::Rectangle { start: p, end: p };
        assert_eq!(
            Annotation::new(1, 1, rect, &pen()),
            Err(EditError::DegenerateShape)
        );
        let circle = AnnotationShape::Circle {
            start: p,
            end: Point::new(6.0, 5.0),
        };
        assert!(Annotation::new(1, 1, circle, &pen()).is_ok());
    }

    #[test]
    fn test_hit_test_by_shape() {
        let stroke = Annotation::new(
            1,
            1,
            AnnotationShape::Freehand {
                points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            },
            &pen(),
        )
        .unwrap();
        assert!(stroke.hit_test(&Point::new(50.0, 3.5)));
        assert!(!stroke.hit_test(&Point::new(50.0, 20.0)));

        let rect = Annotation::new(
            2,
            1,
            AnnotationShape::Rectangle {
                start: Point::new(50.0, 50.0),
                end: Point::new(10.0, 10.0),
            },
            &pen(),
        )
        .unwrap();
        assert!(rect.hit_test(&Point::new(20.0, 20.0)));
        assert!(!rect.hit_test(&Point::new(60.0, 20.0)));
    }

    #[test]
    fn test_freehand_bounds() {
        let shape = AnnotationShape::Freehand {
            points: vec![
                Point::new(10.0, 40.0),
                Point::new(30.0, 5.0),
                Point::new(20.0, 25.0),
            ],
        };
        assert_eq!(shape.bounds(), Rect::new(10.0, 5.0, 20.0, 35.0));
    }

    #[test]
    fn test_serialized_type_tag() {
        let a = Annotation::new(
            4,
            2,
            AnnotationShape::Circle {
                start: Point::new(0.0, 0.0),
                end: Point::new(4.0, 4.0),
            },
            &pen(),
        )
        .unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"type\":\"circle\""));
        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
