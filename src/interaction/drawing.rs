//! Drawing gestures for the freehand, rectangle and circle tools.

use super::GestureOutcome;
use crate::geometry::Point;
use crate::history::HistoryEntry;
use crate::model::{Annotation, AnnotationShape, EntityRecord, PenStyle, Tool};
use crate::store::StateStore;

/// A stroke or shape being drawn between pointer-down and pointer-up.
#[derive(Debug, Clone)]
pub struct DrawGesture {
    tool: Tool,
    page: u32,
    /// Points collected so far. Shapes only use the first and last.
    points: Vec<Point>,
}

impl DrawGesture {
    /// Start drawing. `None` for tools that do not draw.
    pub fn start(tool: Tool, page: u32, point: Point) -> Option<Self> {
        if !tool.is_drawing_tool() {
            return None;
        }
        Some(Self {
            tool,
            page,
            points: vec![point],
        })
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Extend a stroke or move a shape's free corner.
    pub fn add_point(&mut self, point: Point) {
        match self.tool {
            Tool::Freehand => {
                if self.points.last() != Some(&point) {
                    self.points.push(point);
                }
            }
            _ => {
                if self.points.len() < 2 {
                    self.points.push(point);
                } else if let Some(last) = self.points.last_mut() {
                    *last = point;
                }
            }
        }
    }

    /// The shape as it would be committed right now.
    pub fn preview(&self) -> Option<AnnotationShape> {
        let first = *self.points.first()?;
        let last = *self.points.last()?;
        match self.tool {
            Tool::Freehand => Some(AnnotationShape::Freehand {
                points: self.points.clone(),
            }),
            Tool::Rectangle => Some(AnnotationShape::Rectangle {
                start: first,
                end: last,
            }),
            Tool::Circle => Some(AnnotationShape::Circle {
                start: first,
                end: last,
            }),
            _ => None,
        }
    }

    /// Commit the drawing as an annotation with its own history entry.
    ///
    /// A degenerate shape (a click without movement) is dropped quietly.
    pub(crate) fn finish(mut self, store: &mut StateStore, point: Point, pen: &PenStyle) -> GestureOutcome {
        self.add_point(point);
        let Some(shape) = self.preview() else {
            return GestureOutcome::Discarded;
        };
        if let Err(e) = shape.validate() {
            log::debug!("Dropped {} drawing: {}", shape.name(), e);
            return GestureOutcome::Discarded;
        }

        let id = store.allocate_id();
        match Annotation::new(id, self.page, shape, pen) {
            Ok(annotation) => {
                log::debug!("Committed {} annotation {}", annotation.shape.name(), id);
                let record = EntityRecord::Annotation(annotation.clone());
                store.push(annotation);
                store.add_to_history(HistoryEntry::Added { record });
                GestureOutcome::Committed
            }
            Err(e) => {
                log::debug!("Annotation rejected: {e}");
                GestureOutcome::Discarded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_drawing_tools_start() {
        assert!(DrawGesture::start(Tool::Select, 1, Point::new(0.0, 0.0)).is_none());
        assert!(DrawGesture::start(Tool::Circle, 1, Point::new(0.0, 0.0)).is_some());
    }

    #[test]
    fn test_freehand_collects_points() {
        let mut gesture = DrawGesture::start(Tool::Freehand, 1, Point::new(0.0, 0.0)).unwrap();
        gesture.add_point(Point::new(1.0, 1.0));
        gesture.add_point(Point::new(1.0, 1.0));
        gesture.add_point(Point::new(2.0, 3.0));
        match gesture.preview() {
            Some(AnnotationShape::Freehand { points }) => assert_eq!(points.len(), 3),
            other => panic!("unexpected preview {other:?}"),
        }
    }

    #[test]
    fn test_rectangle_tracks_last_corner() {
        let mut gesture = DrawGesture::start(Tool::Rectangle, 1, Point::new(10.0, 10.0)).unwrap();
        gesture.add_point(Point::new(20.0, 20.0));
        gesture.add_point(Point::new(30.0, 40.0));
        assert_eq!(
            gesture.preview(),
            Some(AnnotationShape::Rectangle {
                start: Point::new(10.0, 10.0),
                end: Point::new(30.0, 40.0)
            })
        );
    }

    #[test]
    fn test_finish_commits_with_history() {
        let mut store = StateStore::new();
        let gesture = DrawGesture::start(Tool::Circle, 3, Point::new(10.0, 10.0)).unwrap();
        let outcome = gesture.finish(&mut store, Point::new(50.0, 30.0), &PenStyle::default());
        assert_eq!(outcome, GestureOutcome::Committed);
        assert_eq!(store.document().annotations.len(), 1);
        assert_eq!(store.document().annotations[0].page, 3);
        assert_eq!(store.history().undo_count(), 1);
    }

    #[test]
    fn test_click_shape_is_discarded() {
        let mut store = StateStore::new();
        let gesture = DrawGesture::start(Tool::Rectangle, 1, Point::new(10.0, 10.0)).unwrap();
        let outcome = gesture.finish(&mut store, Point::new(10.0, 10.0), &PenStyle::default());
        assert_eq!(outcome, GestureOutcome::Discarded);
        assert!(store.document().annotations.is_empty());
        assert_eq!(store.history().undo_count(), 0);
    }

    #[test]
    fn test_single_point_stroke_is_kept() {
        let mut store = StateStore::new();
        let gesture = DrawGesture::start(Tool::Freehand, 1, Point::new(5.0, 5.0)).unwrap();
        let outcome = gesture.finish(&mut store, Point::new(5.0, 5.0), &PenStyle::default());
        assert_eq!(outcome, GestureOutcome::Committed);
    }
}
