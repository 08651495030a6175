//! Resize handles and the geometry of a handle drag.

use crate::geometry::{Point, Rect};

/// One of the eight handles around a selected box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl Handle {
    pub fn all() -> &'static [Handle] {
        &[
            Handle::NorthWest,
            Handle::North,
            Handle::NorthEast,
            Handle::East,
            Handle::SouthEast,
            Handle::South,
            Handle::SouthWest,
            Handle::West,
        ]
    }

    /// Short identifier ("nw", "se", ...).
    pub fn name(&self) -> &'static str {
        match self {
            Handle::NorthWest => "nw",
            Handle::North => "n",
            Handle::NorthEast => "ne",
            Handle::East => "e",
            Handle::SouthEast => "se",
            Handle::South => "s",
            Handle::SouthWest => "sw",
            Handle::West => "w",
        }
    }

    /// Center of this handle on `rect`.
    pub fn position(&self, rect: &Rect) -> Point {
        let cx = rect.x + rect.width / 2.0;
        let cy = rect.y + rect.height / 2.0;
        match self {
            Handle::NorthWest => Point::new(rect.x, rect.y),
            Handle::North => Point::new(cx, rect.y),
            Handle::NorthEast => Point::new(rect.right(), rect.y),
            Handle::East => Point::new(rect.right(), cy),
            Handle::SouthEast => Point::new(rect.right(), rect.bottom()),
            Handle::South => Point::new(cx, rect.bottom()),
            Handle::SouthWest => Point::new(rect.x, rect.bottom()),
            Handle::West => Point::new(rect.x, cy),
        }
    }

    fn moves_left(&self) -> bool {
        matches!(self, Handle::NorthWest | Handle::West | Handle::SouthWest)
    }

    fn moves_right(&self) -> bool {
        matches!(self, Handle::NorthEast | Handle::East | Handle::SouthEast)
    }

    fn moves_top(&self) -> bool {
        matches!(self, Handle::NorthWest | Handle::North | Handle::NorthEast)
    }

    fn moves_bottom(&self) -> bool {
        matches!(self, Handle::SouthWest | Handle::South | Handle::SouthEast)
    }
}

/// Find the handle of `rect` under `point`, if any. Corners win over edges.
pub fn hit_handle(rect: &Rect, point: &Point, radius: f32, handles: &[Handle]) -> Option<Handle> {
    let mut best: Option<(Handle, f32)> = None;
    for handle in handles {
        let distance = handle.position(rect).distance_to(point);
        if distance <= radius && best.is_none_or(|(_, d)| distance < d) {
            best = Some((*handle, distance));
        }
    }
    best.map(|(handle, _)| handle)
}

/// Recompute a box from a handle drag of `(dx, dy)`.
///
/// The edges the handle does not touch stay put. Width and height never go
/// below the floors; when a floor is hit on a left or top edge the opposite
/// edge stays anchored.
pub fn resize_bounds(start: &Rect, handle: Handle, dx: f32, dy: f32, min_w: f32, min_h: f32) -> Rect {
    let mut left = start.x;
    let mut top = start.y;
    let mut right = start.right();
    let mut bottom = start.bottom();

    if handle.moves_left() {
        left = (left + dx).min(right - min_w);
    }
    if handle.moves_right() {
        right = (right + dx).max(left + min_w);
    }
    if handle.moves_top() {
        top = (top + dy).min(bottom - min_h);
    }
    if handle.moves_bottom() {
        bottom = (bottom + dy).max(top + min_h);
    }

    Rect::new(left, top, (right - left).max(min_w), (bottom - top).max(min_h))
}

/// Font size after dragging the font handle `dy` units down.
pub fn resize_font(start_size: f32, dy: f32, ratio: f32, min: f32, max: f32) -> f32 {
    let ratio = if ratio > 0.0 { ratio } else { 1.0 };
    (start_size + dy / ratio).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed() -> Rect {
        Rect::new(100.0, 100.0, 200.0, 40.0)
    }

    #[test]
    fn test_handle_positions() {
        let r = boxed();
        assert_eq!(Handle::SouthEast.position(&r), Point::new(300.0, 140.0));
        assert_eq!(Handle::North.position(&r), Point::new(200.0, 100.0));
        assert_eq!(Handle::West.position(&r), Point::new(100.0, 120.0));
    }

    #[test]
    fn test_hit_handle() {
        let r = boxed();
        let hit = hit_handle(&r, &Point::new(303.0, 138.0), 8.0, Handle::all());
        assert_eq!(hit, Some(Handle::SouthEast));
        assert_eq!(hit_handle(&r, &Point::new(200.0, 120.0), 8.0, Handle::all()), None);
        let only_se = [Handle::SouthEast];
        assert_eq!(hit_handle(&r, &Point::new(100.0, 100.0), 8.0, &only_se), None);
    }

    #[test]
    fn test_east_handle_changes_width_only() {
        let r = resize_bounds(&boxed(), Handle::East, 30.0, 50.0, 50.0, 20.0);
        assert_eq!(r, Rect::new(100.0, 100.0, 230.0, 40.0));
    }

    #[test]
    fn test_north_west_moves_origin() {
        let r = resize_bounds(&boxed(), Handle::NorthWest, -10.0, -5.0, 50.0, 20.0);
        assert_eq!(r, Rect::new(90.0, 95.0, 210.0, 45.0));
    }

    #[test]
    fn test_floors_keep_opposite_edge() {
        let r = resize_bounds(&boxed(), Handle::West, 500.0, 0.0, 50.0, 20.0);
        assert_eq!(r.width, 50.0);
        assert_eq!(r.right(), 300.0);

        let r = resize_bounds(&boxed(), Handle::South, 0.0, -100.0, 50.0, 20.0);
        assert_eq!(r.height, 20.0);
        assert_eq!(r.y, 100.0);
    }

    #[test]
    fn test_font_resize_ratio_and_clamp() {
        assert_eq!(resize_font(14.0, 50.0, 5.0, 8.0, 72.0), 24.0);
        assert_eq!(resize_font(14.0, -500.0, 5.0, 8.0, 72.0), 8.0);
        assert_eq!(resize_font(14.0, 5000.0, 5.0, 8.0, 72.0), 72.0);
    }
}
