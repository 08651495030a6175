//! Coordinate and geometry utilities.
//!
//! Pure functions and small value types. Everything here works in
//! page-local screen units unless a name says otherwise; the only place
//! page space shows up is [`Viewport`], which maps the rendering engine's
//! native page coordinates onto the rendered page.

use serde::{Deserialize, Serialize};

// ============================================================================
// Points and rectangles
// ============================================================================

/// A 2D point in page-local screen units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// This point shifted by a delta.
    pub fn offset(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// A rectangle anchored at `(x, y)`.
///
/// Width and height may be negative while a rubber-band gesture is in
/// flight; [`normalize_rect`] turns such a rectangle into the equivalent
/// one with a top-left anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a normalized rectangle spanning two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self {
            x: p1.x.min(p2.x),
            y: p1.y.min(p2.y),
            width: (p1.x - p2.x).abs(),
            height: (p1.y - p2.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether width and height are both non-negative.
    pub fn is_normalized(&self) -> bool {
        self.width >= 0.0 && self.height >= 0.0
    }

    /// Whether the rectangle encloses a non-zero area.
    pub fn has_area(&self) -> bool {
        self.width.abs() > 0.0 && self.height.abs() > 0.0
    }

    /// Point-in-rectangle test, edges inclusive. Works on unnormalized input.
    pub fn contains(&self, point: &Point) -> bool {
        let r = normalize_rect(*self);
        point.x >= r.x && point.x <= r.right() && point.y >= r.y && point.y <= r.bottom()
    }

    /// The same rectangle moved by a delta.
    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Multiply every component by `factor`.
    pub fn scaled(&self, factor: f32) -> Rect {
        Rect::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }
}

/// Return the equivalent rectangle with non-negative width and height.
///
/// A negative width means the drag went left of its anchor, so the anchor
/// moves left by that amount; likewise for height. Normalizing twice is
/// the same as normalizing once.
pub fn normalize_rect(rect: Rect) -> Rect {
    let (x, width) = if rect.width < 0.0 {
        (rect.x + rect.width, -rect.width)
    } else {
        (rect.x, rect.width)
    };
    let (y, height) = if rect.height < 0.0 {
        (rect.y + rect.height, -rect.height)
    } else {
        (rect.y, rect.height)
    };
    Rect {
        x,
        y,
        width,
        height,
    }
}

// ============================================================================
// Hit testing
// ============================================================================

/// Shortest distance from `point` to the segment `a`-`b`.
pub fn distance_to_segment(point: &Point, a: &Point, b: &Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return point.distance_to(a);
    }
    let t = (((point.x - a.x) * dx + (point.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    point.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Shortest distance from `point` to a polyline. `None` for an empty line.
pub fn distance_to_polyline(point: &Point, points: &[Point]) -> Option<f32> {
    match points {
        [] => None,
        [only] => Some(point.distance_to(only)),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment(point, &w[0], &w[1]))
            .reduce(f32::min),
    }
}

/// Whether `point` lies on a stroke of the given width.
///
/// The tolerance is half the stroke width, but never less than
/// `min_tolerance` so thin strokes remain clickable.
pub fn hit_polyline(point: &Point, points: &[Point], stroke_width: f32, min_tolerance: f32) -> bool {
    let tolerance = (stroke_width / 2.0).max(min_tolerance);
    distance_to_polyline(point, points).is_some_and(|d| d <= tolerance)
}

/// Something a pointer can land on.
pub trait HitTest {
    fn hit_test(&self, point: &Point) -> bool;
}

impl HitTest for Rect {
    fn hit_test(&self, point: &Point) -> bool {
        self.contains(point)
    }
}

// ============================================================================
// Affine transforms
// ============================================================================

/// A 2x3 affine matrix `[a, b, c, d, e, f]` in the rendering engine's
/// layout: `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine(pub [f32; 6]);

impl Affine {
    pub const IDENTITY: Affine = Affine([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// `self * other`: apply `other` first, then `self`.
    pub fn multiply(&self, other: &Affine) -> Affine {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Affine([
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * e2 + c1 * f2 + e1,
            b1 * e2 + d1 * f2 + f1,
        ])
    }

    pub fn apply(&self, point: Point) -> Point {
        let [a, b, c, d, e, f] = self.0;
        Point::new(a * point.x + c * point.y + e, b * point.x + d * point.y + f)
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Affine> {
        let [a, b, c, d, e, f] = self.0;
        let det = a * d - b * c;
        if det.abs() < f32::EPSILON {
            return None;
        }
        Some(Affine([
            d / det,
            -b / det,
            -c / det,
            a / det,
            (c * f - d * e) / det,
            (b * e - a * f) / det,
        ]))
    }

    /// Magnitude of the scale component, `sqrt(a² + b²)`.
    pub fn scale_magnitude(&self) -> f32 {
        let [a, b, ..] = self.0;
        (a * a + b * b).sqrt()
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Mapping from the page's native space onto the rendered page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Zoom factor of the rendered page.
    pub scale: f32,
    /// Page-space to screen-space transform.
    pub transform: Affine,
}

impl Viewport {
    /// Standard unrotated viewport for a page of the given native size:
    /// flips the y axis and applies `scale`.
    pub fn new(page_height: f32, scale: f32) -> Self {
        Self {
            scale,
            transform: Affine([scale, 0.0, 0.0, -scale, 0.0, page_height * scale]),
        }
    }

    /// Wrap a transform supplied verbatim by the rendering engine.
    pub fn from_transform(scale: f32, transform: Affine) -> Self {
        Self { scale, transform }
    }

    pub fn to_screen(&self, page_point: Point) -> Point {
        self.transform.apply(page_point)
    }

    pub fn to_page(&self, screen_point: Point) -> Option<Point> {
        self.transform.inverse().map(|inv| inv.apply(screen_point))
    }
}

/// On-screen placement of a text run derived from its native transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    /// Left edge.
    pub x: f32,
    /// Top edge (not the baseline).
    pub y: f32,
    pub font_size: f32,
}

/// Derive a run's top-left origin and font size on screen.
///
/// The engine reports a baseline origin, so the top of the box sits one
/// font size above it.
pub fn place_text(item_transform: &Affine, viewport: &Viewport) -> TextPlacement {
    let combined = viewport.transform.multiply(item_transform);
    let font_size = combined.scale_magnitude();
    let [.., e, f] = combined.0;
    TextPlacement {
        x: e,
        y: f - font_size,
        font_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_normalize_negative_extent() {
        let r = normalize_rect(Rect::new(100.0, 80.0, -40.0, -30.0));
        assert_eq!(r, Rect::new(60.0, 50.0, 40.0, 30.0));
    }

    #[test]
    fn test_normalize_mixed_signs() {
        let r = normalize_rect(Rect::new(10.0, 10.0, 25.0, -5.0));
        assert_eq!(r, Rect::new(10.0, 5.0, 25.0, 5.0));
    }

    #[test]
    fn test_normalize_is_noop_on_normalized() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(normalize_rect(r), r);
    }

    #[test]
    fn test_from_corners_any_order() {
        let a = Rect::from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        let b = Rect::from_corners(Point::new(10.0, 20.0), Point::new(50.0, 80.0));
        assert_eq!(a, b);
        assert_eq!(a, Rect::new(10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn test_contains_edges_and_unnormalized() {
        let r = Rect::new(10.0, 10.0, 100.0, 100.0);
        assert!(r.contains(&Point::new(10.0, 10.0)));
        assert!(r.contains(&Point::new(110.0, 110.0)));
        assert!(!r.contains(&Point::new(5.0, 50.0)));

        let flipped = Rect::new(110.0, 110.0, -100.0, -100.0);
        assert!(flipped.contains(&Point::new(50.0, 50.0)));
    }

    #[test]
    fn test_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!(approx_eq(distance_to_segment(&Point::new(5.0, 3.0), &a, &b), 3.0));
        // Beyond the end clamps to the endpoint
        assert!(approx_eq(distance_to_segment(&Point::new(13.0, 4.0), &a, &b), 5.0));
        // Degenerate segment
        assert!(approx_eq(distance_to_segment(&Point::new(3.0, 4.0), &a, &a), 5.0));
    }

    #[test]
    fn test_hit_polyline_uses_half_stroke_width() {
        let line = [Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        // Width 20 -> tolerance 10
        assert!(hit_polyline(&Point::new(50.0, 9.5), &line, 20.0, 2.0));
        assert!(!hit_polyline(&Point::new(50.0, 10.5), &line, 20.0, 2.0));
        // Thin stroke falls back to minimum tolerance
        assert!(hit_polyline(&Point::new(50.0, 3.0), &line, 1.0, 4.0));
        assert!(!hit_polyline(&Point::new(50.0, 3.0), &[], 1.0, 4.0));
    }

    #[test]
    fn test_single_point_polyline() {
        let line = [Point::new(10.0, 10.0)];
        assert!(hit_polyline(&Point::new(12.0, 10.0), &line, 6.0, 1.0));
    }

    #[test]
    fn test_affine_inverse_roundtrip() {
        let m = Affine([2.0, 0.5, -0.5, 2.0, 10.0, 20.0]);
        let inv = m.inverse().expect("invertible");
        let p = Point::new(3.0, 7.0);
        let back = inv.apply(m.apply(p));
        assert!(approx_eq(back.x, p.x));
        assert!(approx_eq(back.y, p.y));
        assert!(Affine([0.0; 6]).inverse().is_none());
    }

    #[test]
    fn test_viewport_flips_y() {
        let vp = Viewport::new(800.0, 1.5);
        let top_left = vp.to_screen(Point::new(0.0, 800.0));
        assert!(approx_eq(top_left.x, 0.0));
        assert!(approx_eq(top_left.y, 0.0));
        let page = vp.to_page(Point::new(150.0, 300.0)).expect("invertible");
        assert!(approx_eq(page.x, 100.0));
        assert!(approx_eq(page.y, 600.0));
    }

    #[test]
    fn test_place_text_shifts_baseline_to_top() {
        // 12pt text with baseline at (72, 700) on an 800pt page, zoom 2
        let vp = Viewport::new(800.0, 2.0);
        let item = Affine([12.0, 0.0, 0.0, 12.0, 72.0, 700.0]);
        let placed = place_text(&item, &vp);
        assert!(approx_eq(placed.font_size, 24.0));
        assert!(approx_eq(placed.x, 144.0));
        // Baseline at (800 - 700) * 2 = 200, top one font size above
        assert!(approx_eq(placed.y, 176.0));
    }

    #[test]
    fn test_scale_magnitude_of_rotated_text() {
        // 10pt text rotated 90 degrees
        let m = Affine([0.0, 10.0, -10.0, 0.0, 0.0, 0.0]);
        assert!(approx_eq(m.scale_magnitude(), 10.0));
    }

    proptest! {
        #[test]
        fn prop_normalize_idempotent(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            w in -1000.0f32..1000.0,
            h in -1000.0f32..1000.0,
        ) {
            let once = normalize_rect(Rect::new(x, y, w, h));
            prop_assert!(once.width >= 0.0);
            prop_assert!(once.height >= 0.0);
            prop_assert_eq!(normalize_rect(once), once);
        }

        #[test]
        fn prop_normalize_preserves_covered_area(
            x in -500.0f32..500.0,
            y in -500.0f32..500.0,
            w in -500.0f32..500.0,
            h in -500.0f32..500.0,
        ) {
            let r = Rect::new(x, y, w, h);
            let n = normalize_rect(r);
            prop_assert!((n.width - w.abs()).abs() < 1e-3);
            prop_assert!((n.height - h.abs()).abs() < 1e-3);
            // The drag anchor stays on the rectangle's boundary span
            prop_assert!(n.x <= x + 1e-3 && n.right() >= x - 1e-3);
            prop_assert!(n.y <= y + 1e-3 && n.bottom() >= y - 1e-3);
        }
    }
}
