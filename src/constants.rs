//! Global constants for the pagemark editor core.
//!
//! These are the documented defaults. Most of them can be overridden
//! through [`crate::config::InteractionConfig`] and friends.

/// Font size applied to new text overlays when none is given.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// Default overlay text color.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Default overlay background (semi-opaque white).
pub const DEFAULT_BACKGROUND: &str = "rgba(255, 255, 255, 0.8)";

/// Default overlay font family.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// Default overlay box size used when a caller only supplies a position.
pub const DEFAULT_OVERLAY_WIDTH: f32 = 200.0;
pub const DEFAULT_OVERLAY_HEIGHT: f32 = 30.0;

/// Movement (screen units, either axis) that turns a press into a drag.
pub const DRAG_THRESHOLD: f32 = 5.0;

/// Delay after pointer-down before movement is checked for a drag.
pub const DRAG_CONFIRM_DELAY_MS: u64 = 100;

/// Hit radius around resize handles.
pub const HANDLE_HIT_RADIUS: f32 = 8.0;

/// Minimum overlay width reachable through a resize.
pub const MIN_OVERLAY_WIDTH: f32 = 50.0;

/// Minimum overlay height reachable through a resize.
pub const MIN_OVERLAY_HEIGHT: f32 = 20.0;

/// OCR selections must be wider and taller than this to be consumed.
pub const OCR_MIN_SELECTION: f32 = 20.0;

/// Erase selections must be wider and taller than this to be consumed.
pub const ERASE_MIN_SELECTION: f32 = 10.0;

/// Font size clamp for resize gestures.
pub const MIN_FONT_SIZE: f32 = 8.0;
pub const MAX_FONT_SIZE: f32 = 72.0;

/// Vertical screen units of handle travel per point of font size.
pub const FONT_RESIZE_RATIO: f32 = 5.0;

/// Minimum hit tolerance for freehand strokes.
pub const STROKE_HIT_TOLERANCE: f32 = 4.0;

/// Default freehand/shape stroke.
pub const DEFAULT_PEN_COLOR: &str = "#e53935";
pub const DEFAULT_PEN_SIZE: f32 = 3.0;

/// Quiet period before a pending auto-save fires.
pub const AUTO_SAVE_DEBOUNCE_MS: u64 = 1000;

/// Storage key of the persisted session record.
pub const SESSION_STORAGE_KEY: &str = "pagemark-session";

/// Undo depth kept by default.
pub const DEFAULT_MAX_HISTORY: usize = 100;
