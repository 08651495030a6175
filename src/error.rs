//! Error types for editing actions.
//!
//! Invalid references (stale ids or indices) are not errors: the store and
//! editor report them as `None`/`false`. The variants here are invariant
//! violations that stop an entity from being created at all.

use thiserror::Error;

/// An edit rejected before any entity or history entry was created.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// Text content is required but empty (or whitespace only)
    #[error("Text cannot be empty")]
    EmptyText,

    /// A box has zero or negative extent
    #[error("Size must be positive (got {width} x {height})")]
    NonPositiveSize {
        /// Offending width
        width: f32,
        /// Offending height
        height: f32,
    },

    /// Page number outside the loaded document
    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange {
        /// Requested page (1-based)
        page: u32,
        /// Pages in the loaded document
        page_count: u32,
    },

    /// Shape with identical start and end corners
    #[error("Shape needs two distinct corners")]
    DegenerateShape,

    /// Freehand stroke without points
    #[error("Stroke needs at least one point")]
    EmptyStroke,

    /// The referenced text run was never reported by the renderer
    #[error("Text run {index} on page {page} is not available")]
    UnknownRun {
        /// Page of the run
        page: u32,
        /// Run index within the page
        index: usize,
    },

    /// Rotation that is not a multiple of 90 degrees
    #[error("Rotation must be a multiple of 90 degrees (got {0})")]
    InvalidRotation(i32),
}

impl EditError {
    /// Create a size error from a width/height pair.
    pub fn non_positive_size(width: f32, height: f32) -> Self {
        Self::NonPositiveSize { width, height }
    }
}
