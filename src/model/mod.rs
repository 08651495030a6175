//! Entity model: value records for everything placed on a page.

mod annotation;
mod overlay;
mod placed;
mod record;
mod text_edit;
mod tool;

/// Session-unique identifier shared by all id-bearing entities.
pub type EntityId = u64;

pub use annotation::{Annotation, AnnotationShape, PenStyle};
pub use overlay::{Alignment, OverlayDraft, OverlayPatch, TextOverlay};
pub use placed::{RedactedArea, Signature, Stamp};
pub use record::{EntityKind, EntityRecord, EntityRef};
pub use text_edit::{
    ResolvedRun, RunKey, TextEdit, TextEditOverrides, TextRun, TextStyle, estimate_width,
    resolve_run,
};
pub use tool::Tool;
