//! Uniform handle over every id-bearing entity kind.
//!
//! History entries and gestures refer to entities through these types so
//! undo/redo can be matched exhaustively instead of switching on strings.

use serde::{Deserialize, Serialize};

use crate::geometry::{HitTest, Point, Rect};
use crate::model::{Annotation, EntityId, RedactedArea, Signature, Stamp, TextOverlay};

/// Kinds of entities that live in an id-keyed collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Overlay,
    Annotation,
    Redaction,
    Signature,
    Stamp,
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Overlay => "text overlay",
            EntityKind::Annotation => "annotation",
            EntityKind::Redaction => "redacted area",
            EntityKind::Signature => "signature",
            EntityKind::Stamp => "stamp",
        }
    }
}

/// A reference to one entity by kind and id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

/// An owned copy of one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRecord {
    Overlay(TextOverlay),
    Annotation(Annotation),
    Redaction(RedactedArea),
    Signature(Signature),
    Stamp(Stamp),
}

impl EntityRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRecord::Overlay(_) => EntityKind::Overlay,
            EntityRecord::Annotation(_) => EntityKind::Annotation,
            EntityRecord::Redaction(_) => EntityKind::Redaction,
            EntityRecord::Signature(_) => EntityKind::Signature,
            EntityRecord::Stamp(_) => EntityKind::Stamp,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            EntityRecord::Overlay(o) => o.id,
            EntityRecord::Annotation(a) => a.id,
            EntityRecord::Redaction(r) => r.id,
            EntityRecord::Signature(s) => s.id,
            EntityRecord::Stamp(s) => s.id,
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind(), self.id())
    }

    pub fn page(&self) -> u32 {
        match self {
            EntityRecord::Overlay(o) => o.page,
            EntityRecord::Annotation(a) => a.page,
            EntityRecord::Redaction(r) => r.page,
            EntityRecord::Signature(s) => s.page,
            EntityRecord::Stamp(s) => s.page,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            EntityRecord::Overlay(o) => o.bounds(),
            EntityRecord::Annotation(a) => a.bounds(),
            EntityRecord::Redaction(r) => r.bounds(),
            EntityRecord::Signature(s) => s.bounds(),
            EntityRecord::Stamp(s) => s.bounds(),
        }
    }

    /// Whether the select tool may drag this entity.
    pub fn is_movable(&self) -> bool {
        matches!(
            self,
            EntityRecord::Overlay(_) | EntityRecord::Signature(_) | EntityRecord::Stamp(_)
        )
    }

    /// Copy moved so its top-left corner sits at `origin`.
    /// `None` for entities that cannot be moved.
    pub fn moved_to(&self, origin: Point) -> Option<EntityRecord> {
        let mut next = self.clone();
        match &mut next {
            EntityRecord::Overlay(o) => {
                o.x = origin.x;
                o.y = origin.y;
            }
            EntityRecord::Signature(s) => {
                s.x = origin.x;
                s.y = origin.y;
            }
            EntityRecord::Stamp(s) => {
                s.x = origin.x;
                s.y = origin.y;
            }
            EntityRecord::Annotation(_) | EntityRecord::Redaction(_) => return None,
        }
        Some(next)
    }

    /// Copy with a new bounding box. `None` for entities that cannot be resized.
    pub fn with_bounds(&self, rect: Rect) -> Option<EntityRecord> {
        let mut next = self.clone();
        let (x, y, width, height) = match &mut next {
            EntityRecord::Overlay(o) => (&mut o.x, &mut o.y, &mut o.width, &mut o.height),
            EntityRecord::Signature(s) => (&mut s.x, &mut s.y, &mut s.width, &mut s.height),
            EntityRecord::Stamp(s) => (&mut s.x, &mut s.y, &mut s.width, &mut s.height),
            EntityRecord::Annotation(_) | EntityRecord::Redaction(_) => return None,
        };
        *x = rect.x;
        *y = rect.y;
        *width = rect.width;
        *height = rect.height;
        Some(next)
    }

    pub fn as_overlay(&self) -> Option<&TextOverlay> {
        match self {
            EntityRecord::Overlay(o) => Some(o),
            _ => None,
        }
    }
}

impl HitTest for EntityRecord {
    fn hit_test(&self, point: &Point) -> bool {
        match self {
            EntityRecord::Annotation(a) => a.hit_test(point),
            other => other.bounds().contains(point),
        }
    }
}
