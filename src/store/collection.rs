//! Entity collections and the trait that lets the store address them generically.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::event::CollectionKind;
use crate::model::{
    Annotation, EntityId, EntityKind, RedactedArea, Signature, Stamp, TextEdit, TextOverlay,
};

/// Every entity collection of the open document.
///
/// Field names follow the persisted session schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentState {
    #[serde(default)]
    pub text_edits: Vec<TextEdit>,
    #[serde(default)]
    pub text_overlays: Vec<TextOverlay>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub signatures: Vec<Signature>,
    #[serde(default)]
    pub stamps: Vec<Stamp>,
    #[serde(default, rename = "patches")]
    pub redactions: Vec<RedactedArea>,
    /// Page number to clockwise rotation in degrees.
    #[serde(default)]
    pub page_rotations: BTreeMap<u32, i32>,
}

impl DocumentState {
    /// Highest entity id in use, 0 when empty.
    pub fn max_id(&self) -> EntityId {
        let ids = self
            .text_overlays
            .iter()
            .map(|o| o.id)
            .chain(self.annotations.iter().map(|a| a.id))
            .chain(self.redactions.iter().map(|r| r.id))
            .chain(self.signatures.iter().map(|s| s.id))
            .chain(self.stamps.iter().map(|s| s.id));
        ids.max().unwrap_or(0)
    }

    pub fn len_of(&self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::TextOverlays => self.text_overlays.len(),
            CollectionKind::TextEdits => self.text_edits.len(),
            CollectionKind::Annotations => self.annotations.len(),
            CollectionKind::Redactions => self.redactions.len(),
            CollectionKind::Signatures => self.signatures.len(),
            CollectionKind::Stamps => self.stamps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        CollectionKind::all().iter().all(|k| self.len_of(*k) == 0)
            && self.page_rotations.is_empty()
    }
}

/// A type stored in one of the [`DocumentState`] vectors.
pub trait Collection: Clone + 'static {
    const KIND: CollectionKind;

    fn items(doc: &DocumentState) -> &Vec<Self>;
    fn items_mut(doc: &mut DocumentState) -> &mut Vec<Self>;
}

/// A collection item addressed by [`EntityId`].
pub trait Identified: Collection {
    const ENTITY: EntityKind;

    fn id(&self) -> EntityId;
}

macro_rules! collection {
    ($ty:ty, $kind:expr, $field:ident) => {
        impl Collection for $ty {
            const KIND: CollectionKind = $kind;

            fn items(doc: &DocumentState) -> &Vec<Self> {
                &doc.$field
            }

            fn items_mut(doc: &mut DocumentState) -> &mut Vec<Self> {
                &mut doc.$field
            }
        }
    };
    ($ty:ty, $kind:expr, $field:ident, $entity:expr) => {
        collection!($ty, $kind, $field);

        impl Identified for $ty {
            const ENTITY: EntityKind = $entity;

            fn id(&self) -> EntityId {
                self.id
            }
        }
    };
}

collection!(TextEdit, CollectionKind::TextEdits, text_edits);
collection!(
    TextOverlay,
    CollectionKind::TextOverlays,
    text_overlays,
    EntityKind::Overlay
);
collection!(
    Annotation,
    CollectionKind::Annotations,
    annotations,
    EntityKind::Annotation
);
collection!(
    RedactedArea,
    CollectionKind::Redactions,
    redactions,
    EntityKind::Redaction
);
collection!(
    Signature,
    CollectionKind::Signatures,
    signatures,
    EntityKind::Signature
);
collection!(Stamp, CollectionKind::Stamps, stamps, EntityKind::Stamp);
