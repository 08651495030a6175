//! The persisted session record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Annotation, RedactedArea, Signature, Stamp, TextEdit, TextOverlay, Tool};
use crate::store::{DocumentState, StateStore};

/// Current session record format version.
/// Stored records with any other version are discarded on restore.
pub const SESSION_VERSION: u32 = 1;

/// Everything a saved session captures. Undo history is not part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub version: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub doc_fingerprint: String,
    pub current_page: u32,
    pub scale: f32,
    pub current_tool: Tool,
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
    #[serde(default)]
    pub patches: Vec<RedactedArea>,
    #[serde(default)]
    pub page_rotations: BTreeMap<u32, i32>,
}

/// Only the version, read before committing to the full schema.
#[derive(Debug, Deserialize)]
pub(crate) struct VersionProbe {
    pub version: u32,
}

impl SessionRecord {
    /// Capture the store's persistent state.
    pub fn capture(store: &StateStore, doc_fingerprint: &str, timestamp: u64) -> Self {
        let doc = store.document().clone();
        Self {
            version: SESSION_VERSION,
            timestamp,
            doc_fingerprint: doc_fingerprint.to_string(),
            current_page: store.current_page(),
            scale: store.scale(),
            current_tool: store.tool(),
            text_edits: doc.text_edits,
            text_overlays: doc.text_overlays,
            annotations: doc.annotations,
            signatures: doc.signatures,
            stamps: doc.stamps,
            patches: doc.redactions,
            page_rotations: doc.page_rotations,
        }
    }

    /// The entity collections of this record.
    pub fn document(&self) -> DocumentState {
        DocumentState {
            text_edits: self.text_edits.clone(),
            text_overlays: self.text_overlays.clone(),
            annotations: self.annotations.clone(),
            signatures: self.signatures.clone(),
            stamps: self.stamps.clone(),
            redactions: self.patches.clone(),
            page_rotations: self.page_rotations.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Milliseconds since the Unix epoch, 0 if the clock is before it.
pub(crate) fn now_millis() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
