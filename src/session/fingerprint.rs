//! Cheap document fingerprint used to gate session restore.

use std::fmt;

/// Leading bytes that go into the hash.
pub const SAMPLE_BYTES: usize = 64 * 1024;

/// `"<length>:<hash>"` of a document. Not collision resistant; it only
/// tells "same file reloaded" apart from "different file".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        let sample = &bytes[..bytes.len().min(SAMPLE_BYTES)];
        let hash = sample
            .iter()
            .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(*b)));
        Self(format!("{}:{:08x}", bytes.len(), hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
