//! pagemark - undoable annotation model for in-browser document editing
//!
//! Holds everything a page editor changes on top of a rendered document:
//! free text overlays, edits of existing text runs, drawn annotations,
//! redacted areas, signatures, stamps and page rotations. Pointer gestures
//! are turned into those entities by the [`interaction`] controller, every
//! change is undoable through [`history`], and the working state survives
//! reloads of the same document through [`session`].
//!
//! Rendering, OCR and writing the final document are left to the host;
//! [`collaborators`] defines the records exchanged with them.

pub mod collaborators;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod logging;
pub mod model;
pub mod session;
pub mod store;

pub use editor::Editor;
pub use error::EditError;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

#[cfg(test)]
mod tests;
