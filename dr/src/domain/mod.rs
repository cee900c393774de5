//! Domain types for DraftRoom
//!
//! Story parameters, the style catalog and participant identity. Revision and
//! note records live in the draftstore crate and are re-exported here.

mod params;
mod participant;

pub use params::{GenerationParameters, Genre, STYLE_TEMPLATES, StyleTemplate, resolve_style};
pub use participant::Participant;

// Re-export draftstore types for convenience
pub use draftstore::{HistoryOrder, Note, NoteThread, Revision, RevisionStore, StoreError};
