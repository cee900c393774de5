//! Store error types

use thiserror::Error;

/// Errors returned by [`crate::RevisionStore`] and [`crate::NoteThread`]
///
/// Both are caller errors: the store is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Revision not found: {0}")]
    RevisionNotFound(String),

    #[error("Note body is empty")]
    EmptyBody,
}
