//! DraftStore - per-document revision history and note threads
//!
//! Two independent, in-memory stores owned by a single drafting session:
//!
//! - [`RevisionStore`] keeps immutable full-document snapshots in an explicit
//!   presentation order ([`HistoryOrder`])
//! - [`NoteThread`] keeps append-only commentary, oldest first
//!
//! Neither store persists anything; persistence is the owner's concern.
//!
//! # Example
//!
//! ```
//! use draftstore::{HistoryOrder, NoteThread, RevisionStore};
//!
//! let mut history = RevisionStore::new(HistoryOrder::MostRecentFirst);
//! let seed = history.append("INT. DINER - NIGHT", "Initial Generation", "AI Assistant").id().to_string();
//! history.append("INT. DINER - DAY", "Manual Edit", "Writer");
//! assert_eq!(history.list()[1].id(), seed);
//!
//! let mut notes = NoteThread::new();
//! assert!(notes.post("u2", "Producer", None, "   ").is_err());
//! notes.post("u2", "Producer", None, "Punch up the opening").unwrap();
//! assert_eq!(notes.len(), 1);
//! ```

mod error;
mod id;
mod note;
mod revision;

pub use error::StoreError;
pub use id::generate_id;
pub use note::{Note, NoteThread};
pub use revision::{HistoryOrder, Revision, RevisionStore};

/// Summary used for the revision seeded by a generation
pub const INITIAL_GENERATION_SUMMARY: &str = "Initial Generation";

/// Summary used for revisions saved by a participant
pub const MANUAL_EDIT_SUMMARY: &str = "Manual Edit";
