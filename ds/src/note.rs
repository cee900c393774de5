//! Note threads
//!
//! Append-only commentary attached to a document. Thread order is insertion
//! order, oldest first. There is no edit or delete.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::StoreError;
use crate::id::{generate_id, next_timestamp};

/// A single comment in a note thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    id: String,
    author_id: String,
    author_name: String,
    author_avatar: Option<String>,
    body: String,
    posted_at: DateTime<Utc>,
}

impl Note {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    pub fn author_avatar(&self) -> Option<&str> {
        self.author_avatar.as_deref()
    }

    /// Body as posted (not trimmed)
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn posted_at(&self) -> DateTime<Utc> {
        self.posted_at
    }
}

/// Append-only ordered commentary for one document
#[derive(Debug, Clone, Default)]
pub struct NoteThread {
    notes: Vec<Note>,
}

impl NoteThread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a note to the end of the thread
    ///
    /// Fails with [`StoreError::EmptyBody`] if the body is blank after trimming;
    /// the thread is unchanged in that case.
    pub fn post(
        &mut self,
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        author_avatar: Option<String>,
        body: impl Into<String>,
    ) -> Result<&Note, StoreError> {
        let body = body.into();
        debug!(body_len = body.len(), existing = self.notes.len(), "NoteThread::post: called");
        if body.trim().is_empty() {
            debug!("NoteThread::post: empty body, rejecting");
            return Err(StoreError::EmptyBody);
        }

        let note = Note {
            id: self.fresh_id(),
            author_id: author_id.into(),
            author_name: author_name.into(),
            author_avatar,
            body,
            posted_at: next_timestamp(self.notes.last().map(Note::posted_at)),
        };
        debug!(id = %note.id, author_id = %note.author_id, "NoteThread::post: appended");
        self.notes.push(note);
        Ok(&self.notes[self.notes.len() - 1])
    }

    /// Notes oldest first
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = generate_id("note");
            if !self.notes.iter().any(|n| n.id == id) {
                return id;
            }
        }
    }
}
