//! Revision history
//!
//! A [`RevisionStore`] owns every saved snapshot of one document. Snapshots are
//! full documents, never deltas, and are never mutated or removed once stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::id::{generate_id, next_timestamp};

/// Presentation order of a revision history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryOrder {
    /// The first revision becomes the sole element; every later revision is
    /// inserted at position 0. The founding revision therefore sits at the
    /// end of the list, behind every later save.
    #[default]
    MostRecentFirst,
    /// Strict insertion order: the founding revision stays at position 0.
    Chronological,
}

impl std::fmt::Display for HistoryOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MostRecentFirst => write!(f, "most-recent-first"),
            Self::Chronological => write!(f, "chronological"),
        }
    }
}

/// An immutable snapshot of document content plus provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Revision {
    id: String,
    created_at: DateTime<Utc>,
    content: String,
    summary: String,
    author_name: String,
}

impl Revision {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Human label, e.g. "Initial Generation" or "Manual Edit"
    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }
}

/// Ordered, restorable history of snapshots for one document
#[derive(Debug, Clone, Default)]
pub struct RevisionStore {
    order: HistoryOrder,
    revisions: Vec<Revision>,
}

impl RevisionStore {
    pub fn new(order: HistoryOrder) -> Self {
        debug!(%order, "RevisionStore::new: called");
        Self {
            order,
            revisions: Vec::new(),
        }
    }

    pub fn order(&self) -> HistoryOrder {
        self.order
    }

    /// Store a new snapshot and return it
    ///
    /// The first revision of a store becomes its sole element. After that the
    /// position depends on [`HistoryOrder`].
    pub fn append(
        &mut self,
        content: impl Into<String>,
        summary: impl Into<String>,
        author_name: impl Into<String>,
    ) -> &Revision {
        let revision = Revision {
            id: self.fresh_id(),
            created_at: next_timestamp(self.latest().map(Revision::created_at)),
            content: content.into(),
            summary: summary.into(),
            author_name: author_name.into(),
        };
        debug!(
            id = %revision.id,
            summary = %revision.summary,
            content_len = revision.content.len(),
            existing = self.revisions.len(),
            "RevisionStore::append: called"
        );

        if self.revisions.is_empty() {
            debug!("RevisionStore::append: founding revision");
            self.revisions.push(revision);
            return &self.revisions[0];
        }

        match self.order {
            HistoryOrder::MostRecentFirst => {
                debug!("RevisionStore::append: inserting at front");
                self.revisions.insert(0, revision);
                &self.revisions[0]
            }
            HistoryOrder::Chronological => {
                debug!("RevisionStore::append: pushing to back");
                self.revisions.push(revision);
                &self.revisions[self.revisions.len() - 1]
            }
        }
    }

    /// Content of the revision with the given ID, verbatim
    ///
    /// Never reorders or removes anything; adopting the content is the caller's call.
    pub fn restore(&self, id: &str) -> Result<&str, StoreError> {
        debug!(%id, "RevisionStore::restore: called");
        self.get(id).map(Revision::content).ok_or_else(|| {
            debug!(%id, "RevisionStore::restore: no such revision");
            StoreError::RevisionNotFound(id.to_string())
        })
    }

    pub fn get(&self, id: &str) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.id == id)
    }

    /// Revisions in presentation order
    pub fn list(&self) -> &[Revision] {
        &self.revisions
    }

    /// The most recently appended revision
    pub fn latest(&self) -> Option<&Revision> {
        match self.order {
            HistoryOrder::MostRecentFirst => self.revisions.first(),
            HistoryOrder::Chronological => self.revisions.last(),
        }
    }

    /// The first revision ever appended
    pub fn founding(&self) -> Option<&Revision> {
        match self.order {
            HistoryOrder::MostRecentFirst => self.revisions.last(),
            HistoryOrder::Chronological => self.revisions.first(),
        }
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = generate_id("rev");
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}
