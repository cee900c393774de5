//! Caller-facing read model of a drafting session

use serde::Serialize;

use super::WizardStep;
use crate::domain::{GenerationParameters, HistoryOrder, Note, Revision};
use crate::generation::GenerationState;

/// Snapshot of everything a caller renders
///
/// Owned copies, so a view stays valid after the session moves on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub step: WizardStep,
    pub parameters: GenerationParameters,
    pub working_content: String,
    pub history_order: HistoryOrder,
    /// In presentation order
    pub revisions: Vec<Revision>,
    /// Oldest first
    pub notes: Vec<Note>,
    pub generation: GenerationState,
}

impl SessionView {
    /// Revision at a one-based position in presentation order
    pub fn revision_at(&self, position: usize) -> Option<&Revision> {
        position.checked_sub(1).and_then(|i| self.revisions.get(i))
    }
}
