//! Drafting sessions
//!
//! [`DraftingSession`] is the single-owner coordinator: wizard step, story
//! parameters, working content, revision history, note thread and generation
//! pipeline. [`SessionHandle`] wraps one in an actor for callers that share it.

mod drafting;
mod handle;
mod messages;
mod step;
mod view;

pub use drafting::{
    AI_AUTHOR, CRITIQUE_FAILED, CRITIQUE_UNAVAILABLE, Critique, CritiqueJob, DraftingSession, GenerateOutcome,
    GenerateRejection, PendingConfirmation,
};
pub use handle::SessionHandle;
pub use messages::{SessionCommand, SessionError, SessionResponse};
pub use step::WizardStep;
pub use view::SessionView;
