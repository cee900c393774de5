//! Session actor messages
//!
//! Commands and responses for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;

use super::{Critique, GenerateOutcome, PendingConfirmation, SessionView, WizardStep};
use crate::domain::{GenerationParameters, Genre, Note, StoreError};
use crate::generation::GenerationError;

/// Errors from session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Not allowed in step {step}: {operation}")]
    InvalidStep { step: WizardStep, operation: &'static str },

    #[error("Editing is reached by generating a draft")]
    GenerationRequired,

    #[error("A generation is in progress")]
    GenerationPending,

    #[error("Unknown or stale confirmation: {0}")]
    UnknownConfirmation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Channel error")]
    ChannelError,
}

/// Response from session operations
pub type SessionResponse<T> = Result<T, SessionError>;

/// Commands sent to the session actor
#[derive(Debug)]
pub enum SessionCommand {
    // Navigation
    Advance {
        reply: oneshot::Sender<SessionResponse<WizardStep>>,
    },
    Back {
        reply: oneshot::Sender<SessionResponse<WizardStep>>,
    },

    // Parameters
    SetGenre {
        genre: Genre,
        reply: oneshot::Sender<SessionResponse<()>>,
    },
    SetStyleTemplate {
        style: String,
        reply: oneshot::Sender<SessionResponse<()>>,
    },
    SetHero {
        hero: String,
        reply: oneshot::Sender<SessionResponse<()>>,
    },
    SetVillain {
        villain: String,
        reply: oneshot::Sender<SessionResponse<()>>,
    },
    SetPlotHook {
        plot_hook: String,
        reply: oneshot::Sender<SessionResponse<()>>,
    },
    SetSetting {
        setting: String,
        reply: oneshot::Sender<SessionResponse<()>>,
    },
    SetParameters {
        params: GenerationParameters,
        reply: oneshot::Sender<SessionResponse<()>>,
    },

    // Generation
    Generate {
        reply: oneshot::Sender<GenerateOutcome>,
    },
    /// Internal: the spawned generation task reporting back
    GenerationFinished {
        outcome: Result<String, GenerationError>,
        reply: oneshot::Sender<GenerateOutcome>,
    },
    Critique {
        reply: oneshot::Sender<SessionResponse<Critique>>,
    },

    // Editing
    EditWorkingContent {
        text: String,
        reply: oneshot::Sender<SessionResponse<()>>,
    },
    SaveVersion {
        reply: oneshot::Sender<SessionResponse<String>>,
    },

    // Restore
    RequestRestore {
        revision_id: String,
        reply: oneshot::Sender<SessionResponse<PendingConfirmation>>,
    },
    ConfirmRestore {
        token: String,
        reply: oneshot::Sender<SessionResponse<String>>,
    },
    CancelRestore {
        reply: oneshot::Sender<bool>,
    },

    // Notes
    PostNote {
        body: String,
        reply: oneshot::Sender<SessionResponse<Note>>,
    },

    // Read model
    View {
        reply: oneshot::Sender<SessionView>,
    },

    // Shutdown
    Shutdown,
}
