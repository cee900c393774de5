//! DraftRoom - AI-assisted script drafting
//!
//! DraftRoom turns a handful of story parameters into a generated opening
//! scene, keeps every saved snapshot of the script as an immutable revision
//! history, and lets participants attach time-ordered notes to the document.
//!
//! # Core Concepts
//!
//! - **One generation in flight**: a second request while one is pending is a no-op
//! - **Failures stay in-band**: a failed generation yields readable fallback text, never an empty draft
//! - **Full snapshots**: revisions store whole documents, restored verbatim
//! - **Explicit ownership**: one session object per document, an actor when shared
//!
//! # Modules
//!
//! - [`llm`] - LLM client trait and provider implementations
//! - [`prompts`] - Handlebars prompt templates
//! - [`generation`] - GenerationClient and GenerationPipeline
//! - [`session`] - DraftingSession and its actor handle
//! - [`domain`] - Story parameters, style presets, participants
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`repl`] - Interactive drafting REPL

pub mod cli;
pub mod config;
pub mod domain;
pub mod generation;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod session;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use domain::{GenerationParameters, Genre, HistoryOrder, Note, NoteThread, Revision, RevisionStore, StoreError};
pub use generation::{GenerationClient, GenerationError, GenerationPipeline, GenerationState};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, create_client};
pub use session::{DraftingSession, GenerateOutcome, SessionError, SessionHandle, SessionView, WizardStep};
