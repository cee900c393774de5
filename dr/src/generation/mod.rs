//! Text generation: the service adapter and the one-in-flight pipeline

mod client;
mod error;
mod pipeline;

pub use client::GenerationClient;
pub use error::GenerationError;
pub use pipeline::{
    EMPTY_COMPLETION_FALLBACK, GeneratedText, GenerationPipeline, GenerationState, GenerationStatus,
    PendingGeneration, SERVICE_ERROR_FALLBACK, fallback_text,
};
