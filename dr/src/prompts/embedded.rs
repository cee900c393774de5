//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Opening-scene generation prompt
pub const SCENE: &str = include_str!("../../prompts/scene.pmt");

/// Script critique prompt
pub const CRITIQUE: &str = include_str!("../../prompts/critique.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "scene" => Some(SCENE),
        "critique" => Some(CRITIQUE),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
