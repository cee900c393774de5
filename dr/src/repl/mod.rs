//! Interactive REPL for DraftRoom
//!
//! Drives one drafting session through its wizard steps from the terminal.

mod command;
mod session;

pub use command::ReplCommand;
pub use session::{ReplSession, print_genres, print_styles};

use eyre::Result;
use tracing::debug;

use crate::config::Config;
use crate::session::{DraftingSession, SessionHandle};

/// Run the interactive REPL
///
/// This is the main entry point for `dr draft`.
pub async fn run_interactive(config: &Config) -> Result<()> {
    debug!("run_interactive: called");
    let session = DraftingSession::from_config(config)?;
    let handle = SessionHandle::spawn(session);

    let mut repl = ReplSession::new(handle.clone(), config.llm.resolve().api_key().is_some());
    let result = repl.run().await;

    if let Err(e) = handle.shutdown().await {
        debug!(error = %e, "run_interactive: session already stopped");
    }
    result
}
