//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::Config;
use crate::domain::Genre;

/// DraftRoom - AI-assisted script drafting
#[derive(Parser)]
#[command(
    name = "dr",
    about = "AI-assisted script drafting with revision history and shared notes",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive drafting session (default)
    Draft,

    /// Generate one opening scene and print it
    Generate {
        /// Protagonist
        #[arg(long)]
        hero: String,

        /// Plot hook
        #[arg(long)]
        plot: String,

        /// Genre (Action, Comedy, Drama, Horror, Sci-Fi, Thriller, Romance)
        #[arg(short, long, default_value = "Drama")]
        genre: Genre,

        /// Writer style: preset number, preset name, or free text
        #[arg(short, long)]
        style: Option<String>,

        /// Antagonist
        #[arg(long, default_value = "")]
        villain: String,

        /// Setting
        #[arg(long, default_value = "")]
        setting: String,
    },

    /// List writer style presets
    Styles,

    /// List genres
    Genres,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("draftroom")
        .join("logs")
        .join("draftroom.log")
}

/// Extra help text: provider, credential status and log location
pub fn generate_after_help(config: &Config) -> String {
    debug!("generate_after_help: called");
    let resolved = config.llm.resolve();

    let mut help = String::new();
    help.push_str("Generation:\n");
    help.push_str(&format!("  provider   {} ({})\n", resolved.provider, resolved.model));
    let key_icon = if resolved.api_key().is_some() {
        debug!("generate_after_help: api key set");
        "\u{2705}"
    } else {
        debug!("generate_after_help: api key missing");
        "\u{274C}"
    };
    help.push_str(&format!("  {} {}\n", key_icon, resolved.api_key_env));

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "dr",
            "generate",
            "--hero",
            "A retired hitman",
            "--plot",
            "one last job",
            "--genre",
            "sci-fi",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Generate {
                hero, plot, genre, style, ..
            }) => {
                assert_eq!(hero, "A retired hitman");
                assert_eq!(plot, "one last job");
                assert_eq!(genre, Genre::SciFi);
                assert!(style.is_none());
            }
            other => panic!("Expected Generate, got {:?}", other),
        }
    }

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["dr", "--log-level", "debug"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_bad_genre_rejected() {
        assert!(Cli::try_parse_from(["dr", "generate", "--hero", "h", "--plot", "p", "--genre", "western"]).is_err());
    }

    #[test]
    fn test_log_path() {
        assert!(get_log_path().ends_with("draftroom/logs/draftroom.log"));
    }
}
