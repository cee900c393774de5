//! DraftRoom - AI-assisted script drafting
//!
//! CLI entry point for the drafting REPL and one-shot generation.

use std::fs;
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use draftroom::cli::{Cli, Command, generate_after_help};
use draftroom::config::Config;
use draftroom::domain::{GenerationParameters, resolve_style};
use draftroom::generation::{GenerationClient, GenerationPipeline, GenerationStatus};
use draftroom::repl;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("draftroom")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(log_dir.join("draftroom.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load log level from config file early (before full config load)
    let pre_cli = Cli::try_parse_from(std::env::args()).ok();
    let config_path = pre_cli.as_ref().and_then(|c| c.config.clone());
    let config_log_level = Config::load_log_level(config_path.as_ref());
    let cli_log_level = pre_cli.as_ref().and_then(|c| c.log_level.clone());

    setup_logging(cli_log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(config_path.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    // Build command with after_help showing provider and credential status
    let cmd = Cli::command().after_help(generate_after_help(&config));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    info!("DraftRoom loaded config: provider={}", config.llm.provider);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Draft) | None => {
            debug!("main: launching drafting REPL");
            repl::run_interactive(&config).await
        }
        Some(Command::Generate {
            hero,
            plot,
            genre,
            style,
            villain,
            setting,
        }) => {
            debug!(%genre, "main: matched Generate command");
            let params = GenerationParameters {
                genre,
                style_template: style
                    .as_deref()
                    .map(resolve_style)
                    .unwrap_or_else(|| GenerationParameters::default().style_template),
                hero,
                villain,
                plot_hook: plot,
                setting,
            };
            cmd_generate(&config, params).await
        }
        Some(Command::Styles) => {
            debug!("main: matched Styles command");
            repl::print_styles();
            Ok(())
        }
        Some(Command::Genres) => {
            debug!("main: matched Genres command");
            repl::print_genres();
            Ok(())
        }
    }
}

/// One-shot generation to stdout
async fn cmd_generate(config: &Config, params: GenerationParameters) -> Result<()> {
    debug!(genre = %params.genre, "cmd_generate: called");
    if !params.has_hero() || !params.has_plot_hook() {
        return Err(eyre::eyre!("Both --hero and --plot must be non-empty"));
    }

    let client = GenerationClient::from_config(config)?;
    let mut pipeline = GenerationPipeline::new(client, &config.generation);
    let Some(pending) = pipeline.dispatch(&params) else {
        return Err(eyre::eyre!("A generation is already in progress"));
    };

    eprintln!("{}", "Generating opening scene...".dimmed());
    let generated = pipeline.resolve(pending.run().await);
    println!("{}", generated.content);

    if generated.status == GenerationStatus::Failed {
        debug!("cmd_generate: generation failed");
        std::process::exit(1);
    }
    Ok(())
}
