//! REPL session management

use std::path::Path;

use colored::Colorize;
use eyre::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use super::ReplCommand;
use crate::domain::{Genre, STYLE_TEMPLATES, resolve_style};
use crate::generation::{GenerationState, GenerationStatus};
use crate::session::{GenerateOutcome, SessionError, SessionHandle, SessionView, WizardStep};

/// Interactive REPL over a session actor
pub struct ReplSession {
    handle: SessionHandle,
    has_credential: bool,
}

impl ReplSession {
    pub fn new(handle: SessionHandle, has_credential: bool) -> Self {
        debug!(%has_credential, "ReplSession::new: called");
        Self { handle, has_credential }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        debug!("ReplSession::run: called");
        self.print_welcome();
        self.print_step_hint().await?;

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let step = self.handle.view().await?.step;
            let readline = rl.readline(&format!("{} ", format!("[{}]>", step.number()).bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    match ReplCommand::parse(input) {
                        ReplCommand::Quit => break,
                        cmd => self.dispatch(cmd, &mut rl).await?,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn dispatch(&mut self, cmd: ReplCommand, rl: &mut DefaultEditor) -> Result<()> {
        debug!(?cmd, "ReplSession::dispatch: called");
        let result = match cmd {
            ReplCommand::Help => {
                self.print_help();
                Ok(())
            }
            ReplCommand::Quit => Ok(()),
            ReplCommand::Status => return self.print_status().await,
            ReplCommand::Genre(None) => {
                print_genres();
                Ok(())
            }
            ReplCommand::Genre(Some(name)) => match name.parse::<Genre>() {
                Ok(genre) => self.handle.set_genre(genre).await.map(|_| {
                    println!("Genre: {}", genre.to_string().bright_white());
                }),
                Err(e) => {
                    println!("{} {}", "?".yellow(), e);
                    Ok(())
                }
            },
            ReplCommand::Style(None) => {
                print_styles();
                Ok(())
            }
            ReplCommand::Style(Some(input)) => {
                let style = resolve_style(&input);
                self.handle
                    .set_style_template(style.clone())
                    .await
                    .map(|_| println!("Style: {}", style.bright_white()))
            }
            ReplCommand::Hero(hero) => self.handle.set_hero(hero).await,
            ReplCommand::Villain(villain) => self.handle.set_villain(villain).await,
            ReplCommand::Setting(setting) => self.handle.set_setting(setting).await,
            ReplCommand::Plot(plot) => self.handle.set_plot_hook(plot).await,
            ReplCommand::Next => match self.handle.advance().await {
                Ok(_) => return self.print_step_hint().await,
                Err(e) => Err(e),
            },
            ReplCommand::Back => match self.handle.back().await {
                Ok(_) => return self.print_step_hint().await,
                Err(e) => Err(e),
            },
            ReplCommand::Generate => return self.generate().await,
            ReplCommand::Show => {
                let view = self.handle.view().await?;
                print_document(&view.working_content);
                Ok(())
            }
            ReplCommand::Edit => return self.edit(rl).await,
            ReplCommand::Save => self.handle.save_version().await.map(|id| {
                println!("{} New version saved to history ({})", "✓".bright_green(), id.dimmed());
            }),
            ReplCommand::History => {
                let view = self.handle.view().await?;
                print_history(&view);
                Ok(())
            }
            ReplCommand::Restore(target) => return self.restore(&target, rl).await,
            ReplCommand::Note(body) => self.handle.post_note(body).await.map(|note| {
                println!("{} Note posted by {}", "✓".bright_green(), note.author_name());
            }),
            ReplCommand::Notes => {
                let view = self.handle.view().await?;
                print_notes(&view);
                Ok(())
            }
            ReplCommand::Critique => return self.critique().await,
            ReplCommand::Export(path) => return self.export(&path).await,
            ReplCommand::Usage(usage) => {
                println!("{} usage: {}", "?".yellow(), usage);
                Ok(())
            }
            ReplCommand::Unknown(word) => {
                println!("{} Unknown command: {}", "?".yellow(), word);
                println!("Type {} for available commands", "help".yellow());
                Ok(())
            }
        };

        report(result)
    }

    async fn generate(&mut self) -> Result<()> {
        debug!("ReplSession::generate: called");
        if !self.has_credential {
            println!("{}", "No API key configured; the draft will explain how to set one.".yellow());
        }
        println!("{}", "Generating opening scene...".dimmed());

        match self.handle.generate().await? {
            GenerateOutcome::Completed { status, .. } => {
                let view = self.handle.view().await?;
                print_document(&view.working_content);
                if status == GenerationStatus::Failed {
                    println!("{}", "Generation failed; the draft holds an explanation instead.".red());
                }
                self.print_step_hint().await
            }
            GenerateOutcome::Rejected(rejection) => {
                println!("{} Cannot generate: {}", "?".yellow(), rejection);
                Ok(())
            }
        }
    }

    async fn edit(&mut self, rl: &mut DefaultEditor) -> Result<()> {
        debug!("ReplSession::edit: called");
        let view = self.handle.view().await?;
        if view.step != WizardStep::Editing {
            return report::<()>(Err(SessionError::InvalidStep {
                step: view.step,
                operation: "edit",
            }));
        }

        println!("{}", "Enter the new draft. End with a line containing only '.'".dimmed());
        let mut lines = Vec::new();
        loop {
            match rl.readline("... ") {
                Ok(line) if line.trim_end() == "." => break,
                Ok(line) => lines.push(line),
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "Edit cancelled.".dimmed());
                    return Ok(());
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(eyre::eyre!("Readline error: {}", err)),
            }
        }

        report(self.handle.edit_working_content(lines.join("\n")).await)?;
        println!("{}", "Draft updated. Use 'save' to keep it in history.".dimmed());
        Ok(())
    }

    async fn restore(&mut self, target: &str, rl: &mut DefaultEditor) -> Result<()> {
        debug!(%target, "ReplSession::restore: called");
        let view = self.handle.view().await?;
        let revision_id = match target.parse::<usize>() {
            Ok(n) => match view.revision_at(n) {
                Some(rev) => rev.id().to_string(),
                None => {
                    println!("{} No revision #{}", "?".yellow(), n);
                    return Ok(());
                }
            },
            Err(_) => target.to_string(),
        };

        let confirmation = match self.handle.request_restore(&revision_id).await {
            Ok(c) => c,
            Err(e) => return report::<()>(Err(e)),
        };

        let answer = rl.readline(&format!("{} (y/N) ", confirmation.warning));
        let confirmed = matches!(answer.as_deref().map(str::trim), Ok("y") | Ok("Y") | Ok("yes"));
        if confirmed {
            report(self.handle.confirm_restore(&confirmation.token).await.map(|id| {
                println!("{} Restored {}", "✓".bright_green(), id.dimmed());
            }))
        } else {
            self.handle.cancel_restore().await?;
            println!("{}", "Restore cancelled.".dimmed());
            Ok(())
        }
    }

    async fn critique(&mut self) -> Result<()> {
        debug!("ReplSession::critique: called");
        println!("{}", "Analyzing draft...".dimmed());
        match self.handle.critique().await {
            Ok(critique) => {
                println!();
                println!("{}", "AI Critique:".bright_cyan());
                if critique.degraded {
                    println!("{}", critique.text.yellow());
                } else {
                    println!("{}", critique.text);
                }
                println!();
                Ok(())
            }
            Err(e) => report::<()>(Err(e)),
        }
    }

    async fn export(&mut self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "ReplSession::export: called");
        let view = self.handle.view().await?;
        let json = serde_json::to_string_pretty(&view).context("Failed to serialize session")?;
        std::fs::write(path, json).context(format!("Failed to write {}", path.display()))?;
        println!("{} Exported session to {}", "✓".bright_green(), path.display());
        Ok(())
    }

    async fn print_status(&self) -> Result<()> {
        let view = self.handle.view().await?;
        let p = &view.parameters;
        println!();
        println!("{} {} ({})", "Step:".bright_cyan(), view.step.number(), view.step);
        println!("  {:10} {}", "genre", p.genre);
        println!("  {:10} {}", "style", p.style_template);
        println!("  {:10} {}", "hero", or_unset(&p.hero));
        println!("  {:10} {}", "villain", or_unset(&p.villain));
        println!("  {:10} {}", "setting", or_unset(&p.setting));
        println!("  {:10} {}", "plot", or_unset(&p.plot_hook));
        println!("{} {}", "Generation:".bright_cyan(), describe_generation(&view.generation));
        println!(
            "{} {} revisions ({}), {} notes",
            "Document:".bright_cyan(),
            view.revisions.len(),
            view.history_order,
            view.notes.len()
        );
        println!();
        Ok(())
    }

    async fn print_step_hint(&self) -> Result<()> {
        let step = self.handle.view().await?.step;
        let hint = match step {
            WizardStep::ChoosingStyle => "Pick a genre and a writer style, then 'next'.",
            WizardStep::CollectingStoryElements => "Set hero, villain, setting and plot, then 'generate'.",
            WizardStep::Editing => "Edit, save, restore, note or critique the draft.",
        };
        println!("{} {}", format!("Step {}:", step.number()).bright_cyan(), hint);
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "DraftRoom AI Studio".bright_cyan().bold());
        println!("Create scripts with the style of legends.");
        println!("Type {} for help, {} to quit", "help".yellow(), "quit".yellow());
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Story:".bright_cyan());
        println!("  {:18} Set or list genres", "genre [name]".yellow());
        println!("  {:18} Set or list writer styles", "style [#|name]".yellow());
        println!("  {:18} Set the protagonist", "hero <text>".yellow());
        println!("  {:18} Set the antagonist", "villain <text>".yellow());
        println!("  {:18} Set the setting", "setting <text>".yellow());
        println!("  {:18} Set the plot hook", "plot <text>".yellow());
        println!("  {:18} Next / previous step", "next, back".yellow());
        println!("  {:18} Generate the opening scene", "generate".yellow());
        println!();
        println!("{}", "Draft:".bright_cyan());
        println!("  {:18} Show the working draft", "show".yellow());
        println!("  {:18} Replace the working draft", "edit".yellow());
        println!("  {:18} Save the draft as a new version", "save".yellow());
        println!("  {:18} List saved versions", "history".yellow());
        println!("  {:18} Restore a saved version", "restore <#|id>".yellow());
        println!("  {:18} Ask for a short critique", "critique".yellow());
        println!();
        println!("{}", "Collaboration:".bright_cyan());
        println!("  {:18} Post a note", "note <text>".yellow());
        println!("  {:18} List notes", "notes".yellow());
        println!("  {:18} Write the session as JSON", "export <path>".yellow());
        println!();
        println!("  {:18} Show parameters and progress", "status".yellow());
        println!("  {:18} Exit", "quit".yellow());
        println!();
    }
}

/// Print session errors inline; only channel failures end the REPL
fn report<T>(result: Result<T, SessionError>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(SessionError::ChannelError) => Err(eyre::eyre!("Session stopped unexpectedly")),
        Err(e) => {
            println!("{} {}", "!".red(), e);
            Ok(())
        }
    }
}

fn or_unset(value: &str) -> String {
    if value.trim().is_empty() {
        "(unset)".dimmed().to_string()
    } else {
        value.to_string()
    }
}

fn describe_generation(state: &GenerationState) -> String {
    match state {
        GenerationState::Failed { error, .. } => format!("{} ({})", state.label().red(), error),
        other => other.label().to_string(),
    }
}

/// Print the genre catalog
pub fn print_genres() {
    for genre in Genre::ALL {
        println!("  {}", genre);
    }
}

/// Print the style preset catalog, numbered from 1
pub fn print_styles() {
    for (i, template) in STYLE_TEMPLATES.iter().enumerate() {
        println!("  {}. {} {}", i + 1, template.name, format!("({})", template.traits).dimmed());
    }
}

fn print_document(content: &str) {
    println!();
    println!("{}", "─".repeat(60).dimmed());
    println!("{}", content);
    println!("{}", "─".repeat(60).dimmed());
    println!();
}

fn print_history(view: &SessionView) {
    if view.revisions.is_empty() {
        println!("{}", "No versions yet.".dimmed());
        return;
    }

    println!();
    println!("{} {}", "Version History".bright_cyan(), format!("({})", view.history_order).dimmed());
    for (i, rev) in view.revisions.iter().enumerate() {
        let current = if rev.content() == view.working_content {
            " *".bright_green().to_string()
        } else {
            String::new()
        };
        println!(
            "  {}. {} {} by {} {}{}",
            i + 1,
            rev.created_at().with_timezone(&chrono::Local).format("%H:%M:%S"),
            rev.summary().bright_white(),
            rev.author_name(),
            rev.id().dimmed(),
            current
        );
    }
    println!();
}

fn print_notes(view: &SessionView) {
    if view.notes.is_empty() {
        println!("{}", "No notes yet.".dimmed());
        return;
    }

    println!();
    for note in &view.notes {
        println!(
            "  {} {}",
            note.author_name().bright_white(),
            note.posted_at().with_timezone(&chrono::Local).format("%H:%M").to_string().dimmed()
        );
        println!("    {}", note.body());
    }
    println!();
}
