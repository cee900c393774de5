//! SessionHandle - actor that owns a DraftingSession
//!
//! Every mutation goes through one task, so concurrent callers can never
//! interleave an append, a post or a restore. A generation in flight runs on
//! its own task and reports back through the same channel; meanwhile the actor
//! keeps serving notes and reads.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{
    Critique, DraftingSession, GenerateOutcome, PendingConfirmation, SessionCommand, SessionError, SessionResponse,
    SessionView, WizardStep,
};
use crate::domain::{GenerationParameters, Genre, Note};
use crate::generation::GenerationError;

/// Handle to send commands to the session actor
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Spawn the actor; it runs until `shutdown()` or until every handle is dropped
    pub fn spawn(session: DraftingSession) -> Self {
        debug!(step = %session.step(), "SessionHandle::spawn: called");
        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(actor_loop(session, rx, tx.downgrade()));
        info!("Session actor spawned");
        Self { tx }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand) -> SessionResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(command(reply_tx))
            .await
            .map_err(|_| SessionError::ChannelError)?;
        reply_rx.await.map_err(|_| SessionError::ChannelError)
    }

    // === Navigation ===

    pub async fn advance(&self) -> SessionResponse<WizardStep> {
        debug!("SessionHandle::advance: called");
        self.request(|reply| SessionCommand::Advance { reply }).await?
    }

    pub async fn back(&self) -> SessionResponse<WizardStep> {
        debug!("SessionHandle::back: called");
        self.request(|reply| SessionCommand::Back { reply }).await?
    }

    // === Parameters ===

    pub async fn set_genre(&self, genre: Genre) -> SessionResponse<()> {
        debug!(%genre, "SessionHandle::set_genre: called");
        self.request(|reply| SessionCommand::SetGenre { genre, reply }).await?
    }

    pub async fn set_style_template(&self, style: impl Into<String>) -> SessionResponse<()> {
        debug!("SessionHandle::set_style_template: called");
        let style = style.into();
        self.request(|reply| SessionCommand::SetStyleTemplate { style, reply })
            .await?
    }

    pub async fn set_hero(&self, hero: impl Into<String>) -> SessionResponse<()> {
        debug!("SessionHandle::set_hero: called");
        let hero = hero.into();
        self.request(|reply| SessionCommand::SetHero { hero, reply }).await?
    }

    pub async fn set_villain(&self, villain: impl Into<String>) -> SessionResponse<()> {
        debug!("SessionHandle::set_villain: called");
        let villain = villain.into();
        self.request(|reply| SessionCommand::SetVillain { villain, reply }).await?
    }

    pub async fn set_plot_hook(&self, plot_hook: impl Into<String>) -> SessionResponse<()> {
        debug!("SessionHandle::set_plot_hook: called");
        let plot_hook = plot_hook.into();
        self.request(|reply| SessionCommand::SetPlotHook { plot_hook, reply })
            .await?
    }

    pub async fn set_setting(&self, setting: impl Into<String>) -> SessionResponse<()> {
        debug!("SessionHandle::set_setting: called");
        let setting = setting.into();
        self.request(|reply| SessionCommand::SetSetting { setting, reply }).await?
    }

    pub async fn set_parameters(&self, params: GenerationParameters) -> SessionResponse<()> {
        debug!("SessionHandle::set_parameters: called");
        self.request(|reply| SessionCommand::SetParameters { params, reply })
            .await?
    }

    // === Generation ===

    /// Generate and wait for the outcome
    ///
    /// A call made while another generation is in flight returns
    /// `Rejected(AlreadyPending)` immediately.
    pub async fn generate(&self) -> SessionResponse<GenerateOutcome> {
        debug!("SessionHandle::generate: called");
        self.request(|reply| SessionCommand::Generate { reply }).await
    }

    pub async fn critique(&self) -> SessionResponse<Critique> {
        debug!("SessionHandle::critique: called");
        self.request(|reply| SessionCommand::Critique { reply }).await?
    }

    // === Editing ===

    pub async fn edit_working_content(&self, text: impl Into<String>) -> SessionResponse<()> {
        debug!("SessionHandle::edit_working_content: called");
        let text = text.into();
        self.request(|reply| SessionCommand::EditWorkingContent { text, reply })
            .await?
    }

    pub async fn save_version(&self) -> SessionResponse<String> {
        debug!("SessionHandle::save_version: called");
        self.request(|reply| SessionCommand::SaveVersion { reply }).await?
    }

    // === Restore ===

    pub async fn request_restore(&self, revision_id: &str) -> SessionResponse<PendingConfirmation> {
        debug!(%revision_id, "SessionHandle::request_restore: called");
        let revision_id = revision_id.to_string();
        self.request(|reply| SessionCommand::RequestRestore { revision_id, reply })
            .await?
    }

    pub async fn confirm_restore(&self, token: &str) -> SessionResponse<String> {
        debug!(%token, "SessionHandle::confirm_restore: called");
        let token = token.to_string();
        self.request(|reply| SessionCommand::ConfirmRestore { token, reply })
            .await?
    }

    pub async fn cancel_restore(&self) -> SessionResponse<bool> {
        debug!("SessionHandle::cancel_restore: called");
        self.request(|reply| SessionCommand::CancelRestore { reply }).await
    }

    // === Notes ===

    pub async fn post_note(&self, body: impl Into<String>) -> SessionResponse<Note> {
        debug!("SessionHandle::post_note: called");
        let body = body.into();
        self.request(|reply| SessionCommand::PostNote { body, reply }).await?
    }

    // === Read model ===

    pub async fn view(&self) -> SessionResponse<SessionView> {
        debug!("SessionHandle::view: called");
        self.request(|reply| SessionCommand::View { reply }).await
    }

    /// Stop the actor; later calls fail with `ChannelError`
    pub async fn shutdown(&self) -> SessionResponse<()> {
        debug!("SessionHandle::shutdown: called");
        self.tx
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| SessionError::ChannelError)
    }
}

async fn actor_loop(
    mut session: DraftingSession,
    mut rx: mpsc::Receiver<SessionCommand>,
    self_tx: mpsc::WeakSender<SessionCommand>,
) {
    debug!("actor_loop: called");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            SessionCommand::Advance { reply } => {
                debug!("actor_loop: Advance command");
                let _ = reply.send(session.advance());
            }

            SessionCommand::Back { reply } => {
                debug!("actor_loop: Back command");
                let _ = reply.send(session.back());
            }

            SessionCommand::SetGenre { genre, reply } => {
                debug!(%genre, "actor_loop: SetGenre command");
                let _ = reply.send(session.set_genre(genre));
            }

            SessionCommand::SetStyleTemplate { style, reply } => {
                debug!("actor_loop: SetStyleTemplate command");
                let _ = reply.send(session.set_style_template(style));
            }

            SessionCommand::SetHero { hero, reply } => {
                debug!("actor_loop: SetHero command");
                let _ = reply.send(session.set_hero(hero));
            }

            SessionCommand::SetVillain { villain, reply } => {
                debug!("actor_loop: SetVillain command");
                let _ = reply.send(session.set_villain(villain));
            }

            SessionCommand::SetPlotHook { plot_hook, reply } => {
                debug!("actor_loop: SetPlotHook command");
                let _ = reply.send(session.set_plot_hook(plot_hook));
            }

            SessionCommand::SetSetting { setting, reply } => {
                debug!("actor_loop: SetSetting command");
                let _ = reply.send(session.set_setting(setting));
            }

            SessionCommand::SetParameters { params, reply } => {
                debug!("actor_loop: SetParameters command");
                let _ = reply.send(session.set_parameters(params));
            }

            SessionCommand::Generate { reply } => {
                debug!("actor_loop: Generate command");
                match session.begin_generate() {
                    Ok(pending) => match self_tx.upgrade() {
                        Some(tx) => {
                            debug!("actor_loop: Generate spawning generation task");
                            tokio::spawn(async move {
                                // A panicking generation still has to resolve Pending
                                let outcome = match tokio::spawn(pending.run()).await {
                                    Ok(outcome) => outcome,
                                    Err(e) => {
                                        warn!(error = %e, "Generation task died before reporting");
                                        Err(GenerationError::Interrupted(e.to_string()))
                                    }
                                };
                                if tx
                                    .send(SessionCommand::GenerationFinished { outcome, reply })
                                    .await
                                    .is_err()
                                {
                                    debug!("generation task: session actor gone");
                                }
                            });
                        }
                        None => {
                            debug!("actor_loop: Generate no live handles, running inline");
                            let outcome = pending.run().await;
                            let _ = reply.send(session.finish_generate(outcome));
                        }
                    },
                    Err(rejection) => {
                        debug!(%rejection, "actor_loop: Generate rejected");
                        let _ = reply.send(GenerateOutcome::Rejected(rejection));
                    }
                }
            }

            SessionCommand::GenerationFinished { outcome, reply } => {
                debug!(ok = outcome.is_ok(), "actor_loop: GenerationFinished command");
                let _ = reply.send(session.finish_generate(outcome));
            }

            SessionCommand::Critique { reply } => {
                debug!("actor_loop: Critique command");
                match session.critique_job() {
                    Ok(job) => {
                        tokio::spawn(async move {
                            let _ = reply.send(Ok(job.run().await));
                        });
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            SessionCommand::EditWorkingContent { text, reply } => {
                debug!("actor_loop: EditWorkingContent command");
                let _ = reply.send(session.edit_working_content(text));
            }

            SessionCommand::SaveVersion { reply } => {
                debug!("actor_loop: SaveVersion command");
                let _ = reply.send(session.save_version());
            }

            SessionCommand::RequestRestore { revision_id, reply } => {
                debug!(%revision_id, "actor_loop: RequestRestore command");
                let _ = reply.send(session.request_restore(&revision_id));
            }

            SessionCommand::ConfirmRestore { token, reply } => {
                debug!(%token, "actor_loop: ConfirmRestore command");
                let _ = reply.send(session.confirm_restore(&token));
            }

            SessionCommand::CancelRestore { reply } => {
                debug!("actor_loop: CancelRestore command");
                let _ = reply.send(session.cancel_restore());
            }

            SessionCommand::PostNote { body, reply } => {
                debug!("actor_loop: PostNote command");
                let _ = reply.send(session.post_note(body));
            }

            SessionCommand::View { reply } => {
                debug!("actor_loop: View command");
                let _ = reply.send(session.view());
            }

            SessionCommand::Shutdown => {
                debug!("actor_loop: Shutdown command");
                info!("Session actor shutting down");
                break;
            }
        }
    }

    debug!("Session actor stopped");
}
