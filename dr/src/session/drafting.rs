//! DraftingSession - the top-level coordinator for one document

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{SessionError, SessionView, WizardStep};
use crate::config::Config;
use crate::domain::{
    GenerationParameters, Genre, Note, NoteThread, Participant, Revision, RevisionStore, StoreError,
};
use crate::generation::{
    GeneratedText, GenerationClient, GenerationError, GenerationPipeline, GenerationState, GenerationStatus,
    PendingGeneration,
};

use draftstore::{INITIAL_GENERATION_SUMMARY, MANUAL_EDIT_SUMMARY, generate_id};

/// Author recorded on generated revisions
pub const AI_AUTHOR: &str = "AI Assistant";

/// Critique text when no credential is configured
pub const CRITIQUE_UNAVAILABLE: &str = "AI Analysis Unavailable";

/// Critique text when the service call failed
pub const CRITIQUE_FAILED: &str = "Could not analyze script.";

/// Why a `generate()` call did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerateRejection {
    WrongStep,
    MissingHero,
    MissingPlotHook,
    AlreadyPending,
    /// An outcome arrived with no generation in flight
    NotDispatched,
}

impl std::fmt::Display for GenerateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongStep => write!(f, "generation starts from the story elements step"),
            Self::MissingHero => write!(f, "a hero is required"),
            Self::MissingPlotHook => write!(f, "a plot hook is required"),
            Self::AlreadyPending => write!(f, "a generation is already in progress"),
            Self::NotDispatched => write!(f, "no generation is in flight"),
        }
    }
}

/// Result of a `generate()` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// A revision was recorded; `status` says whether it holds generated or fallback text
    Completed {
        revision_id: String,
        status: GenerationStatus,
    },
    /// Nothing changed
    Rejected(GenerateRejection),
}

/// A restore awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingConfirmation {
    pub token: String,
    pub revision_id: String,
    pub revision_created_at: chrono::DateTime<chrono::Utc>,
    /// The working content is not captured by any revision
    pub discards_unsaved_changes: bool,
    pub warning: String,
}

/// Outcome of a critique request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Critique {
    pub text: String,
    /// True when `text` is a fallback rather than an analysis
    pub degraded: bool,
}

/// A critique request detached from the session
///
/// Holds its own copy of the content, so it can run while the session keeps
/// serving other operations.
pub struct CritiqueJob {
    client: GenerationClient,
    content: String,
}

impl CritiqueJob {
    pub async fn run(self) -> Critique {
        debug!(content_len = self.content.len(), "CritiqueJob::run: called");
        match self.client.critique(&self.content).await {
            Ok(text) => Critique { text, degraded: false },
            Err(GenerationError::MissingCredential { env_var }) => {
                debug!(%env_var, "CritiqueJob::run: missing credential");
                Critique {
                    text: CRITIQUE_UNAVAILABLE.to_string(),
                    degraded: true,
                }
            }
            Err(e) => {
                warn!(error = %e, "Critique failed");
                Critique {
                    text: CRITIQUE_FAILED.to_string(),
                    degraded: true,
                }
            }
        }
    }
}

/// One document's drafting workflow
///
/// Owns the parameters, wizard step, working content, revision history, note
/// thread and generation pipeline. Operations that are not allowed in the
/// current step return an error and change nothing.
pub struct DraftingSession {
    parameters: GenerationParameters,
    step: WizardStep,
    working_content: String,
    history: RevisionStore,
    notes: NoteThread,
    pipeline: GenerationPipeline,
    pending_restore: Option<PendingConfirmation>,
    participant: Participant,
}

impl DraftingSession {
    pub fn new(client: GenerationClient, config: &Config) -> Self {
        debug!(order = %config.history.order, participant = %config.participant.id, "DraftingSession::new: called");
        Self {
            parameters: GenerationParameters::default(),
            step: WizardStep::default(),
            working_content: String::new(),
            history: RevisionStore::new(config.history.order),
            notes: NoteThread::new(),
            pipeline: GenerationPipeline::new(client, &config.generation),
            pending_restore: None,
            participant: Participant::from(&config.participant),
        }
    }

    /// Build a session with the provider and credential from configuration
    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        debug!("DraftingSession::from_config: called");
        Ok(Self::new(GenerationClient::from_config(config)?, config))
    }

    // === Accessors ===

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn parameters(&self) -> &GenerationParameters {
        &self.parameters
    }

    pub fn working_content(&self) -> &str {
        &self.working_content
    }

    pub fn history(&self) -> &RevisionStore {
        &self.history
    }

    pub fn notes(&self) -> &NoteThread {
        &self.notes
    }

    pub fn generation_state(&self) -> &GenerationState {
        self.pipeline.state()
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    pub fn pending_restore(&self) -> Option<&PendingConfirmation> {
        self.pending_restore.as_ref()
    }

    // === Navigation ===

    /// ChoosingStyle → CollectingStoryElements
    ///
    /// Editing is only reachable through `generate()`.
    pub fn advance(&mut self) -> Result<WizardStep, SessionError> {
        debug!(step = %self.step, "DraftingSession::advance: called");
        self.ensure_not_pending()?;
        match self.step {
            WizardStep::ChoosingStyle => {
                self.step = WizardStep::CollectingStoryElements;
                info!(step = %self.step, "Wizard advanced");
                Ok(self.step)
            }
            WizardStep::CollectingStoryElements => Err(SessionError::GenerationRequired),
            WizardStep::Editing => Err(SessionError::InvalidStep {
                step: self.step,
                operation: "advance",
            }),
        }
    }

    /// Step back without discarding anything
    pub fn back(&mut self) -> Result<WizardStep, SessionError> {
        debug!(step = %self.step, "DraftingSession::back: called");
        self.ensure_not_pending()?;
        let previous = self.step.previous().ok_or(SessionError::InvalidStep {
            step: self.step,
            operation: "back",
        })?;
        if self.pending_restore.take().is_some() {
            debug!("DraftingSession::back: dropping pending restore");
        }
        self.step = previous;
        info!(step = %self.step, "Wizard stepped back");
        Ok(self.step)
    }

    // === Parameters ===

    pub fn set_genre(&mut self, genre: Genre) -> Result<(), SessionError> {
        debug!(%genre, "DraftingSession::set_genre: called");
        self.ensure_not_pending()?;
        self.parameters.genre = genre;
        Ok(())
    }

    pub fn set_style_template(&mut self, style: impl Into<String>) -> Result<(), SessionError> {
        debug!("DraftingSession::set_style_template: called");
        self.ensure_not_pending()?;
        self.parameters.style_template = style.into();
        Ok(())
    }

    pub fn set_hero(&mut self, hero: impl Into<String>) -> Result<(), SessionError> {
        debug!("DraftingSession::set_hero: called");
        self.ensure_not_pending()?;
        self.parameters.hero = hero.into();
        Ok(())
    }

    pub fn set_villain(&mut self, villain: impl Into<String>) -> Result<(), SessionError> {
        debug!("DraftingSession::set_villain: called");
        self.ensure_not_pending()?;
        self.parameters.villain = villain.into();
        Ok(())
    }

    pub fn set_plot_hook(&mut self, plot_hook: impl Into<String>) -> Result<(), SessionError> {
        debug!("DraftingSession::set_plot_hook: called");
        self.ensure_not_pending()?;
        self.parameters.plot_hook = plot_hook.into();
        Ok(())
    }

    pub fn set_setting(&mut self, setting: impl Into<String>) -> Result<(), SessionError> {
        debug!("DraftingSession::set_setting: called");
        self.ensure_not_pending()?;
        self.parameters.setting = setting.into();
        Ok(())
    }

    /// Replace every parameter at once
    pub fn set_parameters(&mut self, params: GenerationParameters) -> Result<(), SessionError> {
        debug!("DraftingSession::set_parameters: called");
        self.ensure_not_pending()?;
        self.parameters = params;
        Ok(())
    }

    // === Generation ===

    /// Generate an opening scene and move to Editing
    ///
    /// Failures still complete: the fallback text becomes the working content
    /// and is recorded like any other generation.
    pub async fn generate(&mut self) -> GenerateOutcome {
        debug!("DraftingSession::generate: called");
        match self.begin_generate() {
            Ok(pending) => {
                let outcome = pending.run().await;
                self.finish_generate(outcome)
            }
            Err(rejection) => GenerateOutcome::Rejected(rejection),
        }
    }

    /// First half of `generate()`: validate and dispatch
    ///
    /// On rejection nothing changes.
    pub fn begin_generate(&mut self) -> Result<PendingGeneration, GenerateRejection> {
        debug!(step = %self.step, state = %self.pipeline.state(), "DraftingSession::begin_generate: called");
        if self.pipeline.is_pending() {
            debug!("DraftingSession::begin_generate: already pending");
            return Err(GenerateRejection::AlreadyPending);
        }
        if self.step != WizardStep::CollectingStoryElements {
            debug!("DraftingSession::begin_generate: wrong step");
            return Err(GenerateRejection::WrongStep);
        }
        if !self.parameters.has_hero() {
            debug!("DraftingSession::begin_generate: missing hero");
            return Err(GenerateRejection::MissingHero);
        }
        if !self.parameters.has_plot_hook() {
            debug!("DraftingSession::begin_generate: missing plot hook");
            return Err(GenerateRejection::MissingPlotHook);
        }

        self.pipeline
            .dispatch(&self.parameters)
            .ok_or(GenerateRejection::AlreadyPending)
    }

    /// Second half of `generate()`: record the outcome
    ///
    /// Only an outcome for the pending generation is recorded; anything else
    /// is rejected and changes nothing.
    pub(crate) fn finish_generate(&mut self, outcome: Result<String, GenerationError>) -> GenerateOutcome {
        debug!(ok = outcome.is_ok(), "DraftingSession::finish_generate: called");
        if !self.pipeline.is_pending() {
            warn!(state = %self.pipeline.state(), "Generation outcome arrived with nothing in flight");
            return GenerateOutcome::Rejected(GenerateRejection::NotDispatched);
        }
        let GeneratedText { content, status } = self.pipeline.resolve(outcome);

        self.working_content = content;
        let revision_id = self
            .history
            .append(self.working_content.clone(), INITIAL_GENERATION_SUMMARY, AI_AUTHOR)
            .id()
            .to_string();
        self.step = WizardStep::Editing;
        info!(%revision_id, ?status, revisions = self.history.len(), "Generation recorded, now editing");

        GenerateOutcome::Completed { revision_id, status }
    }

    /// Detach a critique of the working content
    pub fn critique_job(&self) -> Result<CritiqueJob, SessionError> {
        debug!(step = %self.step, "DraftingSession::critique_job: called");
        self.ensure_step(WizardStep::Editing, "critique")?;
        Ok(CritiqueJob {
            client: self.pipeline.client().clone(),
            content: self.working_content.clone(),
        })
    }

    /// Critique the working content; history and generation state are untouched
    pub async fn critique(&self) -> Result<Critique, SessionError> {
        debug!("DraftingSession::critique: called");
        Ok(self.critique_job()?.run().await)
    }

    // === Editing ===

    /// Replace the working content without recording a revision
    pub fn edit_working_content(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        debug!("DraftingSession::edit_working_content: called");
        self.ensure_step(WizardStep::Editing, "edit")?;
        self.working_content = text.into();
        Ok(())
    }

    /// Snapshot the working content as a "Manual Edit" revision
    pub fn save_version(&mut self) -> Result<String, SessionError> {
        debug!("DraftingSession::save_version: called");
        self.ensure_step(WizardStep::Editing, "save")?;
        let revision_id = self
            .history
            .append(self.working_content.clone(), MANUAL_EDIT_SUMMARY, self.participant.name.clone())
            .id()
            .to_string();
        info!(%revision_id, author = %self.participant.name, "Version saved");
        Ok(revision_id)
    }

    // === Restore ===

    /// First phase of a restore: describe what confirming would do
    ///
    /// Replaces any earlier request.
    pub fn request_restore(&mut self, revision_id: &str) -> Result<PendingConfirmation, SessionError> {
        debug!(%revision_id, "DraftingSession::request_restore: called");
        self.ensure_step(WizardStep::Editing, "restore")?;
        let revision = self
            .history
            .get(revision_id)
            .ok_or_else(|| StoreError::RevisionNotFound(revision_id.to_string()))?;

        let discards_unsaved_changes = !self
            .history
            .list()
            .iter()
            .any(|r| r.content() == self.working_content);
        let when = revision.created_at().format("%H:%M:%S");
        let warning = if discards_unsaved_changes {
            format!("Restore version from {}? Current changes will be unsaved.", when)
        } else {
            format!("Restore version from {}?", when)
        };

        let confirmation = PendingConfirmation {
            token: generate_id("confirm"),
            revision_id: revision.id().to_string(),
            revision_created_at: revision.created_at(),
            discards_unsaved_changes,
            warning,
        };
        debug!(token = %confirmation.token, %discards_unsaved_changes, "DraftingSession::request_restore: awaiting confirmation");
        self.pending_restore = Some(confirmation.clone());
        Ok(confirmation)
    }

    /// Second phase of a restore: adopt the revision's content
    ///
    /// Returns the restored revision's ID. History is never changed.
    pub fn confirm_restore(&mut self, token: &str) -> Result<String, SessionError> {
        debug!(%token, "DraftingSession::confirm_restore: called");
        self.ensure_step(WizardStep::Editing, "restore")?;
        let pending = match self.pending_restore.take() {
            Some(p) if p.token == token => p,
            other => {
                debug!("DraftingSession::confirm_restore: token does not match");
                self.pending_restore = other;
                return Err(SessionError::UnknownConfirmation(token.to_string()));
            }
        };

        let content = self.history.restore(&pending.revision_id)?;
        self.working_content = content.to_string();
        info!(revision_id = %pending.revision_id, "Revision restored");
        Ok(pending.revision_id)
    }

    /// Drop a pending restore; returns whether there was one
    pub fn cancel_restore(&mut self) -> bool {
        debug!("DraftingSession::cancel_restore: called");
        self.pending_restore.take().is_some()
    }

    // === Notes ===

    /// Post a note as the configured participant
    pub fn post_note(&mut self, body: impl Into<String>) -> Result<Note, SessionError> {
        debug!(author = %self.participant.id, "DraftingSession::post_note: called");
        let note = self.notes.post(
            self.participant.id.clone(),
            self.participant.name.clone(),
            self.participant.avatar.clone(),
            body,
        )?;
        info!(note_id = %note.id(), "Note posted");
        Ok(note.clone())
    }

    // === Read model ===

    pub fn view(&self) -> SessionView {
        SessionView {
            step: self.step,
            parameters: self.parameters.clone(),
            working_content: self.working_content.clone(),
            history_order: self.history.order(),
            revisions: self.history.list().to_vec(),
            notes: self.notes.list().to_vec(),
            generation: self.pipeline.state().clone(),
        }
    }

    /// Revision at a one-based position in presentation order
    pub fn revision_at(&self, position: usize) -> Option<&Revision> {
        position.checked_sub(1).and_then(|i| self.history.list().get(i))
    }

    fn ensure_not_pending(&self) -> Result<(), SessionError> {
        if self.pipeline.is_pending() {
            debug!("DraftingSession: generation pending, rejecting");
            return Err(SessionError::GenerationPending);
        }
        Ok(())
    }

    fn ensure_step(&self, expected: WizardStep, operation: &'static str) -> Result<(), SessionError> {
        if self.step != expected {
            debug!(step = %self.step, %operation, "DraftingSession: wrong step");
            return Err(SessionError::InvalidStep {
                step: self.step,
                operation,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParticipantConfig;
    use crate::domain::HistoryOrder;
    use crate::generation::SERVICE_ERROR_FALLBACK;
    use crate::llm::LlmError;
    use crate::llm::client::mock::MockLlmClient;
    use crate::prompts::PromptLoader;
    use std::sync::Arc;

    fn config() -> Config {
        let mut config = Config::default();
        config.participant = ParticipantConfig {
            id: "u1".to_string(),
            name: "Alex Director".to_string(),
            avatar: None,
        };
        config
    }

    fn session_with(mock: MockLlmClient, config: &Config) -> (DraftingSession, Arc<MockLlmClient>) {
        let mock = Arc::new(mock);
        let client = GenerationClient::new(Some(mock.clone()), "TEST_API_KEY", PromptLoader::embedded_only(), 512);
        (DraftingSession::new(client, config), mock)
    }

    fn session(texts: &[&str]) -> DraftingSession {
        session_with(MockLlmClient::with_texts(texts.iter().copied()), &config()).0
    }

    fn ready(session: &mut DraftingSession) {
        session.set_genre(Genre::Drama).unwrap();
        session.set_style_template("Sorkin").unwrap();
        session.advance().unwrap();
        session.set_hero("A retired hitman").unwrap();
        session.set_plot_hook("one last job").unwrap();
        session.set_setting("NYC").unwrap();
    }

    async fn editing(texts: &[&str]) -> DraftingSession {
        let mut s = session(texts);
        ready(&mut s);
        assert!(matches!(s.generate().await, GenerateOutcome::Completed { .. }));
        s
    }

    #[test]
    fn test_initial_state() {
        let s = session(&[]);
        assert_eq!(s.step(), WizardStep::ChoosingStyle);
        assert_eq!(s.generation_state(), &GenerationState::Idle);
        assert!(s.history().is_empty());
        assert!(s.notes().is_empty());
        assert_eq!(s.working_content(), "");
    }

    #[test]
    fn test_navigation() {
        let mut s = session(&[]);
        assert!(matches!(s.back(), Err(SessionError::InvalidStep { .. })));
        assert_eq!(s.advance().unwrap(), WizardStep::CollectingStoryElements);
        assert_eq!(s.advance(), Err(SessionError::GenerationRequired));
        assert_eq!(s.back().unwrap(), WizardStep::ChoosingStyle);
    }

    #[test]
    fn test_back_keeps_parameters() {
        let mut s = session(&[]);
        ready(&mut s);
        s.back().unwrap();
        assert_eq!(s.parameters().hero, "A retired hitman");
        assert_eq!(s.parameters().setting, "NYC");
    }

    #[tokio::test]
    async fn test_generate_rejections_are_noops() {
        let mut s = session(&["never used"]);
        assert_eq!(
            s.generate().await,
            GenerateOutcome::Rejected(GenerateRejection::WrongStep)
        );

        s.advance().unwrap();
        assert_eq!(
            s.generate().await,
            GenerateOutcome::Rejected(GenerateRejection::MissingHero)
        );

        s.set_hero("A retired hitman").unwrap();
        s.set_plot_hook("   ").unwrap();
        assert_eq!(
            s.generate().await,
            GenerateOutcome::Rejected(GenerateRejection::MissingPlotHook)
        );

        assert!(s.history().is_empty());
        assert_eq!(s.step(), WizardStep::CollectingStoryElements);
        assert_eq!(s.generation_state(), &GenerationState::Idle);
    }

    #[tokio::test]
    async fn test_retired_hitman_scenario() {
        let mut s = session(&["INT. DINER - NIGHT\n\nA retired hitman sips coffee."]);
        ready(&mut s);

        let outcome = s.generate().await;
        let GenerateOutcome::Completed { revision_id, status } = outcome else {
            panic!("Expected Completed, got {:?}", outcome);
        };
        assert_eq!(status, GenerationStatus::Succeeded);
        assert_eq!(s.step(), WizardStep::Editing);
        assert_eq!(s.history().len(), 1);

        let first = &s.history().list()[0];
        assert_eq!(first.id(), revision_id);
        assert_eq!(first.summary(), "Initial Generation");
        assert_eq!(first.author_name(), "AI Assistant");
        assert_eq!(first.content(), s.working_content());
        let generated = s.working_content().to_string();

        s.edit_working_content("INT. DINER - NIGHT\n\nHe puts the gun on the table.")
            .unwrap();
        assert_eq!(s.history().len(), 1);

        let saved = s.save_version().unwrap();
        assert_eq!(s.history().len(), 2);
        let latest = &s.history().list()[0];
        assert_eq!(latest.id(), saved);
        assert_eq!(latest.summary(), "Manual Edit");
        assert_eq!(latest.author_name(), "Alex Director");

        let founding_id = s.history().list()[1].id().to_string();
        let confirmation = s.request_restore(&founding_id).unwrap();
        assert!(!confirmation.discards_unsaved_changes);
        assert_eq!(s.confirm_restore(&confirmation.token).unwrap(), founding_id);

        assert_eq!(s.working_content(), generated);
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.history().list()[0].id(), saved);
    }

    #[tokio::test]
    async fn test_missing_credential_degrades() {
        let client = GenerationClient::new(None, "GEMINI_API_KEY", PromptLoader::embedded_only(), 512);
        let mut s = DraftingSession::new(client, &config());
        ready(&mut s);

        let outcome = s.generate().await;
        assert!(matches!(
            outcome,
            GenerateOutcome::Completed {
                status: GenerationStatus::Failed,
                ..
            }
        ));
        assert!(matches!(s.generation_state(), GenerationState::Failed { .. }));
        assert!(s.working_content().contains("GEMINI_API_KEY"));
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.step(), WizardStep::Editing);
    }

    #[tokio::test]
    async fn test_service_error_degrades() {
        let (mut s, _) = session_with(
            MockLlmClient::new(vec![Err(LlmError::Malformed("garbage".to_string()))]),
            &config(),
        );
        ready(&mut s);
        s.generate().await;
        assert_eq!(s.working_content(), SERVICE_ERROR_FALLBACK);
    }

    #[test]
    fn test_second_generate_while_pending_is_noop() {
        let mut s = session(&["scene"]);
        ready(&mut s);

        let pending = s.begin_generate();
        assert!(pending.is_ok());
        assert!(s.generation_state().is_pending());

        assert!(matches!(s.begin_generate(), Err(GenerateRejection::AlreadyPending)));
        assert!(s.generation_state().is_pending());
        assert!(s.history().is_empty());
    }

    #[tokio::test]
    async fn test_finish_without_dispatch_is_noop() {
        let mut s = session(&["scene"]);
        ready(&mut s);

        let outcome = s.finish_generate(Ok("stray".to_string()));
        assert_eq!(outcome, GenerateOutcome::Rejected(GenerateRejection::NotDispatched));
        assert!(s.history().is_empty());
        assert_eq!(s.step(), WizardStep::CollectingStoryElements);
        assert_eq!(s.working_content(), "");

        assert!(matches!(s.generate().await, GenerateOutcome::Completed { .. }));
        let outcome = s.finish_generate(Ok("late duplicate".to_string()));
        assert_eq!(outcome, GenerateOutcome::Rejected(GenerateRejection::NotDispatched));
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.working_content(), "scene");
    }

    #[test]
    fn test_setters_rejected_while_pending() {
        let mut s = session(&["scene"]);
        ready(&mut s);
        let _pending = s.begin_generate().unwrap();

        assert_eq!(s.set_hero("someone else"), Err(SessionError::GenerationPending));
        assert_eq!(s.set_genre(Genre::Horror), Err(SessionError::GenerationPending));
        assert_eq!(s.back(), Err(SessionError::GenerationPending));
        assert_eq!(s.parameters().hero, "A retired hitman");

        // Notes are not blocked by a generation
        assert!(s.post_note("while we wait").is_ok());
    }

    #[tokio::test]
    async fn test_editing_operations_require_editing() {
        let mut s = session(&[]);
        assert!(matches!(
            s.edit_working_content("x"),
            Err(SessionError::InvalidStep { .. })
        ));
        assert!(matches!(s.save_version(), Err(SessionError::InvalidStep { .. })));
        assert!(matches!(s.request_restore("rev-x"), Err(SessionError::InvalidStep { .. })));
        assert!(matches!(s.critique().await, Err(SessionError::InvalidStep { .. })));
        assert!(s.history().is_empty());
    }

    #[tokio::test]
    async fn test_advance_from_editing_is_invalid() {
        let mut s = editing(&["scene"]).await;
        assert!(matches!(s.advance(), Err(SessionError::InvalidStep { .. })));
        assert_eq!(s.step(), WizardStep::Editing);
    }

    #[tokio::test]
    async fn test_regenerate_after_back_appends() {
        let mut s = editing(&["first", "second"]).await;
        s.back().unwrap();
        s.set_hero("A rookie cop").unwrap();

        assert!(matches!(s.generate().await, GenerateOutcome::Completed { .. }));
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.working_content(), "second");
        assert_eq!(s.history().list()[0].summary(), "Initial Generation");
        assert_eq!(s.history().founding().unwrap().content(), "first");
    }

    #[tokio::test]
    async fn test_restore_unknown_revision_leaves_state() {
        let mut s = editing(&["scene"]).await;
        s.edit_working_content("changed").unwrap();

        let err = s.request_restore("rev-missing").unwrap_err();
        assert_eq!(
            err,
            SessionError::Store(StoreError::RevisionNotFound("rev-missing".to_string()))
        );
        assert_eq!(s.working_content(), "changed");
        assert!(s.pending_restore().is_none());
    }

    #[tokio::test]
    async fn test_restore_warns_about_unsaved_changes() {
        let mut s = editing(&["scene"]).await;
        s.edit_working_content("unsaved work").unwrap();

        let id = s.history().list()[0].id().to_string();
        let confirmation = s.request_restore(&id).unwrap();
        assert!(confirmation.discards_unsaved_changes);
        assert!(confirmation.warning.contains("Current changes will be unsaved"));
    }

    #[tokio::test]
    async fn test_restore_stale_and_cancelled_tokens() {
        let mut s = editing(&["scene"]).await;
        s.edit_working_content("draft two").unwrap();
        let id = s.history().list()[0].id().to_string();

        let first = s.request_restore(&id).unwrap();
        let second = s.request_restore(&id).unwrap();
        assert_ne!(first.token, second.token);

        assert!(matches!(
            s.confirm_restore(&first.token),
            Err(SessionError::UnknownConfirmation(_))
        ));
        assert_eq!(s.working_content(), "draft two");
        // The newer request survives a stale confirmation
        assert_eq!(s.pending_restore(), Some(&second));

        assert!(s.cancel_restore());
        assert!(matches!(
            s.confirm_restore(&second.token),
            Err(SessionError::UnknownConfirmation(_))
        ));
        assert_eq!(s.working_content(), "draft two");
        assert!(!s.cancel_restore());
    }

    #[tokio::test]
    async fn test_back_drops_pending_restore() {
        let mut s = editing(&["scene"]).await;
        let id = s.history().list()[0].id().to_string();
        s.request_restore(&id).unwrap();
        s.back().unwrap();
        assert!(s.pending_restore().is_none());
    }

    #[test]
    fn test_post_note_uses_participant() {
        let mut s = session(&[]);
        let note = s.post_note("Can we make the opening more intense?").unwrap();
        assert_eq!(note.author_id(), "u1");
        assert_eq!(note.author_name(), "Alex Director");
        assert_eq!(s.notes().len(), 1);

        assert_eq!(s.post_note("  "), Err(SessionError::Store(StoreError::EmptyBody)));
        assert_eq!(s.notes().len(), 1);
    }

    #[tokio::test]
    async fn test_critique() {
        let s = editing(&["scene", "- strong hook\n- slow middle\n- clean format"]).await;
        let critique = s.critique().await.unwrap();
        assert!(!critique.degraded);
        assert!(critique.text.contains("strong hook"));
        assert_eq!(s.history().len(), 1);
        assert!(matches!(s.generation_state(), GenerationState::Succeeded { .. }));

        // Mock is exhausted now
        let critique = s.critique().await.unwrap();
        assert!(critique.degraded);
        assert_eq!(critique.text, CRITIQUE_FAILED);
    }

    #[tokio::test]
    async fn test_critique_without_credential() {
        let client = GenerationClient::new(None, "GEMINI_API_KEY", PromptLoader::embedded_only(), 512);
        let mut s = DraftingSession::new(client, &config());
        ready(&mut s);
        s.generate().await;

        let critique = s.critique().await.unwrap();
        assert!(critique.degraded);
        assert_eq!(critique.text, CRITIQUE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_chronological_order() {
        let mut config = config();
        config.history.order = HistoryOrder::Chronological;
        let (mut s, _) = session_with(MockLlmClient::with_texts(["scene"]), &config);
        ready(&mut s);
        s.generate().await;
        let saved = s.save_version().unwrap();

        assert_eq!(s.history().list()[0].summary(), "Initial Generation");
        assert_eq!(s.history().list()[1].id(), saved);
        assert_eq!(s.view().history_order, HistoryOrder::Chronological);
    }

    #[tokio::test]
    async fn test_view_reflects_session() {
        let mut s = editing(&["scene"]).await;
        s.post_note("looks good").unwrap();

        let view = s.view();
        assert_eq!(view.step, WizardStep::Editing);
        assert_eq!(view.working_content, "scene");
        assert_eq!(view.revisions.len(), 1);
        assert_eq!(view.notes.len(), 1);
        assert_eq!(view.revision_at(1).map(Revision::id), s.revision_at(1).map(Revision::id));
        assert!(view.revision_at(0).is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["step"], "editing");
        assert_eq!(json["generation"]["status"], "succeeded");
    }
}
