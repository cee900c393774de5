//! Prompt Loader
//!
//! Loads prompt templates from an override directory or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;
use crate::domain::GenerationParameters;

/// Context for the `scene` template
#[derive(Debug, Clone, Serialize)]
pub struct SceneContext {
    pub style: String,
    pub genre: String,
    pub setting: String,
    pub hero: String,
    pub villain: String,
    pub plot_hook: String,
}

impl From<&GenerationParameters> for SceneContext {
    fn from(params: &GenerationParameters) -> Self {
        Self {
            style: params.style_template.clone(),
            genre: params.genre.to_string(),
            setting: params.setting.clone(),
            hero: params.hero.clone(),
            villain: params.villain.clone(),
            plot_hook: params.plot_hook.clone(),
        }
    }
}

/// Context for the `critique` template
#[derive(Debug, Clone, Serialize)]
pub struct CritiqueContext {
    pub excerpt: String,
}

impl CritiqueContext {
    /// Excerpt of at most `max_chars` characters, with "..." appended when cut
    pub fn new(content: &str, max_chars: usize) -> Self {
        debug!(content_len = content.len(), %max_chars, "CritiqueContext::new: called");
        let excerpt = match content.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &content[..cut]),
            None => content.to_string(),
        };
        Self { excerpt }
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// Override directory searched before the embedded templates
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `dir` before the embedded templates
    pub fn new(dir: Option<&Path>) -> Self {
        debug!(?dir, "PromptLoader::new: called");
        let override_dir = dir.filter(|d| d.exists()).map(Path::to_path_buf);
        if dir.is_some() && override_dir.is_none() {
            debug!("PromptLoader::new: override directory missing, using embedded prompts");
        }

        Self {
            hbs: Self::engine(),
            override_dir,
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text; HTML escaping would mangle apostrophes and ampersands
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Override: `{dir}/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            } else {
                debug!(?path, "PromptLoader::load_template: no override");
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        info!("Rendering template '{}'", template_name);

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// Render the opening-scene instruction for the given parameters
    pub fn scene_prompt(&self, params: &GenerationParameters) -> Result<String> {
        self.render("scene", &SceneContext::from(params))
    }

    /// Render the critique instruction for the given document
    pub fn critique_prompt(&self, content: &str, max_chars: usize) -> Result<String> {
        self.render("critique", &CritiqueContext::new(content, max_chars))
    }
}
