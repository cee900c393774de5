//! Wizard steps

use serde::{Deserialize, Serialize};

/// Where a drafting session is in the wizard
///
/// `ChoosingStyle → CollectingStoryElements → Editing`. The only way into
/// Editing is a completed generation; there is no terminal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    #[default]
    ChoosingStyle,
    CollectingStoryElements,
    Editing,
}

impl WizardStep {
    /// One-based position, as shown to the user
    pub fn number(&self) -> u8 {
        match self {
            Self::ChoosingStyle => 1,
            Self::CollectingStoryElements => 2,
            Self::Editing => 3,
        }
    }

    /// The step `back()` leads to, if any
    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            Self::ChoosingStyle => None,
            Self::CollectingStoryElements => Some(Self::ChoosingStyle),
            Self::Editing => Some(Self::CollectingStoryElements),
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChoosingStyle => write!(f, "choosing-style"),
            Self::CollectingStoryElements => write!(f, "collecting-story-elements"),
            Self::Editing => write!(f, "editing"),
        }
    }
}
