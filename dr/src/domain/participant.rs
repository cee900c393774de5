//! Participant identity

use serde::Serialize;

use crate::config::ParticipantConfig;

/// The person acting on a drafting session
///
/// Identity is configured, not authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

impl From<&ParticipantConfig> for Participant {
    fn from(config: &ParticipantConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            avatar: config.avatar.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = ParticipantConfig {
            id: "u2".to_string(),
            name: "Sarah Producer".to_string(),
            avatar: Some("avatars/u2.png".to_string()),
        };
        let participant = Participant::from(&config);
        assert_eq!(participant, Participant::new("u2", "Sarah Producer").with_avatar("avatars/u2.png"));
    }
}
