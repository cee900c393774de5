//! Story parameters for a generation request

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Script genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Comedy,
    #[default]
    Drama,
    Horror,
    #[serde(rename = "Sci-Fi")]
    SciFi,
    Thriller,
    Romance,
}

impl Genre {
    pub const ALL: [Genre; 7] = [
        Genre::Action,
        Genre::Comedy,
        Genre::Drama,
        Genre::Horror,
        Genre::SciFi,
        Genre::Thriller,
        Genre::Romance,
    ];

    /// Display name, as embedded in prompts
    pub fn name(&self) -> &'static str {
        match self {
            Self::Action => "Action",
            Self::Comedy => "Comedy",
            Self::Drama => "Drama",
            Self::Horror => "Horror",
            Self::SciFi => "Sci-Fi",
            Self::Thriller => "Thriller",
            Self::Romance => "Romance",
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Genre {
    type Err = String;

    /// Case-insensitive; punctuation is ignored so "scifi" and "Sci-Fi" both parse
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        Genre::ALL
            .into_iter()
            .find(|g| {
                g.name()
                    .chars()
                    .filter(|c| c.is_alphanumeric())
                    .flat_map(char::to_lowercase)
                    .eq(key.chars())
            })
            .ok_or_else(|| format!("Unknown genre '{}'. Expected one of: {}", s, genre_names()))
    }
}

fn genre_names() -> String {
    Genre::ALL.iter().map(Genre::name).collect::<Vec<_>>().join(", ")
}

/// A writer style preset offered when choosing a style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTemplate {
    pub name: &'static str,
    pub traits: &'static str,
}

impl StyleTemplate {
    /// Label used in prompts, e.g. "Aaron Sorkin (Fast-paced, Walk-and-talk)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.traits)
    }
}

/// Built-in style presets
pub const STYLE_TEMPLATES: [StyleTemplate; 5] = [
    StyleTemplate {
        name: "Quentin Tarantino",
        traits: "Non-linear, Dialogue-heavy",
    },
    StyleTemplate {
        name: "Christopher Nolan",
        traits: "Complex, Cerebral",
    },
    StyleTemplate {
        name: "Greta Gerwig",
        traits: "Character-driven, Witty",
    },
    StyleTemplate {
        name: "Aaron Sorkin",
        traits: "Fast-paced, Walk-and-talk",
    },
    StyleTemplate {
        name: "George Lucas",
        traits: "Space Opera, Hero's Journey",
    },
];

/// Resolve a style argument to its preset label
///
/// A 1-based index or a case-insensitive substring of a preset name selects
/// that preset; anything else is taken as a free-form style.
pub fn resolve_style(input: &str) -> String {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>()
        && let Some(t) = n.checked_sub(1).and_then(|i| STYLE_TEMPLATES.get(i))
    {
        return t.label();
    }
    let needle = input.to_lowercase();
    STYLE_TEMPLATES
        .iter()
        .find(|t| !needle.is_empty() && t.name.to_lowercase().contains(&needle))
        .map(StyleTemplate::label)
        .unwrap_or_else(|| input.to_string())
}

/// Story parameters collected by the wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub genre: Genre,
    pub style_template: String,
    pub hero: String,
    pub villain: String,
    pub plot_hook: String,
    pub setting: String,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            genre: Genre::default(),
            style_template: STYLE_TEMPLATES[0].label(),
            hero: String::new(),
            villain: String::new(),
            plot_hook: String::new(),
            setting: String::new(),
        }
    }
}

impl GenerationParameters {
    pub fn has_hero(&self) -> bool {
        !self.hero.trim().is_empty()
    }

    pub fn has_plot_hook(&self) -> bool {
        !self.plot_hook.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_parse() {
        assert_eq!("drama".parse::<Genre>(), Ok(Genre::Drama));
        assert_eq!("THRILLER".parse::<Genre>(), Ok(Genre::Thriller));
        assert_eq!("Sci-Fi".parse::<Genre>(), Ok(Genre::SciFi));
        assert_eq!("scifi".parse::<Genre>(), Ok(Genre::SciFi));
        assert!("western".parse::<Genre>().is_err());
    }

    #[test]
    fn test_genre_display_roundtrip() {
        for genre in Genre::ALL {
            assert_eq!(genre.to_string().parse::<Genre>(), Ok(genre));
        }
    }

    #[test]
    fn test_genre_serde_name() {
        assert_eq!(serde_json::to_string(&Genre::SciFi).unwrap(), "\"Sci-Fi\"");
    }

    #[test]
    fn test_resolve_style_by_index() {
        assert_eq!(resolve_style("4"), "Aaron Sorkin (Fast-paced, Walk-and-talk)");
        assert_eq!(resolve_style("0"), "0");
        assert_eq!(resolve_style("9"), "9");
    }

    #[test]
    fn test_resolve_style_by_name() {
        assert_eq!(resolve_style("nolan"), "Christopher Nolan (Complex, Cerebral)");
        assert_eq!(resolve_style("Sorkin"), "Aaron Sorkin (Fast-paced, Walk-and-talk)");
    }

    #[test]
    fn test_resolve_style_free_form() {
        assert_eq!(resolve_style("  Nora Ephron "), "Nora Ephron");
    }

    #[test]
    fn test_default_parameters() {
        let params = GenerationParameters::default();
        assert_eq!(params.genre, Genre::Drama);
        assert!(params.style_template.starts_with("Quentin Tarantino"));
        assert!(!params.has_hero());
        assert!(!params.has_plot_hook());
    }

    #[test]
    fn test_blank_hero_is_missing() {
        let params = GenerationParameters {
            hero: "   ".to_string(),
            plot_hook: "one last job".to_string(),
            ..Default::default()
        };
        assert!(!params.has_hero());
        assert!(params.has_plot_hook());
    }
}
