//! REPL command parsing

use std::path::PathBuf;

use tracing::debug;

/// A parsed line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Quit,
    Status,
    /// `None` lists the choices
    Genre(Option<String>),
    /// `None` lists the presets
    Style(Option<String>),
    Hero(String),
    Villain(String),
    Setting(String),
    Plot(String),
    Next,
    Back,
    Generate,
    Show,
    Edit,
    Save,
    History,
    Restore(String),
    Note(String),
    Notes,
    Critique,
    Export(PathBuf),
    /// Known command, bad arguments; carries the usage line
    Usage(&'static str),
    Unknown(String),
}

impl ReplCommand {
    /// Parse one line; a leading `/` is accepted and ignored
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let input = input.strip_prefix('/').unwrap_or(input);
        let (word, rest) = match input.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (input, ""),
        };
        debug!(%word, rest_len = rest.len(), "ReplCommand::parse: called");

        let arg = || (!rest.is_empty()).then(|| rest.to_string());

        match word.to_lowercase().as_str() {
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            "status" => Self::Status,
            "genre" => Self::Genre(arg()),
            "style" => Self::Style(arg()),
            "hero" => Self::Hero(rest.to_string()),
            "villain" => Self::Villain(rest.to_string()),
            "setting" => Self::Setting(rest.to_string()),
            "plot" => Self::Plot(rest.to_string()),
            "next" => Self::Next,
            "back" => Self::Back,
            "generate" | "gen" => Self::Generate,
            "show" => Self::Show,
            "edit" => Self::Edit,
            "save" => Self::Save,
            "history" => Self::History,
            "restore" => arg().map_or(Self::Usage("restore <#|revision-id>"), Self::Restore),
            "note" => arg().map_or(Self::Usage("note <text>"), Self::Note),
            "notes" => Self::Notes,
            "critique" => Self::Critique,
            "export" => arg().map_or(Self::Usage("export <path>"), |p| Self::Export(PathBuf::from(p))),
            other => Self::Unknown(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        assert_eq!(ReplCommand::parse("help"), ReplCommand::Help);
        assert_eq!(ReplCommand::parse("/quit"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("  NEXT  "), ReplCommand::Next);
        assert_eq!(ReplCommand::parse("gen"), ReplCommand::Generate);
    }

    #[test]
    fn test_parse_keeps_argument_text() {
        assert_eq!(
            ReplCommand::parse("hero A retired hitman"),
            ReplCommand::Hero("A retired hitman".to_string())
        );
        assert_eq!(
            ReplCommand::parse("plot   one last job "),
            ReplCommand::Plot("one last job".to_string())
        );
        assert_eq!(ReplCommand::parse("villain"), ReplCommand::Villain(String::new()));
    }

    #[test]
    fn test_parse_optional_argument() {
        assert_eq!(ReplCommand::parse("genre"), ReplCommand::Genre(None));
        assert_eq!(ReplCommand::parse("style 4"), ReplCommand::Style(Some("4".to_string())));
    }

    #[test]
    fn test_parse_required_argument() {
        assert!(matches!(ReplCommand::parse("restore"), ReplCommand::Usage(_)));
        assert!(matches!(ReplCommand::parse("note   "), ReplCommand::Usage(_)));
        assert_eq!(ReplCommand::parse("restore 2"), ReplCommand::Restore("2".to_string()));
        assert_eq!(
            ReplCommand::parse("export out/session.json"),
            ReplCommand::Export(PathBuf::from("out/session.json"))
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(ReplCommand::parse("mint"), ReplCommand::Unknown("mint".to_string()));
    }
}
