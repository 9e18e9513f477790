//! Persona definitions
//!
//! A persona decides who the assistant speaks for, the behavioral rules rendered into
//! every prompt, and the canned replies used by the rule policy. Personas can be
//! loaded from TOML; anything a file leaves out falls back to the built-in persona.
//!
//! # Example Persona File
//!
//! ```toml
//! [persona]
//! name = "Lakshay Oberoi"
//!
//! [prompt]
//! rules = ["Keep answers short (1–3 lines max).", "Answer clearly and directly."]
//!
//! [greeting]
//! triggers = ["hi", "hello"]
//! reply = "Hi! Ask me anything about Lakshay."
//!
//! [deflection]
//! keywords = ["weather"]
//! reply = "I only answer questions about Lakshay."
//! ```

use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// A fully resolved persona
#[derive(Debug, Clone)]
pub struct Persona {
    /// Who the assistant represents
    pub name: String,

    /// Behavioral rules listed in the prompt
    pub rules: Vec<String>,

    /// Lower-cased messages answered with the greeting reply
    pub greeting_triggers: Vec<String>,
    pub greeting_reply: String,

    /// Lower-cased substrings answered with the deflection reply
    pub deflection_keywords: Vec<String>,
    pub deflection_reply: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: builtin::NAME.to_string(),
            rules: to_strings(builtin::RULES),
            greeting_triggers: to_strings(builtin::GREETING_TRIGGERS),
            greeting_reply: builtin::GREETING_REPLY.to_string(),
            deflection_keywords: to_strings(builtin::DEFLECTION_KEYWORDS),
            deflection_reply: builtin::DEFLECTION_REPLY.to_string(),
        }
    }
}

impl Persona {
    /// Load a persona from a TOML file
    pub async fn load_from_file(path: &Path) -> Result<Self, PersonaError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PersonaError::IoError(format!("{}: {}", path.display(), e)))?;

        Self::from_toml(&content)
    }

    /// Parse a persona from TOML, filling gaps from the built-in persona
    pub fn from_toml(content: &str) -> Result<Self, PersonaError> {
        let file: PersonaFile =
            toml::from_str(content).map_err(|e| PersonaError::ParseError(e.to_string()))?;

        let mut persona = Persona::default();

        if let Some(info) = file.persona {
            persona.name = info.name;
        }
        if let Some(prompt) = file.prompt {
            persona.rules = prompt.rules;
        }
        if let Some(greeting) = file.greeting {
            persona.greeting_triggers = lowercase_all(greeting.triggers);
            persona.greeting_reply = greeting.reply;
        }
        if let Some(deflection) = file.deflection {
            persona.deflection_keywords = lowercase_all(deflection.keywords);
            persona.deflection_reply = deflection.reply;
        }

        if persona.name.trim().is_empty() {
            return Err(PersonaError::Invalid("persona name is empty".into()));
        }

        Ok(persona)
    }
}

/// On-disk persona layout
#[derive(Debug, Deserialize)]
struct PersonaFile {
    persona: Option<PersonaInfo>,
    prompt: Option<PromptSection>,
    greeting: Option<GreetingSection>,
    deflection: Option<DeflectionSection>,
}

#[derive(Debug, Deserialize)]
struct PersonaInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PromptSection {
    #[serde(default)]
    rules: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GreetingSection {
    triggers: Vec<String>,
    reply: String,
}

#[derive(Debug, Deserialize)]
struct DeflectionSection {
    keywords: Vec<String>,
    reply: String,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn lowercase_all(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Errors from persona loading
#[derive(Debug, thiserror::Error)]
pub enum PersonaError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid persona: {0}")]
    Invalid(String),
}

/// Built-in persona used when no file is configured
pub mod builtin {
    pub const NAME: &str = "Lakshay Oberoi";

    pub const RULES: &[&str] = &[
        "Keep answers short (1–3 lines max).",
        "Be confident but not dramatic.",
        "Do NOT overshare personal traits unless specifically asked.",
        "Answer clearly and directly.",
        "If question is unrelated to Lakshay, respond smartly and redirect.",
        "Use previous conversation if needed for context.",
        "No long paragraphs.",
    ];

    pub const GREETING_TRIGGERS: &[&str] = &["hi", "hello", "hey", "hii"];

    pub const GREETING_REPLY: &str =
        "Hi 👋 I’m Lakshay’s AI Agent. Ask me anything about him — respectfully.";

    pub const DEFLECTION_KEYWORDS: &[&str] =
        &["president", "prime minister", "capital of", "weather"];

    pub const DEFLECTION_REPLY: &str = "I’m Lakshay’s personal AI. For general knowledge, Google exists. If you're here for Lakshay, ask properly.";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_persona() {
        let toml_content = r#"
[persona]
name = "Ada Lovelace"

[prompt]
rules = ["Be brief."]

[greeting]
triggers = ["Hello", " Yo "]
reply = "Hello from Ada's assistant."

[deflection]
keywords = ["Stock Price"]
reply = "Ask me about Ada instead."
"#;

        let persona = Persona::from_toml(toml_content).unwrap();
        assert_eq!(persona.name, "Ada Lovelace");
        assert_eq!(persona.rules, vec!["Be brief."]);
        assert_eq!(persona.greeting_triggers, vec!["hello", "yo"]);
        assert_eq!(persona.deflection_keywords, vec!["stock price"]);
        assert_eq!(persona.deflection_reply, "Ask me about Ada instead.");
    }

    #[test]
    fn test_minimal_persona_keeps_builtin_rules() {
        let toml_content = r#"
[persona]
name = "Minimal"
"#;

        let persona = Persona::from_toml(toml_content).unwrap();
        assert_eq!(persona.name, "Minimal");
        assert_eq!(persona.greeting_triggers.len(), builtin::GREETING_TRIGGERS.len());
        assert_eq!(persona.deflection_reply, builtin::DEFLECTION_REPLY);
        assert_eq!(persona.rules.len(), builtin::RULES.len());
    }

    #[test]
    fn test_sample_file_matches_builtin() {
        let persona = Persona::from_toml(include_str!("../../data/persona.toml")).unwrap();
        let builtin = Persona::default();
        assert_eq!(persona.name, builtin.name);
        assert_eq!(persona.rules, builtin.rules);
        assert_eq!(persona.greeting_triggers, builtin.greeting_triggers);
        assert_eq!(persona.greeting_reply, builtin.greeting_reply);
        assert_eq!(persona.deflection_keywords, builtin.deflection_keywords);
        assert_eq!(persona.deflection_reply, builtin.deflection_reply);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = Persona::load_from_file(Path::new("/nonexistent/persona.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, PersonaError::IoError(_)));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = Persona::from_toml("[persona]\nname = \"  \"\n").unwrap_err();
        assert!(matches!(err, PersonaError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Persona::from_toml("[persona\nname=").unwrap_err();
        assert!(matches!(err, PersonaError::ParseError(_)));
    }
}
