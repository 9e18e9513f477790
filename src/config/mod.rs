//! Application configuration

pub mod persona;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub use persona::Persona;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,

    /// Backend used for both embeddings and generation: "gemini", "ollama", "openai"
    pub provider: String,
    pub google_api_key: Option<String>,
    pub gemini_base_url: Option<String>,
    pub ollama_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,

    /// Overrides the provider's default embedding model
    pub embedding_model: Option<String>,
    /// Overrides the provider's default chat model
    pub chat_model: Option<String>,
    pub temperature: f32,

    /// JSON array of document strings, read once at startup
    pub knowledge_path: PathBuf,
    pub persona_path: Option<PathBuf>,

    /// Concurrent embedding calls while building the index
    pub embed_concurrency: usize,
    /// Cap on distinct user histories kept in memory
    pub max_tracked_users: Option<usize>,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: parse_var("PORT")?.unwrap_or(5000),
            provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "gemini".into()),
            google_api_key: env::var("GOOGLE_API_KEY").ok(),
            gemini_base_url: env::var("GEMINI_BASE_URL").ok(),
            ollama_url: env::var("OLLAMA_URL").ok(),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_base_url: env::var("OPENAI_BASE_URL").ok(),
            embedding_model: env::var("EMBEDDING_MODEL").ok(),
            chat_model: env::var("CHAT_MODEL").ok(),
            temperature: parse_var("TEMPERATURE")?.unwrap_or(0.6),
            knowledge_path: env::var("KNOWLEDGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/knowledge.json")),
            persona_path: env::var("PERSONA_PATH").ok().map(PathBuf::from),
            embed_concurrency: parse_var::<usize>("EMBED_CONCURRENCY")?.unwrap_or(1).max(1),
            max_tracked_users: parse_var("MAX_TRACKED_USERS")?,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS")?.unwrap_or(120),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            provider: "gemini".into(),
            google_api_key: None,
            gemini_base_url: None,
            ollama_url: None,
            openai_api_key: None,
            openai_base_url: None,
            embedding_model: None,
            chat_model: None,
            temperature: 0.6,
            knowledge_path: PathBuf::from("./data/knowledge.json"),
            persona_path: None,
            embed_concurrency: 1,
            max_tracked_users: None,
            request_timeout_secs: 120,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
