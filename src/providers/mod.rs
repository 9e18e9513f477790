//! AI provider integrations
//!
//! The chat engine only sees two capabilities: turning text into an embedding and
//! turning a prompt into text. Each backend implements both.

mod gemini;
mod ollama;
mod openai_compat;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::config::Config;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai_compat::OpenAICompatProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Sampling options passed with every generation call
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self { temperature: 0.6 }
    }
}

/// Text to embedding vector
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Prompt to generated text
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, ProviderError>;
}

/// The pair of capabilities a backend supplies
#[derive(Clone)]
pub struct Providers {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub model: Arc<dyn LanguageModel>,
}

impl Providers {
    fn from_backend<P>(backend: P) -> Self
    where
        P: EmbeddingProvider + LanguageModel + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            embedder: backend.clone(),
            model: backend,
        }
    }

    pub fn from_name(name: &str, config: &Config) -> Result<Self, ProviderError> {
        let client = http_client(config.request_timeout_secs)?;

        match name.to_lowercase().as_str() {
            "gemini" | "google" => {
                let api_key = config
                    .google_api_key
                    .clone()
                    .ok_or_else(|| ProviderError::NotConfigured("GOOGLE_API_KEY".into()))?;
                let mut provider = GeminiProvider::new(client, api_key);
                if let Some(ref url) = config.gemini_base_url {
                    provider = provider.with_base_url(url);
                }
                provider = provider.with_models(
                    config.embedding_model.as_deref(),
                    config.chat_model.as_deref(),
                );
                Ok(Self::from_backend(provider))
            }
            "ollama" => {
                let url = config
                    .ollama_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".into());
                let provider = OllamaProvider::new(client, url).with_models(
                    config.embedding_model.as_deref(),
                    config.chat_model.as_deref(),
                );
                Ok(Self::from_backend(provider))
            }
            "openai" => {
                let base_url = config
                    .openai_base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.openai.com/v1".into());
                if config.openai_api_key.is_none() && base_url.contains("api.openai.com") {
                    return Err(ProviderError::NotConfigured("OPENAI_API_KEY".into()));
                }
                let provider =
                    OpenAICompatProvider::new(client, base_url, config.openai_api_key.clone())
                        .with_models(
                            config.embedding_model.as_deref(),
                            config.chat_model.as_deref(),
                        );
                Ok(Self::from_backend(provider))
            }
            _ => Err(ProviderError::UnknownProvider(name.to_string())),
        }
    }
}

fn http_client(timeout_secs: u64) -> Result<Client, ProviderError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Turn a non-success HTTP response into an error carrying status and body
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::InvalidResponse(format!("{}: {}", status, body)))
}
