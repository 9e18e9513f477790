//! Ollama provider implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ensure_success, EmbeddingProvider, GenerationOptions, LanguageModel, ProviderError};

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    embedding_model: String,
    chat_model: String,
}

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            chat_model: "llama3.2".to_string(),
        }
    }

    pub fn with_models(mut self, embedding: Option<&str>, chat: Option<&str>) -> Self {
        if let Some(model) = embedding {
            self.embedding_model = model.to_string();
        }
        if let Some(model) = chat {
            self.chat_model = model.to_string();
        }
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let request = OllamaEmbeddingRequest {
            model: &self.embedding_model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await?;

        let parsed: OllamaEmbeddingResponse = ensure_success(response).await?.json().await?;

        if parsed.embedding.is_empty() {
            return Err(ProviderError::InvalidResponse("Empty embedding".to_string()));
        }
        Ok(parsed.embedding)
    }
}

#[async_trait]
impl LanguageModel for OllamaProvider {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, ProviderError> {
        let request = OllamaGenerateRequest {
            model: &self.chat_model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        let parsed: OllamaGenerateResponse = ensure_success(response).await?.json().await?;
        Ok(parsed.response)
    }
}
