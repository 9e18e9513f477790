//! Google Gemini provider (Generative Language REST API)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ensure_success, EmbeddingProvider, GenerationOptions, LanguageModel, ProviderError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_EMBEDDING_MODEL: &str = "gemini-embedding-001";
const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    embedding_model: String,
    chat_model: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: Content,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiProvider {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
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

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }
}

fn user_content(text: &str) -> Content {
    Content {
        role: Some("user".to_string()),
        parts: vec![Part {
            text: Some(text.to_string()),
        }],
    }
}

/// Concatenated text of the first candidate
fn first_candidate_text(response: GenerateResponse) -> Result<String, ProviderError> {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| ProviderError::InvalidResponse("No candidates in response".to_string()))?;

    Ok(content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .join(""))
}

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let request = EmbedRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content {
                role: None,
                parts: vec![Part {
                    text: Some(text.to_string()),
                }],
            },
        };

        let response = self
            .client
            .post(self.endpoint(&self.embedding_model, "embedContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let parsed: EmbedResponse = ensure_success(response).await?.json().await?;

        if parsed.embedding.values.is_empty() {
            return Err(ProviderError::InvalidResponse("Empty embedding".to_string()));
        }
        Ok(parsed.embedding.values)
    }
}

#[async_trait]
impl LanguageModel for GeminiProvider {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            contents: vec![user_content(prompt)],
            generation_config: GenerationConfig {
                temperature: options.temperature,
            },
        };

        let response = self
            .client
            .post(self.endpoint(&self.chat_model, "generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let parsed: GenerateResponse = ensure_success(response).await?.json().await?;
        first_candidate_text(parsed)
    }
}
