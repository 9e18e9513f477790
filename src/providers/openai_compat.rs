//! OpenAI-compatible provider
//!
//! Works with any API that implements the OpenAI embeddings and chat completions
//! formats: OpenAI itself, Groq, vLLM, LM Studio, LocalAI and similar servers.
//!
//! # Configuration
//!
//! ```text
//! LLM_PROVIDER=openai
//! OPENAI_BASE_URL=https://api.openai.com/v1
//! OPENAI_API_KEY=sk-...
//! CHAT_MODEL=gpt-4o-mini
//! ```

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use super::{EmbeddingProvider, GenerationOptions, LanguageModel, ProviderError};

/// OpenAI-compatible chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Error response from API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// OpenAI-compatible API provider
pub struct OpenAICompatProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    embedding_model: String,
    chat_model: String,
}

impl OpenAICompatProvider {
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            embedding_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
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

    fn post(&self, path: &str) -> RequestBuilder {
        let mut req_builder = self.client.post(format!("{}/{}", self.base_url, path));

        // Local servers usually run without a key
        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        req_builder
    }

    /// Send a request and return the raw body, mapping API errors
    async fn send(&self, req_builder: RequestBuilder) -> Result<String, ProviderError> {
        let response = req_builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        Ok(body)
    }
}

fn api_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
    if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(body) {
        return ProviderError::InvalidResponse(format!("API error: {}", error_resp.error.message));
    }
    ProviderError::InvalidResponse(format!("HTTP {}: {}", status, body))
}

fn parse_completion(body: &str) -> Result<String, ProviderError> {
    let completion: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::InvalidResponse(format!("Failed to parse response: {} - Body: {}", e, body))
    })?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

    Ok(choice.message.content.unwrap_or_default())
}

fn parse_embedding(body: &str) -> Result<Vec<f32>, ProviderError> {
    let parsed: EmbeddingResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::InvalidResponse(format!("Failed to parse embedding: {}", e))
    })?;

    parsed
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ProviderError::InvalidResponse("Empty embedding".to_string()))
}

#[async_trait]
impl EmbeddingProvider for OpenAICompatProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };
        let body = self.send(self.post("embeddings").json(&request)).await?;
        parse_embedding(&body)
    }
}

#[async_trait]
impl LanguageModel for OpenAICompatProvider {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest {
            model: self.chat_model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: options.temperature,
        };
        let body = self.send(self.post("chat/completions").json(&request)).await?;
        parse_completion(&body)
    }
}
