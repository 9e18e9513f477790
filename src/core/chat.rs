//! Chat engine
//!
//! The ChatEngine answers one message for one user:
//! 1. Records the user turn
//! 2. Short-circuits greetings and off-topic questions through the rule policy
//! 3. Embeds the message and retrieves the closest knowledge documents
//! 4. Builds the prompt from history, context and the question
//! 5. Asks the language model and records the trimmed reply
//!
//! Provider failures are returned to the caller. The user turn stays recorded; no
//! assistant turn is added for a failed request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Persona;
use crate::conversation::Turn;
use crate::providers::{EmbeddingProvider, GenerationOptions, LanguageModel, ProviderError};

use super::knowledge::{KnowledgeIndex, DEFAULT_TOP_K};
use super::memory::ConversationStore;
use super::prompt::PromptAssembler;
use super::rules::{normalize, RulePolicy};

/// User id used when a client does not send one
pub const DEFAULT_USER_ID: &str = "default";

/// Request to the chat engine
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's message
    #[serde(default)]
    pub message: String,

    /// Opaque client-chosen id keying the conversation history
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
}

impl ChatRequest {
    /// The user id, falling back to [`DEFAULT_USER_ID`] when missing or blank
    pub fn user_id(&self) -> &str {
        match self.user_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => DEFAULT_USER_ID,
        }
    }
}

/// Response from the chat engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Errors from the chat engine
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Embedding failed: {0}")]
    Embedding(#[source] ProviderError),

    #[error("Generation failed: {0}")]
    Generation(#[source] ProviderError),

    #[error("Query has {found} embedding dimensions, index has {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// The core chat engine
pub struct ChatEngine {
    index: KnowledgeIndex,
    memory: Arc<ConversationStore>,
    rules: RulePolicy,
    prompts: PromptAssembler,
    embedder: Arc<dyn EmbeddingProvider>,
    model: Arc<dyn LanguageModel>,
    options: GenerationOptions,
}

impl ChatEngine {
    /// Create a new chat engine over a fully built index
    pub fn new(
        index: KnowledgeIndex,
        memory: Arc<ConversationStore>,
        persona: &Persona,
        embedder: Arc<dyn EmbeddingProvider>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            index,
            memory,
            rules: RulePolicy::from_persona(persona),
            prompts: PromptAssembler::new(persona),
            embedder,
            model,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn index(&self) -> &KnowledgeIndex {
        &self.index
    }

    pub fn memory(&self) -> &ConversationStore {
        &self.memory
    }

    /// Process a chat request and return a response
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let reply = self.handle(request.user_id(), &request.message).await?;
        Ok(ChatResponse { reply })
    }

    /// Answer `message` for `user_id`
    pub async fn handle(&self, user_id: &str, message: &str) -> Result<String, ChatError> {
        let normalized = normalize(message);
        if normalized.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        self.memory.append(user_id, Turn::user(message)).await;

        if let Some(matched) = self.rules.evaluate(&normalized) {
            tracing::debug!(user_id, rule = matched.rule, "rule short-circuit");
            let reply = matched.reply.to_string();
            self.memory.append(user_id, Turn::assistant(reply.clone())).await;
            return Ok(reply);
        }

        let query = self
            .embedder
            .embed(message)
            .await
            .map_err(ChatError::Embedding)?;

        if let Some(expected) = self.index.dimensions() {
            if query.len() != expected {
                return Err(ChatError::DimensionMismatch {
                    expected,
                    found: query.len(),
                });
            }
        }

        let context = self.index.retrieve(&query, DEFAULT_TOP_K);
        tracing::debug!(
            user_id,
            documents = context.len(),
            top_score = context.first().map(|d| d.score),
            "retrieved context"
        );

        let history = self.memory.read(user_id).await;
        let prompt = self.prompts.build(&history, &context, message);

        let generated = self
            .model
            .generate(&prompt, self.options)
            .await
            .map_err(ChatError::Generation)?;
        let reply = generated.trim().to_string();

        self.memory.append(user_id, Turn::assistant(reply.clone())).await;

        Ok(reply)
    }
}
