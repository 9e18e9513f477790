//! Core retrieval-augmented chat components
//!
//! This module contains the retrieval, memory, rule and prompt logic behind every reply.

mod chat;
mod knowledge;
mod memory;
mod prompt;
mod rules;
mod vector;

#[cfg(test)]
pub(crate) mod test_support;

pub use chat::{ChatEngine, ChatError, ChatRequest, ChatResponse};
pub use knowledge::{load_documents, KnowledgeIndex};
pub use memory::ConversationStore;
