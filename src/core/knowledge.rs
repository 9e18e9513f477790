//! Static knowledge base with embedding-based retrieval
//!
//! The corpus is embedded once at startup. Retrieval is a linear scan: every stored
//! document is scored against the query vector and the best `top_k` are returned.

use std::path::Path;

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::providers::{EmbeddingProvider, ProviderError};

use super::vector::{cosine_similarity, rank_key};

/// Number of documents handed to the prompt
pub const DEFAULT_TOP_K: usize = 5;

/// A corpus entry and its precomputed embedding
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub vector: Vec<f32>,
}

/// A document scored against one query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub text: String,
    pub score: f32,
}

/// Errors while loading or embedding the corpus
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge source {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Knowledge source is not a JSON array of strings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to embed document #{index}: {source}")]
    Embedding {
        index: usize,
        #[source]
        source: ProviderError,
    },

    #[error("Document #{index} has {found} embedding dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// Read the document source: a JSON array of strings
pub async fn load_documents(path: &Path) -> Result<Vec<String>, KnowledgeError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| KnowledgeError::Io {
            path: path.display().to_string(),
            source,
        })?;

    parse_documents(&content)
}

pub fn parse_documents(content: &str) -> Result<Vec<String>, KnowledgeError> {
    Ok(serde_json::from_str(content)?)
}

/// Immutable, fully embedded corpus
#[derive(Debug, Default)]
pub struct KnowledgeIndex {
    documents: Vec<Document>,
}

impl KnowledgeIndex {
    /// Embed every document and build the index.
    ///
    /// At most `concurrency` embedding calls are in flight; corpus order is kept.
    /// The first failing document aborts the whole build.
    pub async fn build(
        texts: Vec<String>,
        embedder: &dyn EmbeddingProvider,
        concurrency: usize,
    ) -> Result<Self, KnowledgeError> {
        tracing::info!("📚 Embedding {} knowledge document(s)", texts.len());

        let documents: Vec<Document> = stream::iter(texts.into_iter().enumerate())
            .map(|(index, text)| async move {
                let vector = embedder
                    .embed(&text)
                    .await
                    .map_err(|source| KnowledgeError::Embedding { index, source })?;
                tracing::debug!(index, dims = vector.len(), "embedded document");
                Ok::<_, KnowledgeError>(Document { text, vector })
            })
            .buffered(concurrency.max(1))
            .try_collect()
            .await?;

        if let Some(first) = documents.first() {
            let expected = first.vector.len();
            if let Some((index, doc)) = documents
                .iter()
                .enumerate()
                .find(|(_, doc)| doc.vector.len() != expected)
            {
                return Err(KnowledgeError::DimensionMismatch {
                    index,
                    expected,
                    found: doc.vector.len(),
                });
            }
        }

        Ok(Self { documents })
    }

    /// Embedding width shared by every document, `None` for an empty index
    pub fn dimensions(&self) -> Option<usize> {
        self.documents.first().map(|doc| doc.vector.len())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Rank every document by cosine similarity to `query` and keep the best `top_k`.
    ///
    /// Ties keep corpus order. Degenerate (NaN) scores rank last.
    pub fn retrieve(&self, query: &[f32], top_k: usize) -> Vec<ScoredDocument> {
        let mut scored: Vec<ScoredDocument> = self
            .documents
            .iter()
            .map(|doc| ScoredDocument {
                text: doc.text.clone(),
                score: cosine_similarity(query, &doc.vector),
            })
            .collect();

        scored.sort_by(|a, b| rank_key(b.score).total_cmp(&rank_key(a.score)));
        scored.truncate(top_k);
        scored
    }
}
