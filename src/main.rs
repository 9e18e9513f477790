//! Persona RAG - personal-assistant chatbot API
//!
//! Answers questions about one person from a small static knowledge base. Each
//! message is matched against cheap canned-reply rules, then embedded, matched
//! against the corpus by cosine similarity, and sent to a hosted language model
//! together with the user's recent conversation.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod routes;

use config::{Config, Persona};
use crate::core::{load_documents, ChatEngine, ConversationStore, KnowledgeIndex};
use providers::{GenerationOptions, Providers};

/// Application state shared across handlers
///
/// The engine slot stays empty until the knowledge index is fully built.
#[derive(Clone)]
pub struct AppState {
    pub chat_engine: Arc<OnceLock<ChatEngine>>,
}

impl AppState {
    pub fn starting() -> Self {
        Self {
            chat_engine: Arc::new(OnceLock::new()),
        }
    }

    /// Start serving chat requests with `engine`
    pub fn install(&self, engine: ChatEngine) {
        if self.chat_engine.set(engine).is_err() {
            tracing::warn!("chat engine already installed, keeping the first one");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "persona_rag=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let persona = match config.persona_path {
        Some(ref path) => Persona::load_from_file(path).await?,
        None => Persona::default(),
    };
    tracing::info!("🧑 Persona: {}", persona.name);

    let providers = Providers::from_name(&config.provider, &config)?;
    let documents = load_documents(&config.knowledge_path).await?;

    let state = AppState::starting();

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🔥 API listening at http://{}", addr);

    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    // Nothing is answered until every document is embedded
    let index = match KnowledgeIndex::build(
        documents,
        providers.embedder.as_ref(),
        config.embed_concurrency,
    )
    .await
    {
        Ok(index) => index,
        Err(e) => {
            server.abort();
            return Err(e.into());
        }
    };

    if index.is_empty() {
        tracing::warn!("knowledge base is empty, replies will have no context");
    }
    let documents = index.len();

    let memory = Arc::new(ConversationStore::new().with_user_cap(config.max_tracked_users));
    let engine = ChatEngine::new(
        index,
        memory,
        &persona,
        providers.embedder.clone(),
        providers.model.clone(),
    )
    .with_options(GenerationOptions {
        temperature: config.temperature,
    });

    state.install(engine);
    tracing::info!("✅ Ready: {} knowledge document(s) indexed", documents);

    server.await??;

    Ok(())
}
