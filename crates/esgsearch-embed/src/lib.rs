//! Text embedders: a deterministic hash embedder for tests and offline use, and
//! HTTP clients for Ollama and OpenAI-compatible embedding servers.

use std::sync::Arc;

use esgsearch_core::config::{EmbeddingProvider, EmbeddingSettings};
use esgsearch_core::traits::TextEmbedder;
use esgsearch_core::Result;

pub mod hash;
pub mod remote;

pub use hash::HashEmbedder;
pub use remote::{RemoteEmbedder, RemoteProvider};

/// Build the embedder named by `settings.provider`.
///
/// The provider is always chosen explicitly; nothing here switches to the hash
/// embedder behind the caller's back.
pub fn build_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn TextEmbedder>> {
    let embedder: Arc<dyn TextEmbedder> = match settings.provider {
        EmbeddingProvider::Hash => Arc::new(HashEmbedder::new(settings.dim, settings.seed)),
        EmbeddingProvider::Ollama => Arc::new(RemoteEmbedder::from_settings(RemoteProvider::Ollama, settings)?),
        EmbeddingProvider::OpenAi => Arc::new(RemoteEmbedder::from_settings(RemoteProvider::OpenAi, settings)?),
    };
    tracing::info!(embedder = embedder.name(), dim = embedder.dim(), "embedder ready");
    Ok(embedder)
}
