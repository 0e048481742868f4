//! Text embeddings behind a trait seam.
//!
//! Ingestion and query must embed with the same model or retrieval silently
//! degrades, so both pipelines receive one shared [`Embedder`] and the store
//! records its name at first write.

use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use thiserror::Error;
use tokio::task;
use tracing::info;

/// Name of the embedding model both pipelines use.
pub const EMBEDDING_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Dimension of the vectors `all-MiniLM-L6-v2` produces.
pub const EMBEDDING_DIMENSION: usize = 384;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to initialize embedding model: {0}")]
    Init(String),
    #[error("embedding inference failed: {0}")]
    Inference(String),
}

/// Produces fixed-dimension vectors for text.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identity, persisted alongside the store for compatibility checks.
    fn model_name(&self) -> &str;

    /// Dimension of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Embeds a batch of texts, one vector per input, in input order.
    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Local `all-MiniLM-L6-v2` embedder (fastembed). Runs on CPU; the model is
/// downloaded to the fastembed cache on first use, no API credential needed.
pub struct MiniLmEmbedder {
    model: Arc<TextEmbedding>,
}

impl MiniLmEmbedder {
    pub fn new() -> Result<Self, EmbeddingError> {
        info!("Loading embedding model {EMBEDDING_MODEL_NAME}...");
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .map_err(|e| EmbeddingError::Init(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
        })
    }
}

#[async_trait]
impl Embedder for MiniLmEmbedder {
    fn model_name(&self) -> &str {
        EMBEDDING_MODEL_NAME
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }

    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let expected = texts.len();
        let model = Arc::clone(&self.model);

        // Inference is CPU-bound; keep it off the async executor.
        let embeddings = task::spawn_blocking(move || model.embed(texts, None))
            .await
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        if embeddings.len() != expected {
            return Err(EmbeddingError::Inference(format!(
                "model returned {} vectors for {} inputs",
                embeddings.len(),
                expected
            )));
        }

        Ok(embeddings)
    }
}
