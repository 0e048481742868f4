//! Query pipeline: embed the question, retrieve the closest chunks, ask the
//! completion API, and package the answer with citations.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::embedding::{Embedder, EmbeddingError};
use crate::llm::{CompletionClient, CompletionError, FALLBACK_ANSWER};
use crate::store::{RetrievedChunk, StoreError, VectorStore};

/// Longest excerpt a citation shows.
pub const CITATION_EXCERPT_CHARS: usize = 400;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// A supporting chunk shown alongside an answer.
#[derive(Debug, Clone, Serialize)]
pub struct Citation {
    /// 1-based page of the source document.
    pub page: usize,
    pub source: String,
    /// Chunk text truncated to [`CITATION_EXCERPT_CHARS`] characters.
    pub excerpt: String,
    pub score: f32,
}

/// The result of one query turn.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// Answers one question against the persisted store.
///
/// The question is embedded with the same model used at ingestion, the
/// `top_k` nearest chunks become the context, and a single completion
/// request produces the answer. When retrieval returns nothing the fixed
/// fallback phrase is returned without calling the remote API.
pub async fn answer_question(
    store: &VectorStore,
    embedder: &dyn Embedder,
    llm: &CompletionClient,
    question: &str,
    top_k: usize,
) -> Result<QueryOutcome, QueryError> {
    let retrieved = retrieve(store, embedder, question, top_k).await?;

    if retrieved.is_empty() {
        info!("Retrieval found no chunks; answering with the fallback phrase");
        return Ok(QueryOutcome {
            answer: FALLBACK_ANSWER.to_string(),
            citations: Vec::new(),
        });
    }

    let context = assemble_context(&retrieved);
    let answer = llm.answer_with_context(question, &context).await?;
    let citations = build_citations(&retrieved);

    Ok(QueryOutcome { answer, citations })
}

/// Embeds the question and returns the `top_k` nearest stored chunks.
pub async fn retrieve(
    store: &VectorStore,
    embedder: &dyn Embedder,
    question: &str,
    top_k: usize,
) -> Result<Vec<RetrievedChunk>, QueryError> {
    if question.trim().is_empty() {
        return Err(QueryError::EmptyQuestion);
    }

    let mut vectors = embedder.embed_texts(vec![question.to_string()]).await?;
    let query_vec = vectors.pop().ok_or_else(|| {
        EmbeddingError::Inference("model returned no vector for the question".to_string())
    })?;

    Ok(store.search(&query_vec, top_k)?)
}

/// Concatenates retrieved chunk texts, in retrieval order, as the prompt
/// context.
pub fn assemble_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One citation per retrieved chunk, in retrieval order.
pub fn build_citations(chunks: &[RetrievedChunk]) -> Vec<Citation> {
    chunks
        .iter()
        .map(|c| Citation {
            page: c.page,
            source: c.source.clone(),
            excerpt: excerpt(&c.text, CITATION_EXCERPT_CHARS),
            score: c.score,
        })
        .collect()
}

/// Truncates to at most `max_chars` characters, on a character boundary.
fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}
