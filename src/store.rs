//! File-backed vector store: persist and retrieve (chunk, embedding) pairs.
//!
//! The whole store lives in one directory as an `entries.json` file holding
//! the embedding model name, the vector dimension, and every entry. The
//! dimension is fixed by the first write; later writes and queries must
//! match it or the operation fails with [`StoreError::DimensionMismatch`].

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::Chunk;

const STATE_FILE: &str = "entries.json";
const STATE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("vector dimension mismatch: store holds {stored}, got {got}")]
    DimensionMismatch { stored: usize, got: usize },
    #[error(
        "store at {dir:?} was written with embedding model '{stored}', \
         but '{configured}' is configured; re-ingest or point STORE_DIR elsewhere"
    )]
    ModelMismatch {
        dir: PathBuf,
        stored: String,
        configured: String,
    },
    #[error("store state file is not valid: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One persisted (chunk, embedding) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEntry {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    /// 1-based page the chunk came from.
    pub page: usize,
    /// File name of the source document.
    pub source: String,
    /// SHA-256 over source, page and text; duplicate hashes are skipped on
    /// persist, making re-ingestion of the same document idempotent.
    pub content_hash: String,
}

impl StoreEntry {
    pub fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        let content_hash = content_hash(&chunk.source, chunk.page, &chunk.text);
        Self {
            id: Uuid::new_v4().to_string(),
            text: chunk.text,
            embedding,
            page: chunk.page,
            source: chunk.source,
            content_hash,
        }
    }
}

/// A chunk returned by [`VectorStore::search`], with its similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub page: usize,
    pub source: String,
    /// Cosine similarity to the query vector; higher is closer.
    pub score: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreState {
    version: u32,
    embedding_model: String,
    /// Fixed by the first persisted entry; `None` while the store is empty.
    dimension: Option<usize>,
    entries: Vec<StoreEntry>,
}

/// Persistent vector store backed by a single directory on disk.
#[derive(Debug)]
pub struct VectorStore {
    dir: PathBuf,
    state: StoreState,
}

impl VectorStore {
    /// Opens (or creates) the store at `dir` for the given embedding model.
    ///
    /// A store previously written with a different model is rejected: its
    /// vectors would be incomparable with fresh query embeddings and
    /// retrieval would silently return noise.
    pub fn open(dir: &Path, embedding_model: &str) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        let state_path = dir.join(STATE_FILE);

        let state = if state_path.exists() {
            let raw = fs::read_to_string(&state_path)?;
            let state: StoreState = serde_json::from_str(&raw)?;
            if state.embedding_model != embedding_model {
                return Err(StoreError::ModelMismatch {
                    dir: dir.to_path_buf(),
                    stored: state.embedding_model,
                    configured: embedding_model.to_string(),
                });
            }
            info!(
                "Opened vector store at {} with {} entries",
                dir.display(),
                state.entries.len()
            );
            state
        } else {
            StoreState {
                version: STATE_VERSION,
                embedding_model: embedding_model.to_string(),
                dimension: None,
                entries: Vec::new(),
            }
        };

        Ok(Self {
            dir: dir.to_path_buf(),
            state,
        })
    }

    pub fn len(&self) -> usize {
        self.state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.entries.is_empty()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends new entries and writes the store back to disk. Previously
    /// stored entries are never lost.
    ///
    /// Entries whose content hash is already present are skipped. Returns
    /// `(stored, skipped)` counts.
    pub fn persist(&mut self, entries: Vec<StoreEntry>) -> Result<(usize, usize), StoreError> {
        let mut stored = 0;
        let mut skipped = 0;

        for entry in entries {
            let dim = entry.embedding.len();
            match self.state.dimension {
                Some(expected) if expected != dim => {
                    return Err(StoreError::DimensionMismatch {
                        stored: expected,
                        got: dim,
                    });
                }
                Some(_) => {}
                None => self.state.dimension = Some(dim),
            }

            if self
                .state
                .entries
                .iter()
                .any(|e| e.content_hash == entry.content_hash)
            {
                skipped += 1;
                continue;
            }

            self.state.entries.push(entry);
            stored += 1;
        }

        if stored > 0 {
            self.write_state()?;
        }
        debug!("Persisted {stored} entries ({skipped} duplicates skipped)");
        Ok((stored, skipped))
    }

    /// Returns the `k` entries most similar to `query` (cosine similarity,
    /// descending). Equal scores keep insertion order: the sort is stable,
    /// so earlier-ingested chunks win ties.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, StoreError> {
        if let Some(expected) = self.state.dimension {
            if query.len() != expected {
                return Err(StoreError::DimensionMismatch {
                    stored: expected,
                    got: query.len(),
                });
            }
        }

        let mut scored: Vec<RetrievedChunk> = self
            .state
            .entries
            .iter()
            .map(|entry| RetrievedChunk {
                text: entry.text.clone(),
                page: entry.page,
                source: entry.source.clone(),
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    fn write_state(&self) -> Result<(), StoreError> {
        let path = self.dir.join(STATE_FILE);
        let data = serde_json::to_string(&self.state)?;
        fs::write(path, data)?;
        Ok(())
    }
}

fn content_hash(source: &str, page: usize, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update([0]);
    hasher.update(page.to_le_bytes());
    hasher.update([0]);
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
