//! Ingestion pipeline: PDF → page text → overlapping chunks → embeddings →
//! persisted vector store entries.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::chunker::split_page;
use crate::embedding::Embedder;
use crate::models::Chunk;
use crate::store::{StoreEntry, VectorStore};

/// Maximum characters per chunk.
pub const CHUNK_SIZE: usize = 1000;

/// Characters shared between consecutive chunks of the same page.
pub const CHUNK_OVERLAP: usize = 100;

/// Counts from one ingestion run.
#[derive(Debug, Default)]
pub struct IngestionSummary {
    pub pages: usize,
    pub chunks_created: usize,
    pub chunks_stored: usize,
    pub chunks_deduplicated: usize,
}

impl std::fmt::Display for IngestionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} pages read, {} chunks created, {} stored, {} duplicates skipped",
            self.pages, self.chunks_created, self.chunks_stored, self.chunks_deduplicated
        )
    }
}

/// Ingests one PDF into the store.
///
/// Nothing is written until extraction, chunking and embedding have all
/// succeeded, so a failed run leaves the store exactly as it was.
pub async fn ingest_pdf(
    store: &mut VectorStore,
    embedder: &dyn Embedder,
    path: &Path,
) -> Result<IngestionSummary> {
    if !path.is_file() {
        return Err(anyhow!("file does not exist: {}", path.display()));
    }

    let pages = pdf_extract::extract_text_by_pages(path)
        .with_context(|| format!("failed to extract text from {}", path.display()))?;

    let source = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    info!("Extracted {} pages from {}", pages.len(), path.display());
    ingest_pages(store, embedder, &pages, &source).await
}

/// Chunks, embeds and persists already-extracted page texts. Pages are
/// numbered from 1.
pub async fn ingest_pages(
    store: &mut VectorStore,
    embedder: &dyn Embedder,
    pages: &[String],
    source: &str,
) -> Result<IngestionSummary> {
    let chunks = chunk_pages(pages, source);
    if chunks.is_empty() {
        warn!("No text found in {source}; nothing to ingest");
        return Ok(IngestionSummary {
            pages: pages.len(),
            ..IngestionSummary::default()
        });
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder.embed_texts(texts).await?;

    let entries: Vec<StoreEntry> = chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, vector)| StoreEntry::new(chunk, vector))
        .collect();

    let chunks_created = entries.len();
    let (chunks_stored, chunks_deduplicated) = store.persist(entries)?;

    let summary = IngestionSummary {
        pages: pages.len(),
        chunks_created,
        chunks_stored,
        chunks_deduplicated,
    };
    info!("Ingested {source}: {summary}");
    Ok(summary)
}

/// Splits each page into overlapping windows, tagging every chunk with its
/// 1-based page number.
pub fn chunk_pages(pages: &[String], source: &str) -> Vec<Chunk> {
    pages
        .iter()
        .enumerate()
        .flat_map(|(idx, page_text)| {
            split_page(page_text, CHUNK_SIZE, CHUNK_OVERLAP)
                .into_iter()
                .map(move |text| Chunk {
                    text,
                    page: idx + 1,
                    source: source.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubEmbedder;
    use tempfile::TempDir;

    #[tokio::test]
    async fn single_page_document_yields_one_chunk_with_page_one() {
        let dir = TempDir::new().unwrap();
        let embedder = StubEmbedder::new(8);
        let mut store = VectorStore::open(dir.path(), embedder.model_name()).unwrap();

        let pages = vec!["Apple Inc. reported revenue of $100B in 2024.".to_string()];
        let summary = ingest_pages(&mut store, &embedder, &pages, "10-K.pdf")
            .await
            .unwrap();

        assert_eq!(summary.pages, 1);
        assert_eq!(summary.chunks_created, 1);
        assert_eq!(summary.chunks_stored, 1);
        assert_eq!(store.len(), 1);

        let query = embedder.vector_for("Apple Inc. reported revenue of $100B in 2024.");
        let results = store.search(&query, 1).unwrap();
        assert_eq!(results[0].page, 1);
        assert_eq!(results[0].source, "10-K.pdf");
    }

    #[tokio::test]
    async fn reingesting_the_same_pages_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let embedder = StubEmbedder::new(8);
        let mut store = VectorStore::open(dir.path(), embedder.model_name()).unwrap();

        let pages = vec!["Some page text.".to_string(), "Another page.".to_string()];
        ingest_pages(&mut store, &embedder, &pages, "doc.pdf")
            .await
            .unwrap();
        let before = store.len();

        let summary = ingest_pages(&mut store, &embedder, &pages, "doc.pdf")
            .await
            .unwrap();
        assert_eq!(summary.chunks_stored, 0);
        assert_eq!(summary.chunks_deduplicated, summary.chunks_created);
        assert_eq!(store.len(), before);
    }

    #[tokio::test]
    async fn missing_file_aborts_before_any_store_write() {
        let dir = TempDir::new().unwrap();
        let embedder = StubEmbedder::new(8);
        let mut store = VectorStore::open(dir.path(), embedder.model_name()).unwrap();

        let err = ingest_pdf(&mut store, &embedder, Path::new("/no/such/file.pdf"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert!(store.is_empty());
        // No state file was created either.
        assert!(!dir.path().join("entries.json").exists());
    }

    #[test]
    fn chunk_pages_numbers_pages_from_one_and_skips_blank_pages() {
        let pages = vec![
            "first page".to_string(),
            "   ".to_string(),
            "third page".to_string(),
        ];
        let chunks = chunk_pages(&pages, "doc.pdf");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page, 1);
        assert_eq!(chunks[1].page, 3);
    }

    #[test]
    fn summary_display_reports_all_counts() {
        let summary = IngestionSummary {
            pages: 2,
            chunks_created: 5,
            chunks_stored: 4,
            chunks_deduplicated: 1,
        };
        let text = summary.to_string();
        assert!(text.contains("2 pages"));
        assert!(text.contains("5 chunks created"));
        assert!(text.contains("4 stored"));
        assert!(text.contains("1 duplicates skipped"));
    }
}
