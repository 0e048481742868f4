//! Document question-answering over a local vector store.
//!
//! Two pipelines share a persisted [`store::VectorStore`] and a common
//! [`embedding::Embedder`]:
//!
//! - ingestion ([`ingest`]): PDF → page text → overlapping chunks →
//!   embeddings → store
//! - query ([`rag`]): question → embedding → top-k retrieval → Groq
//!   completion → answer with citations

pub mod api;
pub mod app_state;
pub mod chunker;
pub mod config;
pub mod embedding;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod rag;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{AppConfig, StoreConfig};
pub use store::VectorStore;
