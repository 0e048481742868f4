//! Shared state for the query server, constructed once in `main` and
//! injected into every handler.

use std::sync::{Arc, Mutex};

use tokio::sync::{oneshot, RwLock};

use crate::config::AppConfig;
use crate::embedding::Embedder;
use crate::llm::CompletionClient;
use crate::models::ChatTurn;
use crate::store::VectorStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// Read-mostly: search takes the read lock, ingestion the write lock.
    pub store: Arc<RwLock<VectorStore>>,
    pub embedder: Arc<dyn Embedder>,
    pub completion: Arc<CompletionClient>,
    /// Conversation history for this process; append-only, never persisted.
    pub history: Arc<Mutex<Vec<ChatTurn>>>,
    pub status: Arc<Mutex<Status>>,
    pub shutdown_sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Status {
    pub is_busy: bool,
    pub message: String,
    /// Between 0.0 and 1.0.
    pub progress: f32,
}
