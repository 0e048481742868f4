//! HTTP API for the chat frontend.

use std::path::PathBuf;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::spawn;
use tracing::{error, info};

use crate::{
    app_state::{AppState, Status},
    ingest,
    models::ChatTurn,
    rag::{self, Citation},
};

/// Message shown to the user when a query turn fails. Details go to the log
/// only.
const GENERIC_QUERY_ERROR: &str = "Something went wrong while answering. Please try again.";

// --- API payloads and responses ---

#[derive(Deserialize)]
pub struct ChatPayload {
    question: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    answer: String,
    citations: Vec<Citation>,
}

#[derive(Deserialize)]
pub struct IngestPayload {
    path: String,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/history", get(history_handler))
        .route("/api/ingest", post(ingest_handler))
        .route("/api/status", get(status_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .with_state(app_state)
}

// --- Handlers ---

#[axum::debug_handler]
async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<serde_json::Value>)> {
    if payload.question.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Please enter a question."})),
        ));
    }

    // The question joins the history even if answering fails; a failed
    // turn just gets no assistant reply.
    state
        .history
        .lock()
        .unwrap()
        .push(ChatTurn::user(&payload.question));

    let store = state.store.read().await;
    let result = rag::answer_question(
        &store,
        state.embedder.as_ref(),
        &state.completion,
        &payload.question,
        state.config.top_k,
    )
    .await;
    drop(store);

    match result {
        Ok(outcome) => {
            state
                .history
                .lock()
                .unwrap()
                .push(ChatTurn::assistant(&outcome.answer));
            Ok(Json(ChatResponse {
                answer: outcome.answer,
                citations: outcome.citations,
            }))
        }
        Err(e) => {
            error!("Query failed: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": GENERIC_QUERY_ERROR})),
            ))
        }
    }
}

#[axum::debug_handler]
async fn history_handler(State(state): State<AppState>) -> Json<Vec<ChatTurn>> {
    Json(state.history.lock().unwrap().clone())
}

#[axum::debug_handler]
async fn ingest_handler(
    State(state): State<AppState>,
    Json(payload): Json<IngestPayload>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let path = PathBuf::from(&payload.path);
    if !path.is_file() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("Not found: {}", path.display())})),
        ));
    }

    {
        let status = state.status.lock().unwrap();
        if status.is_busy {
            return Err((
                StatusCode::CONFLICT,
                Json(json!({"error": "An ingestion is already running."})),
            ));
        }
    }

    spawn(async move {
        {
            let mut status = state.status.lock().unwrap();
            status.is_busy = true;
            status.message = format!("Ingesting {}...", path.display());
            status.progress = 0.0;
        }

        let mut store = state.store.write().await;
        let result = ingest::ingest_pdf(&mut store, state.embedder.as_ref(), &path).await;
        drop(store);

        let mut status = state.status.lock().unwrap();
        status.is_busy = false;
        status.progress = 0.0;
        match result {
            Ok(summary) => {
                status.message = format!("Ingestion finished: {summary}");
            }
            Err(e) => {
                status.message = format!("Ingestion failed: {e}");
                error!("Ingestion failed: {e}");
            }
        }
    });

    Ok(StatusCode::ACCEPTED)
}

#[axum::debug_handler]
async fn status_handler(State(state): State<AppState>) -> Json<Status> {
    Json(state.status.lock().unwrap().clone())
}

#[axum::debug_handler]
async fn shutdown_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!("Shutdown requested");
    if let Some(sender) = state.shutdown_sender.lock().unwrap().take() {
        let _ = sender.send(());
    }
    StatusCode::OK
}
