use std::process::exit;
use std::sync::{Arc, Mutex};

use axum::Router;
use tokio::sync::{oneshot, RwLock};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use intellirag::{
    api,
    app_state::{AppState, Status},
    config::AppConfig,
    embedding::{Embedder, MiniLmEmbedder},
    llm::CompletionClient,
    store::VectorStore,
};

#[tokio::main]
async fn main() {
    // 1. Load .env and initialize logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 2. Load configuration; a missing credential halts before anything
    //    else is touched
    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {e}");
            exit(1);
        }
    };

    // 3. Load the embedding model and open the vector store
    let embedder = match MiniLmEmbedder::new() {
        Ok(embedder) => Arc::new(embedder),
        Err(e) => {
            error!("Failed to load the embedding model: {e}");
            exit(1);
        }
    };
    let store = match VectorStore::open(&cfg.store.store_dir, embedder.model_name()) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open the vector store: {e}");
            exit(1);
        }
    };
    if store.is_empty() {
        info!(
            "Vector store at {} is empty; run intellirag-ingest to add a document",
            store.dir().display()
        );
    }

    // 4. Completion client for the Groq API
    let completion = Arc::new(CompletionClient::from_config(&cfg));

    // Channel for the shutdown signal
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    // 5. Shared application state
    let app_state = AppState {
        config: cfg.clone(),
        store: Arc::new(RwLock::new(store)),
        embedder,
        completion,
        history: Arc::new(Mutex::new(Vec::new())),
        status: Arc::new(Mutex::new(Status {
            is_busy: false,
            message: "Server ready.".to_string(),
            progress: 0.0,
        })),
        shutdown_sender: Arc::new(Mutex::new(Some(shutdown_tx))),
    };

    // 6. API router plus the static chat frontend
    let app = Router::new()
        .merge(api::create_router(app_state.clone()))
        .fallback_service(ServeDir::new("frontend"))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // 7. Start the server
    let server_addr = &app_state.config.server_addr;
    let listener = match tokio::net::TcpListener::bind(server_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {server_addr}: {e}");
            exit(1);
        }
    };
    let server_url = format!("http://{server_addr}");
    info!("Server listening on {server_url}");

    if webbrowser::open(&server_url).is_err() {
        info!("Could not open a browser; visit {server_url} manually.");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            info!("Shutdown signal received, stopping the server.");
        })
        .await
        .expect("server error");

    info!("Server stopped.");
}
