//! Offline ingestion entry point: load one PDF into the vector store.

use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use intellirag::{
    config::StoreConfig,
    embedding::{Embedder, MiniLmEmbedder},
    ingest::ingest_pdf,
    store::VectorStore,
};

/// Ingest a PDF document into the local vector store.
#[derive(Parser)]
#[command(name = "intellirag-ingest", version)]
struct Args {
    /// Path to the PDF to ingest.
    pdf: PathBuf,

    /// Directory holding the vector store.
    #[arg(long, env = "STORE_DIR")]
    store_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if !args.pdf.is_file() {
        println!("Not found: {}", args.pdf.display());
        return;
    }

    let store_dir = args
        .store_dir
        .unwrap_or_else(|| StoreConfig::from_env().store_dir);

    let embedder = match MiniLmEmbedder::new() {
        Ok(embedder) => embedder,
        Err(e) => {
            error!("Failed to load the embedding model: {e}");
            exit(1);
        }
    };
    let mut store = match VectorStore::open(&store_dir, embedder.model_name()) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open the vector store: {e}");
            exit(1);
        }
    };

    match ingest_pdf(&mut store, &embedder, &args.pdf).await {
        Ok(summary) => println!("Ingested {} chunks", summary.chunks_stored),
        Err(e) => {
            error!("Ingestion failed: {e}");
            exit(1);
        }
    }
}
