//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};

/// Default on-disk location of the vector store.
pub const DEFAULT_STORE_DIR: &str = "./chroma_db";

/// Configuration shared by both pipelines: where the vector store lives.
///
/// Every field has a default, so loading never fails; the ingestion CLI can
/// run without any environment set up.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub store_dir: PathBuf,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let store_dir = env::var("STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_DIR));
        Self { store_dir }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
        }
    }
}

/// Full configuration for the query server.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,
    /// Credential for the Groq completion API. The single required secret.
    pub groq_api_key: String,
    pub chat_model: String,
    /// How many chunks retrieval returns per question.
    pub top_k: usize,
    /// Upper bound on one completion round-trip.
    pub request_timeout: Duration,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Loads the configuration from environment variables (honoring `.env`
    /// if the caller loaded one).
    ///
    /// Fails when `GROQ_API_KEY` is absent; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let groq_api_key = env::var("GROQ_API_KEY")
            .map_err(|_| anyhow!("GROQ_API_KEY not set in the environment"))?;

        let server_addr =
            env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:3322".to_string());
        let chat_model =
            env::var("CHAT_MODEL").unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string());

        let top_k = env::var("TOP_K")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            server_addr,
            groq_api_key,
            chat_model,
            top_k,
            request_timeout: Duration::from_secs(timeout_secs),
            store: StoreConfig::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-global, so everything touching them
    // lives in one test.
    #[test]
    fn from_env_requires_api_key_and_applies_defaults() {
        env::remove_var("GROQ_API_KEY");
        env::remove_var("SERVER_ADDR");
        env::remove_var("CHAT_MODEL");
        env::remove_var("TOP_K");
        env::remove_var("REQUEST_TIMEOUT_SECS");
        env::remove_var("STORE_DIR");

        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));

        env::set_var("GROQ_API_KEY", "gsk_test");
        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.server_addr, "127.0.0.1:3322");
        assert_eq!(cfg.chat_model, "llama-3.3-70b-versatile");
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert_eq!(cfg.store.store_dir, PathBuf::from(DEFAULT_STORE_DIR));
        env::remove_var("GROQ_API_KEY");
    }
}
