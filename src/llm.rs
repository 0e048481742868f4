//! One-shot completion requests against the Groq API, via Rig.

use std::time::Duration;

use rig::client::CompletionClient as _;
use rig::completion::Prompt;
use rig::providers::groq;
use thiserror::Error;
use tracing::debug;

use crate::config::AppConfig;

/// System instruction for every completion. Constrains the model to the
/// supplied context and fixes the wording used when the context does not
/// contain the answer.
pub const SYSTEM_PROMPT: &str = "\
You are an intelligent document analysis assistant. \
Answer the question based strictly on the provided Context only. \
If the answer is not found in the context, say 'Information not found.' \
Please provide the response in English.";

/// The exact phrase the model is instructed to emit for an unanswerable
/// question. Also returned directly when retrieval finds nothing.
pub const FALLBACK_ANSWER: &str = "Information not found.";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request timed out after {0:?}")]
    Timeout(Duration),
    #[error("completion request failed: {0}")]
    Api(#[from] rig::completion::PromptError),
}

/// Client for the remote chat-completion API. One request per query turn;
/// no streaming, no tools, no retries.
#[derive(Clone)]
pub struct CompletionClient {
    api_key: String,
    model: String,
    timeout: Duration,
}

impl CompletionClient {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            api_key: cfg.groq_api_key.clone(),
            model: cfg.chat_model.clone(),
            timeout: cfg.request_timeout,
        }
    }

    /// Sends one completion request with the assembled context and the
    /// user's question. Blocks up to the configured timeout.
    pub async fn answer_with_context(
        &self,
        question: &str,
        context: &str,
    ) -> Result<String, CompletionError> {
        let client = groq::Client::new(&self.api_key);
        let agent = client
            .agent(&self.model)
            .preamble(SYSTEM_PROMPT)
            .temperature(0.1)
            .max_tokens(1024)
            .build();

        let message = build_user_message(context, question);
        debug!("Requesting completion from model {}", self.model);

        match tokio::time::timeout(self.timeout, agent.prompt(message)).await {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(e)) => Err(CompletionError::Api(e)),
            Err(_) => Err(CompletionError::Timeout(self.timeout)),
        }
    }
}

/// The single user message: retrieved context first, then the question.
pub fn build_user_message(context: &str, question: &str) -> String {
    format!("Context: {context}\n\nQuestion: {question}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_demands_the_exact_fallback_phrase() {
        assert!(SYSTEM_PROMPT.contains(FALLBACK_ANSWER));
        assert!(SYSTEM_PROMPT.contains("strictly"));
        assert!(SYSTEM_PROMPT.contains("Context"));
    }

    #[test]
    fn user_message_carries_context_then_question() {
        let message = build_user_message("Some context.", "What happened?");
        assert_eq!(message, "Context: Some context.\n\nQuestion: What happened?");
        let context_pos = message.find("Some context.").unwrap();
        let question_pos = message.find("What happened?").unwrap();
        assert!(context_pos < question_pos);
    }
}
