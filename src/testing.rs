//! Test-only helpers.

use async_trait::async_trait;

use crate::embedding::{Embedder, EmbeddingError};

/// Deterministic embedder for tests: the vector depends only on the text,
/// so repeated runs retrieve identically without downloading a model.
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// The vector this embedder produces for `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut seed: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.bytes() {
            seed ^= u64::from(byte);
            seed = seed.wrapping_mul(0x0100_0000_01b3);
        }

        (0..self.dimension)
            .map(|_| {
                seed = seed
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                // Map to (-1, 1).
                ((seed >> 33) as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    fn model_name(&self) -> &str {
        "stub-embedder"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_embedder_is_deterministic_and_text_sensitive() {
        let embedder = StubEmbedder::new(4);
        let first = tokio_test::block_on(embedder.embed_texts(vec!["alpha".to_string()])).unwrap();
        let second = tokio_test::block_on(embedder.embed_texts(vec!["alpha".to_string()])).unwrap();
        assert_eq!(first, second);

        let other = tokio_test::block_on(embedder.embed_texts(vec!["beta".to_string()])).unwrap();
        assert_ne!(first, other);
        assert_eq!(first[0].len(), 4);
    }
}
