//! The embedding model contract.

use std::any::Any;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;

/// A text embedding model.
///
/// Implementations must be deterministic: the same input text yields the same
/// vector. Vectors are returned as produced by the model; normalization and
/// dimension checks are applied by the
/// [`EmbeddingGenerator`](crate::embedding::generator::EmbeddingGenerator).
#[async_trait]
pub trait Embedder: Send + Sync + Debug {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, preserving order.
    ///
    /// The default implementation embeds one text at a time; models with a
    /// native batch path should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Length of the vectors this model produces.
    fn dimension(&self) -> usize;

    /// Maximum number of tokens the model reads, if it has such a limit.
    fn max_sequence_length(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}
