//! Deterministic feature-hashing embedder.
//!
//! Analyzed terms and their character trigrams are hashed into a fixed number
//! of signed buckets. Texts that share vocabulary end up close under cosine
//! distance. It needs no model files, which makes it the default backend for
//! tests and offline use.

use std::any::Any;

use async_trait::async_trait;

use crate::analysis::{Analyzer, Language, LanguageAnalyzer};
use crate::embedding::embedder::Embedder;
use crate::error::{LegisearchError, Result};

const TERM_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.25;
const SIGN_SEED: u32 = 0x9e37_79b9;

/// Name the hashing backend reports through [`Embedder::name`].
pub const HASHING_MODEL_NAME: &str = "hashing";

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    analyzer: LanguageAnalyzer,
}

impl HashingEmbedder {
    pub fn new(dimension: usize, language: Language) -> Result<Self> {
        if dimension == 0 {
            return Err(LegisearchError::invalid_config(
                "hashing embedder dimension must be greater than 0",
            ));
        }
        Ok(Self {
            dimension,
            analyzer: LanguageAnalyzer::new(language),
        })
    }

    /// Unnormalized feature vector for `text`.
    ///
    /// When analysis removes every word (stop words, punctuation), the raw
    /// lowercased words are hashed instead, so non-blank text never maps to
    /// the zero vector.
    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut terms: Vec<String> = self
            .analyzer
            .analyze(text)
            .into_iter()
            .map(|token| token.term)
            .collect();
        if terms.is_empty() {
            terms = text.split_whitespace().map(str::to_lowercase).collect();
        }

        let mut vector = vec![0.0f32; self.dimension];
        for term in &terms {
            self.add_feature(&mut vector, term, TERM_WEIGHT);

            let padded: Vec<char> = format!("^{term}$").chars().collect();
            for window in padded.windows(3) {
                let gram: String = window.iter().collect();
                self.add_feature(&mut vector, &format!("#{gram}"), TRIGRAM_WEIGHT);
            }
        }
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let bucket = crc32fast::hash(feature.as_bytes()) as usize % self.dimension;

        let mut hasher = crc32fast::Hasher::new_with_initial(SIGN_SEED);
        hasher.update(feature.as_bytes());
        let sign = if hasher.finalize() & 1 == 0 { 1.0 } else { -1.0 };

        vector[bucket] += sign * weight;
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        HASHING_MODEL_NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::distance::cosine_similarity;

    fn embedder() -> HashingEmbedder {
        HashingEmbedder::new(384, Language::Spanish).unwrap()
    }

    #[tokio::test]
    async fn test_embed_has_fixed_dimension() {
        let v = embedder().embed("Ley de transparencia").await.unwrap();
        assert_eq!(v.len(), 384);
        assert!(v.iter().any(|x| *x != 0.0));
    }

    #[tokio::test]
    async fn test_embed_is_deterministic() {
        let e = embedder();
        let a = e.embed("delitos informáticos").await.unwrap();
        let b = e.embed("delitos informáticos").await.unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shared_vocabulary_is_closer() {
        let e = embedder();
        let query = e.vectorize("transparencia y corrupción");
        let related = e.vectorize("Ley de transparencia y combate a la corrupción pública");
        let unrelated = e.vectorize("Protección del medio ambiente y plásticos");

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_stop_words_and_punctuation_are_not_zero() {
        let e = embedder();
        for text in ["de la y", "el", "¿?"] {
            assert!(e.vectorize(text).iter().any(|x| *x != 0.0), "{text}");
        }
        assert_ne!(e.vectorize("de la y"), e.vectorize("el"));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashingEmbedder::new(0, Language::Spanish).is_err());
    }
}
