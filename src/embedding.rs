//! Text embedding: model abstraction, smart truncation and the shared generator.
//!
//! [`EmbeddingGenerator`](generator::EmbeddingGenerator) is the entry point. It
//! owns a single lazily loaded [`Embedder`](embedder::Embedder) and applies the
//! truncation and validation policy around it.

#[cfg(feature = "embeddings-candle")]
pub mod candle_bert_embedder;
pub mod embedder;
pub mod executor;
pub mod generator;
pub mod hashing;
pub mod truncation;

/// Scale `vector` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }
}
