use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use legisearch::embedding::l2_normalize;
use legisearch::embedding::truncation::smart_truncate;
use legisearch::{
    EmbeddingConfig, EmbeddingGenerator, Embedder, HashingEmbedder, Language, LegisearchError,
    Result,
};

fn config(dimension: usize) -> EmbeddingConfig {
    EmbeddingConfig {
        dimension,
        ..Default::default()
    }
}

#[test]
fn test_concurrent_first_use_loads_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let loader_calls = calls.clone();
    let loader = move |config: &EmbeddingConfig| -> Result<Arc<dyn Embedder>> {
        loader_calls.fetch_add(1, Ordering::SeqCst);
        // Widen the race window.
        thread::sleep(Duration::from_millis(50));
        Ok(Arc::new(HashingEmbedder::new(config.dimension, Language::Spanish)?))
    };
    let generator = EmbeddingGenerator::new(config(48), loader).unwrap();

    let vectors: Vec<Vec<f32>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| generator.encode("ley de salud mental", true).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(generator.load_count(), 1);
    assert!(vectors.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_encode_dimension_and_determinism() {
    let generator = EmbeddingGenerator::new(config(384), legisearch::DefaultModelLoader::default())
        .unwrap();
    for text in ["a", "Ley de transparencia", "¿Qué dice el artículo 5?"] {
        let first = generator.encode(text, true).unwrap();
        assert_eq!(first.len(), 384);
        assert_eq!(first, generator.encode(text, true).unwrap());
    }
    assert!(matches!(
        generator.encode("", true),
        Err(LegisearchError::InvalidInput(_))
    ));
}

#[test]
fn test_long_text_is_smart_truncated() {
    let generator = EmbeddingGenerator::new(
        EmbeddingConfig {
            dimension: 128,
            max_tokens: 16,
            ..Default::default()
        },
        legisearch::DefaultModelLoader::default(),
    )
    .unwrap();

    let long: String = (0..200).map(|i| format!("palabra{i} ")).collect();
    let budget = generator.config().max_chars();
    let truncated = smart_truncate(&long, budget, generator.config().head_ratio);
    assert!(truncated.contains(" ... "));
    assert!(truncated.starts_with("palabra0 "));
    assert!(truncated.ends_with("palabra199 ") || truncated.ends_with("palabra199"));

    // The model only ever sees what the policy keeps.
    let mut expected = HashingEmbedder::new(128, Language::Spanish)
        .unwrap()
        .vectorize(&truncated);
    l2_normalize(&mut expected);
    assert_eq!(generator.encode(&long, true).unwrap(), expected);
}

#[test]
fn test_batch_matches_single_encoding() {
    let generator = EmbeddingGenerator::new(config(64), legisearch::DefaultModelLoader::default())
        .unwrap();
    let texts = ["educación pública", "   ", "medio ambiente"];
    let batch = generator.encode_batch(&texts, true).unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0], generator.encode("educación pública", true).unwrap());
    assert_eq!(batch[1], generator.encode("medio ambiente", true).unwrap());
}

#[test]
fn test_model_info() {
    let generator = EmbeddingGenerator::new(config(64), legisearch::DefaultModelLoader::default())
        .unwrap();
    let info = generator.get_model_info();
    assert_eq!(info.model_name, "hashing");
    assert!(!info.initialized);
    assert_eq!(info.max_sequence_length, None);

    generator.encode("texto", true).unwrap();
    let info = generator.get_model_info();
    assert!(info.initialized);
    assert_eq!(info.dimension, 64);
    assert_eq!(info.model_name, "hashing");
}

#[tokio::test]
async fn test_generator_dropped_inside_runtime() {
    let generator = EmbeddingGenerator::new(config(32), legisearch::DefaultModelLoader::default())
        .unwrap();
    let vector = generator.encode("ley de salud mental", true).unwrap();
    assert_eq!(vector.len(), 32);
    drop(generator);
}
