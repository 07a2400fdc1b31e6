//! The shared text-to-vector service.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::analysis::Language;
use crate::config::{EmbeddingBackend, EmbeddingConfig, LegisearchConfig};
use crate::embedding::embedder::Embedder;
use crate::embedding::executor::EmbedderExecutor;
use crate::embedding::hashing::{HASHING_MODEL_NAME, HashingEmbedder};
use crate::embedding::l2_normalize;
use crate::embedding::truncation::TruncationPolicy;
use crate::error::{LegisearchError, Result};

/// Builds the embedding model the first time it is needed.
pub trait ModelLoader: Send + Sync {
    fn load(&self, config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>>;
}

impl<F> ModelLoader for F
where
    F: Fn(&EmbeddingConfig) -> Result<Arc<dyn Embedder>> + Send + Sync,
{
    fn load(&self, config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
        self(config)
    }
}

/// Loads the backend named in [`EmbeddingConfig::backend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultModelLoader {
    language: Language,
}

impl DefaultModelLoader {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl ModelLoader for DefaultModelLoader {
    fn load(&self, config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
        match config.backend {
            EmbeddingBackend::Hashing => {
                Ok(Arc::new(HashingEmbedder::new(config.dimension, self.language)?))
            }
            #[cfg(feature = "embeddings-candle")]
            EmbeddingBackend::Candle => Ok(Arc::new(
                crate::embedding::candle_bert_embedder::CandleBertEmbedder::new(&config.model_name)?,
            )),
            #[cfg(not(feature = "embeddings-candle"))]
            EmbeddingBackend::Candle => Err(LegisearchError::invalid_config(
                "the candle backend requires the `embeddings-candle` feature",
            )),
        }
    }
}

/// Diagnostic snapshot returned by [`EmbeddingGenerator::get_model_info`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub max_tokens: usize,
    pub dimension: usize,
    pub initialized: bool,
    /// Known only once the model is loaded.
    pub max_sequence_length: Option<usize>,
}

/// Thread-safe text encoder around a single lazily loaded model.
///
/// Construct one per process and share it behind an `Arc`. The first call to
/// [`encode`](Self::encode) or [`encode_batch`](Self::encode_batch) loads the
/// model; concurrent first callers wait for that one load instead of racing.
pub struct EmbeddingGenerator {
    config: EmbeddingConfig,
    truncation: TruncationPolicy,
    loader: Box<dyn ModelLoader>,
    model: RwLock<Option<Arc<dyn Embedder>>>,
    init_lock: Mutex<()>,
    executor: Mutex<Option<Arc<EmbedderExecutor>>>,
    loads: AtomicUsize,
}

impl fmt::Debug for EmbeddingGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingGenerator")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl EmbeddingGenerator {
    pub fn new(config: EmbeddingConfig, loader: impl ModelLoader + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            truncation: TruncationPolicy::from_config(&config),
            config,
            loader: Box::new(loader),
            model: RwLock::new(None),
            init_lock: Mutex::new(()),
            executor: Mutex::new(None),
            loads: AtomicUsize::new(0),
        })
    }

    /// Generator using the backend selected in `config`.
    pub fn from_config(config: &LegisearchConfig) -> Result<Self> {
        Self::new(
            config.embedding.clone(),
            DefaultModelLoader::new(config.analysis.language),
        )
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    pub fn is_initialized(&self) -> bool {
        self.model.read().is_some()
    }

    /// How many times the model has been loaded (at most once).
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// The loaded model, loading it on first use.
    pub fn model(&self) -> Result<Arc<dyn Embedder>> {
        if let Some(model) = self.model.read().as_ref() {
            return Ok(model.clone());
        }

        let _guard = self.init_lock.lock();
        if let Some(model) = self.model.read().as_ref() {
            return Ok(model.clone());
        }

        info!("loading embedding model {}", self.config.model_name);
        let model = self.loader.load(&self.config).map_err(|err| match err {
            err @ (LegisearchError::Model { .. } | LegisearchError::InvalidConfig(_)) => err,
            other => LegisearchError::model_with_source(
                format!("failed to load embedding model {}", self.config.model_name),
                other,
            ),
        })?;
        if model.dimension() != self.config.dimension {
            return Err(LegisearchError::dimension_mismatch(
                self.config.dimension,
                model.dimension(),
            ));
        }

        *self.model.write() = Some(model.clone());
        self.loads.fetch_add(1, Ordering::SeqCst);
        info!(
            "embedding model {} ready ({} dimensions)",
            model.name(),
            model.dimension()
        );
        Ok(model)
    }

    fn executor(&self) -> Result<Arc<EmbedderExecutor>> {
        let mut guard = self.executor.lock();
        if let Some(executor) = guard.as_ref() {
            return Ok(executor.clone());
        }
        let executor = Arc::new(EmbedderExecutor::new()?);
        *guard = Some(executor.clone());
        Ok(executor)
    }

    fn prepare(&self, text: &str) -> String {
        let truncated = self.truncation.apply(text);
        if truncated.len() != text.len() {
            debug!(
                "truncated text from {} to {} characters",
                text.chars().count(),
                truncated.chars().count()
            );
        }
        truncated.into_owned()
    }

    fn check_and_normalize(&self, mut vector: Vec<f32>, normalize: bool) -> Result<Vec<f32>> {
        if vector.len() != self.config.dimension {
            return Err(LegisearchError::dimension_mismatch(
                self.config.dimension,
                vector.len(),
            ));
        }
        if normalize {
            if vector.iter().all(|v| *v == 0.0) {
                return Err(LegisearchError::model(
                    "model returned a zero vector, which cannot be normalized",
                ));
            }
            l2_normalize(&mut vector);
        }
        Ok(vector)
    }

    /// Encode one text into a vector of exactly [`dimension`](Self::dimension) values.
    ///
    /// Fails with `InvalidInput` for empty or whitespace-only text. Long texts
    /// are smart-truncated first.
    pub fn encode(&self, text: &str, normalize: bool) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(LegisearchError::invalid_input("text must not be empty"));
        }

        let prepared = self.prepare(text);
        let model = self.model()?;
        let vector = self
            .executor()?
            .run(async move { model.embed(&prepared).await })?;
        self.check_and_normalize(vector, normalize)
    }

    /// Encode several texts, skipping empty ones.
    ///
    /// Only vectors for the non-empty inputs are returned, in input order.
    /// Fails with `InvalidInput` if no input is usable.
    pub fn encode_batch<S: AsRef<str>>(&self, texts: &[S], normalize: bool) -> Result<Vec<Vec<f32>>> {
        Ok(self
            .encode_batch_indexed(texts, normalize)?
            .into_iter()
            .map(|(_, vector)| vector)
            .collect())
    }

    /// Like [`encode_batch`](Self::encode_batch) but pairs every vector with
    /// the index of the input it came from.
    pub fn encode_batch_indexed<S: AsRef<str>>(
        &self,
        texts: &[S],
        normalize: bool,
    ) -> Result<Vec<(usize, Vec<f32>)>> {
        let mut indices = Vec::with_capacity(texts.len());
        let mut prepared = Vec::with_capacity(texts.len());
        for (idx, text) in texts.iter().enumerate() {
            let text = text.as_ref();
            if text.trim().is_empty() {
                warn!("skipping empty text at batch position {idx}");
                continue;
            }
            indices.push(idx);
            prepared.push(self.prepare(text));
        }

        if prepared.is_empty() {
            return Err(LegisearchError::invalid_input(
                "no valid texts to encode after filtering",
            ));
        }

        let model = self.model()?;
        let executor = self.executor()?;
        let mut results = Vec::with_capacity(prepared.len());
        let mut positions = indices.into_iter();

        for chunk in prepared.chunks(self.config.batch_size) {
            let batch = chunk.to_vec();
            let model = model.clone();
            let vectors = executor.run(async move { model.embed_batch(&batch).await })?;
            if vectors.len() != chunk.len() {
                return Err(LegisearchError::model(format!(
                    "model returned {} vectors for a batch of {}",
                    vectors.len(),
                    chunk.len()
                )));
            }
            for vector in vectors {
                let idx = positions
                    .next()
                    .ok_or_else(|| LegisearchError::internal("batch index out of range"))?;
                results.push((idx, self.check_and_normalize(vector, normalize)?));
            }
        }

        debug!("encoded {} of {} texts", results.len(), texts.len());
        Ok(results)
    }

    /// Model metadata. Never triggers a load.
    ///
    /// Once loaded, the name is the one the running model reports. Before
    /// that it is the name the configured backend will load.
    pub fn get_model_info(&self) -> ModelInfo {
        let model = self.model.read().clone();
        let model_name = match &model {
            Some(model) => model.name().to_string(),
            None => match self.config.backend {
                EmbeddingBackend::Hashing => HASHING_MODEL_NAME.to_string(),
                EmbeddingBackend::Candle => self.config.model_name.clone(),
            },
        };
        ModelInfo {
            model_name,
            max_tokens: self.config.max_tokens,
            dimension: self.config.dimension,
            initialized: model.is_some(),
            max_sequence_length: model.and_then(|m| m.max_sequence_length()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use async_trait::async_trait;

    use super::*;

    /// Returns the same vector for every input.
    #[derive(Debug)]
    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }

        fn dimension(&self) -> usize {
            self.0.len()
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn generator() -> EmbeddingGenerator {
        let config = EmbeddingConfig {
            dimension: 64,
            ..Default::default()
        };
        EmbeddingGenerator::new(config, DefaultModelLoader::default()).unwrap()
    }

    #[test]
    fn test_encode_normalizes() {
        let v = generator().encode("ley de transparencia", true).unwrap();
        assert_eq!(v.len(), 64);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_encode_rejects_blank_text() {
        let generator = generator();
        assert!(matches!(
            generator.encode("", true),
            Err(LegisearchError::InvalidInput(_))
        ));
        assert!(matches!(
            generator.encode("  \n\t", true),
            Err(LegisearchError::InvalidInput(_))
        ));
        // Validation happens before the model is touched.
        assert!(!generator.is_initialized());
    }

    #[test]
    fn test_encode_batch_skips_invalid_entries() {
        let generator = generator();
        let texts = ["salud mental", "", "educación", "   "];
        let indexed = generator.encode_batch_indexed(&texts, true).unwrap();

        let indices: Vec<usize> = indexed.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(indexed[0].1, generator.encode("salud mental", true).unwrap());
    }

    #[test]
    fn test_encode_batch_all_invalid_fails() {
        let texts: Vec<String> = vec!["".into(), " ".into()];
        assert!(matches!(
            generator().encode_batch(&texts, true),
            Err(LegisearchError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_batches_larger_than_batch_size() {
        let config = EmbeddingConfig {
            dimension: 32,
            batch_size: 2,
            ..Default::default()
        };
        let generator = EmbeddingGenerator::new(config, DefaultModelLoader::default()).unwrap();
        let texts: Vec<String> = (0..5).map(|i| format!("documento número {i}")).collect();
        assert_eq!(generator.encode_batch(&texts, false).unwrap().len(), 5);
    }

    #[test]
    fn test_model_info_does_not_load() {
        let generator = generator();
        let info = generator.get_model_info();
        assert!(!info.initialized);
        assert_eq!(info.dimension, 64);
        assert_eq!(info.max_tokens, 512);
        assert_eq!(generator.load_count(), 0);

        generator.encode("texto", true).unwrap();
        assert!(generator.get_model_info().initialized);
    }

    #[test]
    fn test_model_info_names_the_loaded_model() {
        let generator = generator();
        assert_eq!(generator.get_model_info().model_name, "hashing");

        let model = generator.model().unwrap();
        assert_eq!(generator.get_model_info().model_name, model.name());

        let loader = |config: &EmbeddingConfig| -> Result<Arc<dyn Embedder>> {
            Ok(Arc::new(FixedEmbedder(vec![1.0; config.dimension])))
        };
        let custom = EmbeddingGenerator::new(EmbeddingConfig::default(), loader).unwrap();
        custom.encode("texto", true).unwrap();
        assert_eq!(custom.get_model_info().model_name, "fixed");
    }

    #[test]
    fn test_candle_backend_reports_configured_name_before_load() {
        let config = EmbeddingConfig {
            backend: EmbeddingBackend::Candle,
            ..Default::default()
        };
        let generator = EmbeddingGenerator::new(config, DefaultModelLoader::default()).unwrap();
        assert_eq!(
            generator.get_model_info().model_name,
            "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2"
        );
    }

    #[test]
    fn test_zero_vector_cannot_be_normalized() {
        let loader = |config: &EmbeddingConfig| -> Result<Arc<dyn Embedder>> {
            Ok(Arc::new(FixedEmbedder(vec![0.0; config.dimension])))
        };
        let generator = EmbeddingGenerator::new(EmbeddingConfig::default(), loader).unwrap();
        assert!(matches!(
            generator.encode("texto", true),
            Err(LegisearchError::Model { .. })
        ));
        assert_eq!(generator.encode("texto", false).unwrap().len(), 384);
    }

    #[test]
    fn test_stop_word_text_encodes_to_unit_vector() {
        let generator = generator();
        for text in ["de la y", "el", "¿?"] {
            let v = generator.encode(text, true).unwrap();
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5, "{text}");
        }
    }

    #[tokio::test]
    async fn test_drop_inside_async_context() {
        let generator = generator();
        generator.encode("ley de salud mental", true).unwrap();
        drop(generator);
    }

    #[test]
    fn test_wrong_model_dimension_is_fatal() {
        let config = EmbeddingConfig {
            dimension: 16,
            ..Default::default()
        };
        let loader = |_: &EmbeddingConfig| -> Result<Arc<dyn Embedder>> {
            Ok(Arc::new(HashingEmbedder::new(8, Language::Spanish)?))
        };
        let generator = EmbeddingGenerator::new(config, loader).unwrap();
        assert!(matches!(
            generator.encode("texto", true),
            Err(LegisearchError::DimensionMismatch {
                expected: 16,
                actual: 8
            })
        ));
    }

    #[test]
    fn test_load_failure_is_model_error() {
        let loader = |_: &EmbeddingConfig| -> Result<Arc<dyn Embedder>> {
            Err(LegisearchError::storage("weights missing"))
        };
        let generator = EmbeddingGenerator::new(EmbeddingConfig::default(), loader).unwrap();
        assert!(matches!(
            generator.encode("texto", true),
            Err(LegisearchError::Model { .. })
        ));
    }

    #[cfg(not(feature = "embeddings-candle"))]
    #[test]
    fn test_candle_backend_requires_feature() {
        let config = EmbeddingConfig {
            backend: EmbeddingBackend::Candle,
            ..Default::default()
        };
        let generator = EmbeddingGenerator::new(config, DefaultModelLoader::default()).unwrap();
        assert!(matches!(
            generator.model(),
            Err(LegisearchError::InvalidConfig(_))
        ));
    }
}
