//! Configuration for embedding, search and text analysis.
//!
//! A [`LegisearchConfig`] can be built in code through
//! [`LegisearchConfig::builder`] or loaded from a TOML file:
//!
//! ```toml
//! [embedding]
//! backend = "hashing"
//! dimension = 384
//!
//! [search]
//! rrf_k = 60.0
//! top_k_candidates = 100
//!
//! [analysis]
//! language = "spanish"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::Language;
use crate::error::{LegisearchError, Result};
use crate::vector::DistanceMetric;

pub const DEFAULT_MODEL_NAME: &str = "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";
pub const DEFAULT_DIMENSION: usize = 384;
pub const DEFAULT_MAX_TOKENS: usize = 512;
pub const DEFAULT_RRF_K: f64 = 60.0;

/// Which embedding model implementation to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Deterministic feature-hashing embedder. Needs no model download.
    #[default]
    Hashing,
    /// Sentence-transformer run with candle (`embeddings-candle` feature).
    Candle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model_name: String,
    pub backend: EmbeddingBackend,
    pub dimension: usize,
    /// Token budget before smart truncation kicks in.
    pub max_tokens: usize,
    /// Characters per token used to turn `max_tokens` into a character budget.
    pub chars_per_token: usize,
    /// Share of the character budget kept from the start of long texts.
    pub head_ratio: f64,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            backend: EmbeddingBackend::default(),
            dimension: DEFAULT_DIMENSION,
            max_tokens: DEFAULT_MAX_TOKENS,
            chars_per_token: 4,
            head_ratio: 0.7,
            batch_size: 32,
        }
    }
}

impl EmbeddingConfig {
    /// Character budget for a single text.
    pub fn max_chars(&self) -> usize {
        self.max_tokens * self.chars_per_token
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_name.trim().is_empty() {
            return Err(LegisearchError::invalid_config("model_name must not be empty"));
        }
        if self.dimension == 0 {
            return Err(LegisearchError::invalid_config("dimension must be greater than 0"));
        }
        if self.max_tokens == 0 || self.chars_per_token == 0 {
            return Err(LegisearchError::invalid_config(
                "max_tokens and chars_per_token must be greater than 0",
            ));
        }
        if !(self.head_ratio > 0.0 && self.head_ratio < 1.0) {
            return Err(LegisearchError::invalid_config(format!(
                "head_ratio must be in (0, 1), got {}",
                self.head_ratio
            )));
        }
        if self.batch_size == 0 {
            return Err(LegisearchError::invalid_config("batch_size must be greater than 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// RRF smoothing constant.
    pub rrf_k: f64,
    /// Candidates fetched per modality before fusion.
    pub top_k_candidates: usize,
    pub default_limit: usize,
    pub max_limit: usize,
    pub distance: DistanceMetric,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rrf_k: DEFAULT_RRF_K,
            top_k_candidates: 100,
            default_limit: 20,
            max_limit: 100,
            distance: DistanceMetric::Cosine,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.rrf_k.is_finite() || self.rrf_k < 0.0 {
            return Err(LegisearchError::invalid_config(format!(
                "rrf_k must be finite and non-negative, got {}",
                self.rrf_k
            )));
        }
        if self.max_limit == 0 {
            return Err(LegisearchError::invalid_config("max_limit must be greater than 0"));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(LegisearchError::invalid_config(format!(
                "default_limit must be in [1, {}], got {}",
                self.max_limit, self.default_limit
            )));
        }
        Ok(())
    }

    /// Clamp a requested result count to `[1, max_limit]`.
    pub fn clamp_limit(&self, limit: usize) -> usize {
        limit.clamp(1, self.max_limit.max(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub language: Language,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegisearchConfig {
    pub embedding: EmbeddingConfig,
    pub search: SearchConfig,
    pub analysis: AnalysisConfig,
}

impl LegisearchConfig {
    pub fn builder() -> LegisearchConfigBuilder {
        LegisearchConfigBuilder::default()
    }

    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LegisearchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_toml_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.embedding.validate()?;
        self.search.validate()
    }
}

#[derive(Default)]
pub struct LegisearchConfigBuilder {
    config: LegisearchConfig,
}

impl LegisearchConfigBuilder {
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.config.embedding.model_name = model_name.into();
        self
    }

    pub fn backend(mut self, backend: EmbeddingBackend) -> Self {
        self.config.embedding.backend = backend;
        self
    }

    pub fn dimension(mut self, dimension: usize) -> Self {
        self.config.embedding.dimension = dimension;
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.embedding.max_tokens = max_tokens;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.embedding.batch_size = batch_size;
        self
    }

    pub fn rrf_k(mut self, k: f64) -> Self {
        self.config.search.rrf_k = k;
        self
    }

    pub fn top_k_candidates(mut self, top_k: usize) -> Self {
        self.config.search.top_k_candidates = top_k;
        self
    }

    pub fn distance(mut self, distance: DistanceMetric) -> Self {
        self.config.search.distance = distance;
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.config.analysis.language = language;
        self
    }

    pub fn build(self) -> Result<LegisearchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
