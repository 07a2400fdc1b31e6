//! Sentence-transformer embedder running a BERT-family model with candle.
//!
//! Model files (`config.json`, `tokenizer.json`, `model.safetensors`) are
//! fetched from the Hugging Face hub and cached locally on first use.

use std::any::Any;
use std::fmt;

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use serde::Deserialize;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::embedding::embedder::Embedder;
use crate::error::{LegisearchError, Result};

/// Shape parameters read from `config.json`.
#[derive(Deserialize)]
struct ModelShape {
    hidden_size: usize,
    max_position_embeddings: usize,
}

pub struct CandleBertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    model_name: String,
    dimension: usize,
    max_sequence_length: usize,
}

fn candle_err(context: &'static str) -> impl FnOnce(candle_core::Error) -> LegisearchError {
    move |err| LegisearchError::model(format!("{context}: {err}"))
}

fn hub_err(context: String) -> impl FnOnce(hf_hub::api::sync::ApiError) -> LegisearchError {
    move |err| LegisearchError::model(format!("{context}: {err}"))
}

impl CandleBertEmbedder {
    /// Download (or reuse the cached copy of) `model_name` and load it on the CPU.
    pub fn new(model_name: &str) -> Result<Self> {
        let api = Api::new().map_err(hub_err("failed to create Hugging Face hub client".into()))?;
        let repo = api.repo(Repo::new(model_name.to_string(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .map_err(hub_err(format!("failed to fetch config.json for {model_name}")))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(hub_err(format!("failed to fetch tokenizer.json for {model_name}")))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(hub_err(format!("failed to fetch model.safetensors for {model_name}")))?;

        let config_json = std::fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_json)?;
        let shape: ModelShape = serde_json::from_str(&config_json)?;

        let device = Device::Cpu;
        let weights = std::fs::read(weights_path)?;
        let vb = VarBuilder::from_buffered_safetensors(weights, DTYPE, &device)
            .map_err(candle_err("failed to read model weights"))?;
        let model = BertModel::load(vb, &config).map_err(candle_err("failed to build BERT model"))?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|err| LegisearchError::model_with_source("failed to load tokenizer", err))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: shape.max_position_embeddings,
                ..Default::default()
            }))
            .map_err(|err| LegisearchError::model_with_source("invalid truncation settings", err))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        log::info!(
            "loaded candle model {model_name} ({} dimensions, {} max tokens)",
            shape.hidden_size,
            shape.max_position_embeddings
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            model_name: model_name.to_string(),
            dimension: shape.hidden_size,
            max_sequence_length: shape.max_position_embeddings,
        })
    }

    /// Tokenize, run the encoder and mean-pool over the attention mask.
    fn embed_texts(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts, true)
            .map_err(|err| LegisearchError::model_with_source("tokenization failed", err))?;

        let ids = encodings
            .iter()
            .map(|enc| Tensor::new(enc.get_ids(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()
            .map_err(candle_err("failed to build input tensor"))?;
        let masks = encodings
            .iter()
            .map(|enc| Tensor::new(enc.get_attention_mask(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()
            .map_err(candle_err("failed to build attention mask"))?;

        let input_ids = Tensor::stack(&ids, 0).map_err(candle_err("failed to stack inputs"))?;
        let attention_mask =
            Tensor::stack(&masks, 0).map_err(candle_err("failed to stack attention masks"))?;
        let token_type_ids = input_ids
            .zeros_like()
            .map_err(candle_err("failed to build token type ids"))?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(candle_err("forward pass failed"))?;

        let mask = attention_mask
            .to_dtype(DTYPE)
            .and_then(|m| m.unsqueeze(2))
            .map_err(candle_err("failed to prepare pooling mask"))?;
        let summed = hidden
            .broadcast_mul(&mask)
            .and_then(|t| t.sum(1))
            .map_err(candle_err("failed to sum token embeddings"))?;
        let counts = mask.sum(1).map_err(candle_err("failed to count tokens"))?;
        let pooled = summed
            .broadcast_div(&counts)
            .map_err(candle_err("failed to mean-pool"))?;

        pooled
            .to_vec2::<f32>()
            .map_err(candle_err("failed to read embeddings"))
    }
}

impl fmt::Debug for CandleBertEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandleBertEmbedder")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("max_sequence_length", &self.max_sequence_length)
            .finish()
    }
}

#[async_trait]
impl Embedder for CandleBertEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_texts(vec![text])?
            .pop()
            .ok_or_else(|| LegisearchError::model("model returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed_texts(texts.iter().map(String::as_str).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn max_sequence_length(&self) -> Option<usize> {
        Some(self.max_sequence_length)
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
