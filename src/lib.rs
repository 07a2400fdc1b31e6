//! # Legisearch
//!
//! Hybrid document search for legislative and news corpora.
//!
//! ## Features
//!
//! - Semantic search over fixed-dimension embeddings
//! - Language-aware full-text search (diacritic folding, stop words, stemming)
//! - Reciprocal Rank Fusion of both rankings with per-modality ranks
//! - Lazily loaded, shared embedding model with smart truncation
//! - IR evaluation harness (Precision@K, recall, MRR, MAP, NDCG, latency)
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use legisearch::{
//!     Document, EmbeddingGenerator, HybridSearchEngine, InMemoryDocumentStore, LegisearchConfig,
//! };
//!
//! # fn main() -> legisearch::Result<()> {
//! let config = LegisearchConfig::builder().dimension(64).build()?;
//! let store = Arc::new(InMemoryDocumentStore::from_config(&config));
//! let generator = Arc::new(EmbeddingGenerator::from_config(&config)?);
//!
//! let doc = Document::new(1, "Ley de transparencia y combate a la corrupción");
//! let embedding = generator.encode(&doc.embedding_text(), true)?;
//! store.insert(doc);
//! store.set_embedding(1, embedding)?;
//!
//! let engine = HybridSearchEngine::new(store, generator, config.search.clone())?;
//! let results = engine.search_documents("transparencia", 10, 60.0, 100)?;
//! assert_eq!(results[0].doc_id, 1);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
mod data;
pub mod embedding;
mod error;
pub mod evaluation;
pub mod indexer;
pub mod lexical;
pub mod search;
pub mod store;
pub mod vector;

// Re-exports for the public API
pub use analysis::{Analyzer, Language, LanguageAnalyzer};
pub use config::{EmbeddingBackend, EmbeddingConfig, LegisearchConfig, SearchConfig};
pub use data::{DocId, Document};
#[cfg(feature = "embeddings-candle")]
pub use embedding::candle_bert_embedder::CandleBertEmbedder;
pub use embedding::embedder::Embedder;
pub use embedding::generator::{DefaultModelLoader, EmbeddingGenerator, ModelInfo, ModelLoader};
pub use embedding::hashing::HashingEmbedder;
pub use error::{LegisearchError, Result};
pub use evaluation::{EvaluationReport, LabeledQuery, evaluate_search_quality};
pub use indexer::{BackfillOptions, BackfillReport, backfill_embeddings, reindex_lexical};
pub use search::{
    HybridSearchEngine, KeywordResult, RankedResult, SearchMode, SearchRequest, SearchStats,
    SemanticResult,
};
pub use store::{DocumentStore, InMemoryDocumentStore};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
