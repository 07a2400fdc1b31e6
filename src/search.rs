//! Hybrid search: candidate providers, reciprocal rank fusion and the engine
//! that ties them to the embedding generator and the document store.
//!
//! ```text
//! query ─┬─ EmbeddingGenerator ─ SemanticProvider ─┐
//!        │                                         ├─ reciprocal_rank_fusion ─ RankedResult
//!        └──────────────────────  LexicalProvider ─┘
//! ```

pub mod engine;
pub mod fusion;
pub mod provider;
pub mod request;
pub mod types;

pub use engine::HybridSearchEngine;
pub use fusion::{FusedCandidate, reciprocal_rank_fusion};
pub use provider::{Candidate, CandidateList, LexicalProvider, PreparedQuery, SemanticProvider, TopKProvider};
pub use request::{SearchRequest, SearchRequestBuilder};
pub use types::{KeywordResult, RankedResult, SearchMode, SearchStats, SemanticResult};
