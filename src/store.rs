//! Document store contract and the in-memory implementation.
//!
//! The search engine only needs four things from storage: nearest neighbors
//! by vector, lexical matches by parsed query, document lookup and coverage
//! counts. Any backend that can answer those implements [`DocumentStore`].

pub mod memory;
pub mod snapshot;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::Analyzer;
use crate::data::{DocId, Document};
use crate::error::Result;
use crate::lexical::LexicalQuery;

pub use memory::InMemoryDocumentStore;

/// A document returned by nearest-neighbor search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorHit {
    pub doc_id: DocId,
    pub distance: f32,
}

/// A document returned by full-text search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalHit {
    pub doc_id: DocId,
    pub score: f32,
}

/// Corpus-wide counts of derived search fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageCounts {
    pub total_documents: usize,
    pub with_embedding: usize,
    pub with_lexical_index: usize,
    /// Documents that have both an embedding and a lexical representation.
    pub fully_searchable: usize,
}

/// Read interface the search engine requires from storage.
pub trait DocumentStore: Send + Sync {
    /// Length of the stored embeddings.
    fn dimension(&self) -> usize;

    /// Analyzer the lexical representation was built with.
    fn analyzer(&self) -> Arc<dyn Analyzer>;

    /// Up to `limit` documents with an embedding, by ascending distance to
    /// `vector`, ties broken by ascending id.
    fn nearest_by_vector(&self, vector: &[f32], limit: usize) -> Result<Vec<VectorHit>>;

    /// Up to `limit` documents with a lexical representation matching
    /// `query`, by descending score, ties broken by ascending id.
    fn search_lexical(&self, query: &LexicalQuery, limit: usize) -> Result<Vec<LexicalHit>>;

    /// Fetch documents by id. Unknown ids are absent from the map.
    fn get_documents(&self, ids: &[DocId]) -> Result<HashMap<DocId, Document>>;

    fn coverage(&self) -> Result<CoverageCounts>;
}
