//! In-memory document store backed by a flat vector index and a positional
//! inverted index.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};
use parking_lot::RwLock;

use crate::analysis::{Analyzer, LanguageAnalyzer};
use crate::config::LegisearchConfig;
use crate::data::{DocId, Document};
use crate::error::{LegisearchError, Result};
use crate::lexical::{LexicalIndex, LexicalQuery};
use crate::store::snapshot::{SNAPSHOT_VERSION, SnapshotEntry, StoreSnapshot};
use crate::store::{CoverageCounts, DocumentStore, LexicalHit, VectorHit};
use crate::vector::{DistanceMetric, FlatVectorIndex};

struct StoreInner {
    documents: BTreeMap<DocId, Document>,
    vectors: FlatVectorIndex,
    lexical: LexicalIndex,
}

/// Thread-safe in-memory [`DocumentStore`].
///
/// Inserting a document computes its lexical representation right away.
/// Embeddings are attached separately through
/// [`set_embedding`](Self::set_embedding), usually by the backfill job.
pub struct InMemoryDocumentStore {
    dimension: usize,
    analyzer: Arc<dyn Analyzer>,
    inner: RwLock<StoreInner>,
}

impl fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("InMemoryDocumentStore")
            .field("dimension", &self.dimension)
            .field("analyzer", &self.analyzer.name())
            .field("documents", &inner.documents.len())
            .field("with_embedding", &inner.vectors.len())
            .field("with_lexical_index", &inner.lexical.len())
            .finish()
    }
}

impl InMemoryDocumentStore {
    pub fn new(dimension: usize, metric: DistanceMetric, analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            dimension,
            analyzer,
            inner: RwLock::new(StoreInner {
                documents: BTreeMap::new(),
                vectors: FlatVectorIndex::new(dimension, metric),
                lexical: LexicalIndex::new(),
            }),
        }
    }

    pub fn from_config(config: &LegisearchConfig) -> Self {
        Self::new(
            config.embedding.dimension,
            config.search.distance,
            Arc::new(LanguageAnalyzer::new(config.analysis.language)),
        )
    }

    pub fn metric(&self) -> DistanceMetric {
        self.inner.read().vectors.metric()
    }

    pub fn len(&self) -> usize {
        self.inner.read().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().documents.is_empty()
    }

    /// Insert or replace a document and compute its lexical representation.
    ///
    /// If a replaced document's embedding text changed, its embedding is
    /// dropped so the backfill job regenerates it.
    pub fn insert(&self, document: Document) {
        let mut inner = self.inner.write();
        inner
            .lexical
            .index_document(document.id, &document.lexical_fields(), self.analyzer.as_ref());
        Self::store_document(&mut inner, document);
    }

    /// Insert or replace a document without a lexical representation.
    pub fn insert_unindexed(&self, document: Document) {
        let mut inner = self.inner.write();
        inner.lexical.remove(document.id);
        Self::store_document(&mut inner, document);
    }

    fn store_document(inner: &mut StoreInner, document: Document) {
        let id = document.id;
        if let Some(previous) = inner.documents.insert(id, document) {
            let changed = inner
                .documents
                .get(&id)
                .is_some_and(|doc| doc.embedding_text() != previous.embedding_text());
            if changed && inner.vectors.remove(id).is_some() {
                debug!("content of document {id} changed, embedding dropped");
            }
        }
    }

    pub fn remove(&self, doc_id: DocId) -> Option<Document> {
        let mut inner = self.inner.write();
        inner.vectors.remove(doc_id);
        inner.lexical.remove(doc_id);
        inner.documents.remove(&doc_id)
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.documents.clear();
        inner.vectors.clear();
        inner.lexical.clear();
    }

    pub fn get(&self, doc_id: DocId) -> Option<Document> {
        self.inner.read().documents.get(&doc_id).cloned()
    }

    /// All documents in ascending id order.
    pub fn documents(&self) -> Vec<Document> {
        self.inner.read().documents.values().cloned().collect()
    }

    /// All document ids in ascending order.
    pub fn ids(&self) -> Vec<DocId> {
        self.inner.read().documents.keys().copied().collect()
    }

    /// Attach or replace the embedding of an existing document.
    pub fn set_embedding(&self, doc_id: DocId, embedding: Vec<f32>) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.documents.contains_key(&doc_id) {
            return Err(LegisearchError::storage(format!(
                "document {doc_id} not found"
            )));
        }
        inner.vectors.insert(doc_id, embedding)
    }

    pub fn embedding(&self, doc_id: DocId) -> Option<Vec<f32>> {
        self.inner.read().vectors.get(doc_id).map(<[f32]>::to_vec)
    }

    pub fn has_embedding(&self, doc_id: DocId) -> bool {
        self.inner.read().vectors.contains(doc_id)
    }

    pub fn has_lexical_index(&self, doc_id: DocId) -> bool {
        self.inner.read().lexical.contains(doc_id)
    }

    /// Ids of documents that still need an embedding, ascending.
    pub fn ids_without_embedding(&self) -> Vec<DocId> {
        let inner = self.inner.read();
        inner
            .documents
            .keys()
            .filter(|id| !inner.vectors.contains(**id))
            .copied()
            .collect()
    }

    /// Ids of documents without a lexical representation, ascending.
    pub fn ids_without_lexical_index(&self) -> Vec<DocId> {
        let inner = self.inner.read();
        inner
            .documents
            .keys()
            .filter(|id| !inner.lexical.contains(**id))
            .copied()
            .collect()
    }

    /// Compute the lexical representation of an existing document.
    pub fn index_lexical(&self, doc_id: DocId) -> Result<()> {
        let mut inner = self.inner.write();
        let inner = &mut *inner;
        let document = inner
            .documents
            .get(&doc_id)
            .ok_or_else(|| LegisearchError::storage(format!("document {doc_id} not found")))?;
        inner
            .lexical
            .index_document(doc_id, &document.lexical_fields(), self.analyzer.as_ref());
        Ok(())
    }

    /// Copy the whole store into a serializable snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.read();
        StoreSnapshot {
            version: SNAPSHOT_VERSION,
            dimension: self.dimension,
            metric: inner.vectors.metric(),
            analyzer: self.analyzer.name().to_string(),
            created_at: Utc::now(),
            documents: inner
                .documents
                .values()
                .map(|doc| SnapshotEntry {
                    document: doc.clone(),
                    embedding: inner.vectors.get(doc.id).map(<[f32]>::to_vec),
                    lexical_indexed: inner.lexical.contains(doc.id),
                })
                .collect(),
        }
    }

    /// Replace the store contents with `snapshot`.
    ///
    /// Lexical representations are rebuilt with this store's analyzer. The
    /// store is left untouched if the snapshot is rejected. Returns the number
    /// of documents restored.
    pub fn restore(&self, snapshot: StoreSnapshot) -> Result<usize> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LegisearchError::storage(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        if snapshot.dimension != self.dimension {
            return Err(LegisearchError::dimension_mismatch(
                self.dimension,
                snapshot.dimension,
            ));
        }
        if snapshot.analyzer != self.analyzer.name() {
            warn!(
                "snapshot was indexed with analyzer '{}', re-indexing with '{}'",
                snapshot.analyzer,
                self.analyzer.name()
            );
        }

        let mut rebuilt = StoreInner {
            documents: BTreeMap::new(),
            vectors: FlatVectorIndex::new(self.dimension, snapshot.metric),
            lexical: LexicalIndex::new(),
        };
        for entry in snapshot.documents {
            let id = entry.document.id;
            if let Some(embedding) = entry.embedding {
                rebuilt.vectors.insert(id, embedding)?;
            }
            if entry.lexical_indexed {
                rebuilt.lexical.index_document(
                    id,
                    &entry.document.lexical_fields(),
                    self.analyzer.as_ref(),
                );
            }
            rebuilt.documents.insert(id, entry.document);
        }

        let count = rebuilt.documents.len();
        *self.inner.write() = rebuilt;
        Ok(count)
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn analyzer(&self) -> Arc<dyn Analyzer> {
        self.analyzer.clone()
    }

    fn nearest_by_vector(&self, vector: &[f32], limit: usize) -> Result<Vec<VectorHit>> {
        let hits = self.inner.read().vectors.knn(vector, limit)?;
        Ok(hits
            .into_iter()
            .map(|(doc_id, distance)| VectorHit { doc_id, distance })
            .collect())
    }

    fn search_lexical(&self, query: &LexicalQuery, limit: usize) -> Result<Vec<LexicalHit>> {
        Ok(self
            .inner
            .read()
            .lexical
            .search(query, limit)
            .into_iter()
            .map(|(doc_id, score)| LexicalHit { doc_id, score })
            .collect())
    }

    fn get_documents(&self, ids: &[DocId]) -> Result<HashMap<DocId, Document>> {
        let inner = self.inner.read();
        Ok(ids
            .iter()
            .filter_map(|id| inner.documents.get(id).map(|doc| (*id, doc.clone())))
            .collect())
    }

    fn coverage(&self) -> Result<CoverageCounts> {
        let inner = self.inner.read();
        let fully_searchable = inner
            .documents
            .keys()
            .filter(|id| inner.vectors.contains(**id) && inner.lexical.contains(**id))
            .count();
        Ok(CoverageCounts {
            total_documents: inner.documents.len(),
            with_embedding: inner.vectors.len(),
            with_lexical_index: inner.lexical.len(),
            fully_searchable,
        })
    }
}
