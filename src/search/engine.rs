//! The hybrid search engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use crate::config::SearchConfig;
use crate::data::{DocId, Document};
use crate::embedding::generator::EmbeddingGenerator;
use crate::error::{LegisearchError, Result};
use crate::search::fusion::reciprocal_rank_fusion;
use crate::search::provider::{LexicalProvider, PreparedQuery, SemanticProvider, TopKProvider};
use crate::search::request::SearchRequest;
use crate::search::types::{KeywordResult, RankedResult, SearchStats, SemanticResult};
use crate::store::DocumentStore;

fn retrieval_failed(what: &'static str) -> impl FnOnce(LegisearchError) -> LegisearchError {
    move |err| match err {
        err @ LegisearchError::Search { .. } => err,
        other => LegisearchError::search_with_source(format!("{what} failed"), other),
    }
}

/// Fuses semantic and lexical rankings over a [`DocumentStore`].
///
/// All operations are read-only and blocking. The engine is `Send + Sync` and
/// can be shared across threads behind an `Arc`.
pub struct HybridSearchEngine {
    store: Arc<dyn DocumentStore>,
    generator: Arc<EmbeddingGenerator>,
    config: SearchConfig,
    semantic: SemanticProvider,
    lexical: LexicalProvider,
}

impl HybridSearchEngine {
    /// Fails if the generator and the store disagree on the vector dimension.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<EmbeddingGenerator>,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate()?;
        if generator.dimension() != store.dimension() {
            return Err(LegisearchError::dimension_mismatch(
                store.dimension(),
                generator.dimension(),
            ));
        }

        Ok(Self {
            semantic: SemanticProvider::new(store.clone()),
            lexical: LexicalProvider::new(store.clone()),
            store,
            generator,
            config,
        })
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn generator(&self) -> &Arc<EmbeddingGenerator> {
        &self.generator
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn validate_query(query: &str) -> Result<&str> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(LegisearchError::invalid_input("query must not be empty"));
        }
        Ok(trimmed)
    }

    /// Run a hybrid search.
    ///
    /// The query is embedded once; both providers are asked for up to
    /// `top_k_candidates` documents and their lists are fused with RRF. An
    /// empty result is a valid outcome, retrieval failures are `Search`
    /// errors.
    pub fn search(&self, request: &SearchRequest) -> Result<Vec<RankedResult>> {
        let query = Self::validate_query(&request.query)?;
        if !request.rrf_k.is_finite() || request.rrf_k < 0.0 {
            return Err(LegisearchError::invalid_input(format!(
                "k must be finite and non-negative, got {}",
                request.rrf_k
            )));
        }
        let limit = self.config.clamp_limit(request.limit);
        let top_k = request.top_k_candidates.max(1);

        let start = Instant::now();
        let embedding = self.generator.encode(query, true)?;
        let prepared = PreparedQuery::new(query).with_embedding(&embedding);

        let semantic = self
            .semantic
            .top_k(&prepared, top_k)
            .map_err(retrieval_failed("semantic candidate retrieval"))?;
        let lexical = self
            .lexical
            .top_k(&prepared, top_k)
            .map_err(retrieval_failed("lexical candidate retrieval"))?;

        let mut fused = reciprocal_rank_fusion(&semantic, &lexical, request.rrf_k);
        fused.truncate(limit);

        let ids: Vec<DocId> = fused.iter().map(|c| c.doc_id).collect();
        let mut documents = self.fetch_documents(&ids)?;
        let results: Vec<RankedResult> = fused
            .into_iter()
            .filter_map(|candidate| {
                let document = documents.remove(&candidate.doc_id)?;
                Some(RankedResult {
                    doc_id: candidate.doc_id,
                    rrf_score: candidate.rrf_score,
                    semantic_rank: candidate.semantic_rank,
                    lexical_rank: candidate.lexical_rank,
                    document,
                })
            })
            .collect();

        let both = results
            .iter()
            .filter(|r| r.semantic_rank.is_some() && r.lexical_rank.is_some())
            .count();
        let semantic_only = results.iter().filter(|r| r.lexical_rank.is_none()).count();
        let lexical_only = results.iter().filter(|r| r.semantic_rank.is_none()).count();
        info!(
            "hybrid search '{query}': {} results ({both} both, {semantic_only} semantic only, \
             {lexical_only} lexical only) from {} semantic and {} lexical candidates in {:?}",
            results.len(),
            semantic.len(),
            lexical.len(),
            start.elapsed()
        );

        Ok(results)
    }

    /// Hybrid search with explicit parameters.
    pub fn search_documents(
        &self,
        query: &str,
        limit: usize,
        k: f64,
        top_k_candidates: usize,
    ) -> Result<Vec<RankedResult>> {
        self.search(
            &SearchRequest::builder(query)
                .limit(limit)
                .rrf_k(k)
                .top_k_candidates(top_k_candidates)
                .build(),
        )
    }

    /// Nearest documents to the query embedding, without fusion.
    pub fn search_semantic_only(&self, query: &str, limit: usize) -> Result<Vec<SemanticResult>> {
        let query = Self::validate_query(query)?;
        let limit = self.config.clamp_limit(limit);

        let embedding = self.generator.encode(query, true)?;
        let prepared = PreparedQuery::new(query).with_embedding(&embedding);
        let candidates = self
            .semantic
            .top_k(&prepared, limit)
            .map_err(retrieval_failed("semantic search"))?;

        let ids: Vec<DocId> = candidates.iter().map(|c| c.doc_id).collect();
        let mut documents = self.fetch_documents(&ids)?;
        let results: Vec<SemanticResult> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let document = documents.remove(&candidate.doc_id)?;
                Some(SemanticResult {
                    doc_id: candidate.doc_id,
                    rank: candidate.rank,
                    distance: candidate.score,
                    similarity: 1.0 - candidate.score,
                    document,
                })
            })
            .collect();

        debug!("semantic search '{query}': {} results", results.len());
        Ok(results)
    }

    /// Full-text matches ranked by lexical score, without fusion.
    pub fn search_keyword_only(&self, query: &str, limit: usize) -> Result<Vec<KeywordResult>> {
        let query = Self::validate_query(query)?;
        let limit = self.config.clamp_limit(limit);

        let candidates = self
            .lexical
            .top_k(&PreparedQuery::new(query), limit)
            .map_err(retrieval_failed("keyword search"))?;

        let ids: Vec<DocId> = candidates.iter().map(|c| c.doc_id).collect();
        let mut documents = self.fetch_documents(&ids)?;
        let results: Vec<KeywordResult> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let document = documents.remove(&candidate.doc_id)?;
                Some(KeywordResult {
                    doc_id: candidate.doc_id,
                    rank: candidate.rank,
                    rank_score: candidate.score,
                    document,
                })
            })
            .collect();

        debug!("keyword search '{query}': {} results", results.len());
        Ok(results)
    }

    /// Coverage of embeddings and lexical representations, computed on demand.
    pub fn get_search_stats(&self) -> Result<SearchStats> {
        let counts = self
            .store
            .coverage()
            .map_err(retrieval_failed("coverage statistics"))?;
        Ok(SearchStats::from(counts))
    }

    fn fetch_documents(&self, ids: &[DocId]) -> Result<HashMap<DocId, Document>> {
        let documents = self
            .store
            .get_documents(ids)
            .map_err(retrieval_failed("document lookup"))?;
        if documents.len() < ids.len() {
            warn!(
                "{} ranked documents disappeared before lookup",
                ids.len() - documents.len()
            );
        }
        Ok(documents)
    }
}
