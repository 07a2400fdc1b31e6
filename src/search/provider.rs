//! Ranked candidate retrieval, one provider per signal.

use std::sync::Arc;

use crate::data::DocId;
use crate::error::{LegisearchError, Result};
use crate::lexical::parse_websearch;
use crate::store::DocumentStore;

/// A document at a 1-based position in one provider's ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub doc_id: DocId,
    pub rank: usize,
    /// Provider-specific raw score: a distance for the semantic provider, a
    /// relevance score for the lexical one.
    pub score: f32,
}

pub type CandidateList = Vec<Candidate>;

/// A query with the artifacts derived from it.
#[derive(Debug, Clone, Copy)]
pub struct PreparedQuery<'a> {
    pub text: &'a str,
    pub embedding: Option<&'a [f32]>,
}

impl<'a> PreparedQuery<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: &'a [f32]) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Returns up to `n` candidates ranked `1..=n` for a query.
pub trait TopKProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn top_k(&self, query: &PreparedQuery<'_>, n: usize) -> Result<CandidateList>;
}

fn ranked<I>(hits: I) -> CandidateList
where
    I: IntoIterator<Item = (DocId, f32)>,
{
    hits.into_iter()
        .enumerate()
        .map(|(idx, (doc_id, score))| Candidate {
            doc_id,
            rank: idx + 1,
            score,
        })
        .collect()
}

/// Nearest neighbors of the query embedding.
pub struct SemanticProvider {
    store: Arc<dyn DocumentStore>,
}

impl SemanticProvider {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

impl TopKProvider for SemanticProvider {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn top_k(&self, query: &PreparedQuery<'_>, n: usize) -> Result<CandidateList> {
        let embedding = query.embedding.ok_or_else(|| {
            LegisearchError::internal("semantic candidates need a query embedding")
        })?;
        let hits = self.store.nearest_by_vector(embedding, n)?;
        Ok(ranked(hits.into_iter().map(|hit| (hit.doc_id, hit.distance))))
    }
}

/// Full-text matches of the query parsed with the store's analyzer.
pub struct LexicalProvider {
    store: Arc<dyn DocumentStore>,
}

impl LexicalProvider {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

impl TopKProvider for LexicalProvider {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn top_k(&self, query: &PreparedQuery<'_>, n: usize) -> Result<CandidateList> {
        let analyzer = self.store.analyzer();
        let Some(parsed) = parse_websearch(query.text, analyzer.as_ref()) else {
            log::debug!("query '{}' has no searchable terms", query.text);
            return Ok(Vec::new());
        };
        let hits = self.store.search_lexical(&parsed, n)?;
        Ok(ranked(hits.into_iter().map(|hit| (hit.doc_id, hit.score))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Language, LanguageAnalyzer};
    use crate::data::Document;
    use crate::store::InMemoryDocumentStore;
    use crate::vector::DistanceMetric;

    fn store() -> Arc<InMemoryDocumentStore> {
        let store = InMemoryDocumentStore::new(
            2,
            DistanceMetric::Cosine,
            Arc::new(LanguageAnalyzer::new(Language::Spanish)),
        );
        store.insert(Document::new(1, "Ley de salud mental"));
        store.insert(Document::new(2, "Salud pública y salud mental"));
        store.insert(Document::new(3, "Educación"));
        store.set_embedding(1, vec![1.0, 0.0]).unwrap();
        store.set_embedding(3, vec![0.0, 1.0]).unwrap();
        Arc::new(store)
    }

    #[test]
    fn test_semantic_ranks_start_at_one() {
        let provider = SemanticProvider::new(store());
        let embedding = [0.0, 1.0];
        let candidates = provider
            .top_k(&PreparedQuery::new("x").with_embedding(&embedding), 10)
            .unwrap();

        let ids: Vec<(DocId, usize)> = candidates.iter().map(|c| (c.doc_id, c.rank)).collect();
        assert_eq!(ids, vec![(3, 1), (1, 2)]);
    }

    #[test]
    fn test_semantic_requires_embedding() {
        let provider = SemanticProvider::new(store());
        assert!(provider.top_k(&PreparedQuery::new("x"), 10).is_err());
    }

    #[test]
    fn test_lexical_pool_size() {
        let provider = LexicalProvider::new(store());
        let all = provider.top_k(&PreparedQuery::new("salud"), 10).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].rank, 1);
        assert_eq!(all[1].rank, 2);

        let one = provider.top_k(&PreparedQuery::new("salud"), 1).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].doc_id, all[0].doc_id);
    }

    #[test]
    fn test_lexical_stop_words_only() {
        let provider = LexicalProvider::new(store());
        assert!(provider.top_k(&PreparedQuery::new("de la y"), 10).unwrap().is_empty());
    }
}
