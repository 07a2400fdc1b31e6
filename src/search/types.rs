//! Result and statistics types returned by the search engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::{DocId, Document};
use crate::error::LegisearchError;
use crate::store::CoverageCounts;

/// Which signal(s) a search uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Semantic and lexical candidates fused with RRF.
    #[default]
    Hybrid,
    Semantic,
    Keyword,
}

impl SearchMode {
    pub const ALL: [SearchMode; 3] = [SearchMode::Hybrid, SearchMode::Semantic, SearchMode::Keyword];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Hybrid => "hybrid",
            SearchMode::Semantic => "semantic",
            SearchMode::Keyword => "keyword",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = LegisearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hybrid" => Ok(SearchMode::Hybrid),
            "semantic" => Ok(SearchMode::Semantic),
            "keyword" | "lexical" => Ok(SearchMode::Keyword),
            other => Err(LegisearchError::invalid_input(format!(
                "unknown search mode '{other}' (expected hybrid, semantic or keyword)"
            ))),
        }
    }
}

/// A hybrid search hit.
///
/// The per-modality ranks explain where the fused score came from: a
/// document found by both providers has both ranks set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub doc_id: DocId,
    pub rrf_score: f64,
    pub semantic_rank: Option<usize>,
    pub lexical_rank: Option<usize>,
    pub document: Document,
}

/// A semantic-only search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticResult {
    pub doc_id: DocId,
    pub rank: usize,
    pub distance: f32,
    /// `1 - distance`.
    pub similarity: f32,
    pub document: Document,
}

/// A keyword-only search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordResult {
    pub doc_id: DocId,
    pub rank: usize,
    pub rank_score: f32,
    pub document: Document,
}

/// Coverage of derived search fields over the whole corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub total_documents: usize,
    pub with_embedding: usize,
    pub with_lexical_index: usize,
    pub fully_searchable: usize,
    pub embedding_coverage_pct: f64,
    pub lexical_coverage_pct: f64,
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 10_000.0 / total as f64).round() / 100.0
}

impl From<CoverageCounts> for SearchStats {
    fn from(counts: CoverageCounts) -> Self {
        Self {
            total_documents: counts.total_documents,
            with_embedding: counts.with_embedding,
            with_lexical_index: counts.with_lexical_index,
            fully_searchable: counts.fully_searchable,
            embedding_coverage_pct: percentage(counts.with_embedding, counts.total_documents),
            lexical_coverage_pct: percentage(counts.with_lexical_index, counts.total_documents),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_mode_parsing() {
        assert_eq!("hybrid".parse::<SearchMode>().unwrap(), SearchMode::Hybrid);
        assert_eq!(" Semantic ".parse::<SearchMode>().unwrap(), SearchMode::Semantic);
        assert_eq!("lexical".parse::<SearchMode>().unwrap(), SearchMode::Keyword);
        assert!("fuzzy".parse::<SearchMode>().is_err());
        assert_eq!(SearchMode::Keyword.to_string(), "keyword");
    }

    #[test]
    fn test_stats_percentages() {
        let stats = SearchStats::from(CoverageCounts {
            total_documents: 3,
            with_embedding: 2,
            with_lexical_index: 3,
            fully_searchable: 2,
        });
        assert_eq!(stats.embedding_coverage_pct, 66.67);
        assert_eq!(stats.lexical_coverage_pct, 100.0);
    }

    #[test]
    fn test_stats_empty_corpus() {
        let stats = SearchStats::from(CoverageCounts::default());
        assert_eq!(stats.total_documents, 0);
        assert_eq!(stats.embedding_coverage_pct, 0.0);
        assert_eq!(stats.lexical_coverage_pct, 0.0);
    }
}
