//! Reciprocal Rank Fusion.
//!
//! Each list a document appears in contributes `1 / (k + rank)` to its fused
//! score. Scores from different retrieval signals are never compared
//! directly, only positions are, so distances and lexical scores can be mixed
//! safely.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::DocId;
use crate::search::provider::Candidate;

/// A document after fusion, with the ranks it had in each input list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusedCandidate {
    pub doc_id: DocId,
    pub rrf_score: f64,
    pub semantic_rank: Option<usize>,
    pub lexical_rank: Option<usize>,
}

/// Contribution of a single 1-based `rank` under smoothing constant `k`.
#[inline]
pub fn rrf_contribution(k: f64, rank: usize) -> f64 {
    1.0 / (k + rank as f64)
}

/// Fuse the semantic and lexical candidate lists.
///
/// Returns the union of both lists sorted by descending `rrf_score`, equal
/// scores by ascending document id. An empty list simply contributes nothing.
/// If a document occurs twice in the same list only its best rank counts.
pub fn reciprocal_rank_fusion(
    semantic: &[Candidate],
    lexical: &[Candidate],
    k: f64,
) -> Vec<FusedCandidate> {
    let mut fused: HashMap<DocId, FusedCandidate> =
        HashMap::with_capacity(semantic.len() + lexical.len());

    for candidate in semantic {
        let entry = fused.entry(candidate.doc_id).or_insert(FusedCandidate {
            doc_id: candidate.doc_id,
            rrf_score: 0.0,
            semantic_rank: None,
            lexical_rank: None,
        });
        if entry.semantic_rank.is_none() {
            entry.semantic_rank = Some(candidate.rank);
            entry.rrf_score += rrf_contribution(k, candidate.rank);
        }
    }

    for candidate in lexical {
        let entry = fused.entry(candidate.doc_id).or_insert(FusedCandidate {
            doc_id: candidate.doc_id,
            rrf_score: 0.0,
            semantic_rank: None,
            lexical_rank: None,
        });
        if entry.lexical_rank.is_none() {
            entry.lexical_rank = Some(candidate.rank);
            entry.rrf_score += rrf_contribution(k, candidate.rank);
        }
    }

    let mut results: Vec<FusedCandidate> = fused.into_values().collect();
    results.sort_by(|a, b| {
        b.rrf_score
            .total_cmp(&a.rrf_score)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    results
}
