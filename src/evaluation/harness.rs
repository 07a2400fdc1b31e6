//! Runs labeled queries through a search mode and aggregates quality metrics.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::data::DocId;
use crate::error::Result;
use crate::evaluation::latency::{LatencyStats, LatencyTracker};
use crate::evaluation::metrics::{
    average_precision, f1_score, mean_average_precision, mean_reciprocal_rank, ndcg_at_k,
    precision_at_k, recall,
};
use crate::search::{HybridSearchEngine, SearchMode, SearchRequest};

pub const DEFAULT_K_VALUES: [usize; 4] = [1, 3, 5, 10];

/// A query with its ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledQuery {
    pub query: String,
    pub relevant_ids: HashSet<DocId>,
    /// Graded gains for NDCG. Without it every relevant id has gain 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<HashMap<DocId, f64>>,
}

impl LabeledQuery {
    pub fn new(query: impl Into<String>, relevant_ids: impl IntoIterator<Item = DocId>) -> Self {
        Self {
            query: query.into(),
            relevant_ids: relevant_ids.into_iter().collect(),
            relevance: None,
        }
    }

    pub fn with_relevance(mut self, relevance: HashMap<DocId, f64>) -> Self {
        self.relevance = Some(relevance);
        self
    }

    fn gains(&self) -> HashMap<DocId, f64> {
        match &self.relevance {
            Some(relevance) => relevance.clone(),
            None => self.relevant_ids.iter().map(|id| (*id, 1.0)).collect(),
        }
    }
}

/// Anything that returns ranked document ids for a query in a given mode.
pub trait Retriever {
    fn retrieve(&self, mode: SearchMode, query: &str, limit: usize) -> Result<Vec<DocId>>;
}

impl Retriever for HybridSearchEngine {
    fn retrieve(&self, mode: SearchMode, query: &str, limit: usize) -> Result<Vec<DocId>> {
        Ok(match mode {
            SearchMode::Hybrid => {
                let mut request = SearchRequest::with_config(query, self.config());
                request.limit = limit;
                self.search(&request)?.into_iter().map(|r| r.doc_id).collect()
            }
            SearchMode::Semantic => self
                .search_semantic_only(query, limit)?
                .into_iter()
                .map(|r| r.doc_id)
                .collect(),
            SearchMode::Keyword => self
                .search_keyword_only(query, limit)?
                .into_iter()
                .map(|r| r.doc_id)
                .collect(),
        })
    }
}

/// Aggregated metrics of one evaluation run. Every value is a mean over the
/// evaluated queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub method: SearchMode,
    pub num_queries: usize,
    pub precision_at_k: BTreeMap<usize, f64>,
    pub recall: f64,
    /// Against precision at the largest requested k.
    pub f1_score: f64,
    pub mrr: f64,
    pub map: f64,
    pub ndcg_at_k: BTreeMap<usize, f64>,
    pub latency_ms: LatencyStats,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Evaluate `method` over `queries`.
///
/// Each query retrieves `max(k_values)` results (20 when `k_values` is
/// empty) while being timed. F1 combines recall with precision at the largest
/// k (10 when `k_values` is empty). A failing search aborts the run.
pub fn evaluate_search_quality<R: Retriever + ?Sized>(
    retriever: &R,
    queries: &[LabeledQuery],
    method: SearchMode,
    k_values: &[usize],
) -> Result<EvaluationReport> {
    let limit = k_values.iter().copied().max().unwrap_or(20);
    let max_k = k_values.iter().copied().max().unwrap_or(10);

    info!("evaluating {} queries with method '{method}'", queries.len());

    let mut tracker = LatencyTracker::new();
    let mut precision_scores: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
    let mut ndcg_scores: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
    let mut recall_scores = Vec::with_capacity(queries.len());
    let mut f1_scores = Vec::with_capacity(queries.len());
    let mut mrr_scores = Vec::with_capacity(queries.len());
    let mut all_results = Vec::with_capacity(queries.len());

    for labeled in queries {
        let (retrieved, latency) =
            tracker.measure(|| retriever.retrieve(method, &labeled.query, limit));
        let retrieved = retrieved?;
        let relevant = &labeled.relevant_ids;
        let gains = labeled.gains();

        for &k in k_values {
            precision_scores
                .entry(k)
                .or_default()
                .push(precision_at_k(&retrieved, relevant, k));
            ndcg_scores
                .entry(k)
                .or_default()
                .push(ndcg_at_k(&retrieved, &gains, k));
        }

        let query_recall = recall(&retrieved, relevant);
        recall_scores.push(query_recall);
        f1_scores.push(f1_score(
            precision_at_k(&retrieved, relevant, max_k),
            query_recall,
        ));
        mrr_scores.push(mean_reciprocal_rank(&retrieved, relevant));

        debug!(
            "'{}': {} retrieved, AP {:.3}, {latency:.1} ms",
            labeled.query,
            retrieved.len(),
            average_precision(&retrieved, relevant)
        );
        all_results.push((retrieved, relevant.clone()));
    }

    Ok(EvaluationReport {
        method,
        num_queries: queries.len(),
        precision_at_k: precision_scores
            .into_iter()
            .map(|(k, scores)| (k, mean(&scores)))
            .collect(),
        recall: mean(&recall_scores),
        f1_score: mean(&f1_scores),
        mrr: mean(&mrr_scores),
        map: mean_average_precision(&all_results),
        ndcg_at_k: ndcg_scores
            .into_iter()
            .map(|(k, scores)| (k, mean(&scores)))
            .collect(),
        latency_ms: tracker.stats(),
    })
}
