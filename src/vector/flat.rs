//! Exact (brute-force) vector index.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::data::DocId;
use crate::error::{LegisearchError, Result};
use crate::vector::distance::DistanceMetric;

/// Flat index holding one fixed-dimension vector per document.
///
/// Search scans every stored vector in parallel; results are ordered by
/// ascending distance with ties broken by ascending document id.
#[derive(Debug, Clone)]
pub struct FlatVectorIndex {
    dimension: usize,
    metric: DistanceMetric,
    vectors: BTreeMap<DocId, Vec<f32>>,
}

impl FlatVectorIndex {
    pub fn new(dimension: usize, metric: DistanceMetric) -> Self {
        Self {
            dimension,
            metric,
            vectors: BTreeMap::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.vectors.contains_key(&doc_id)
    }

    pub fn get(&self, doc_id: DocId) -> Option<&[f32]> {
        self.vectors.get(&doc_id).map(Vec::as_slice)
    }

    /// Insert or replace the vector of a document.
    pub fn insert(&mut self, doc_id: DocId, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(LegisearchError::dimension_mismatch(
                self.dimension,
                vector.len(),
            ));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(LegisearchError::invalid_input(format!(
                "embedding for document {doc_id} contains non-finite values"
            )));
        }
        self.vectors.insert(doc_id, vector);
        Ok(())
    }

    pub fn remove(&mut self, doc_id: DocId) -> Option<Vec<f32>> {
        self.vectors.remove(&doc_id)
    }

    pub fn clear(&mut self) {
        self.vectors.clear();
    }

    /// Return up to `limit` `(doc_id, distance)` pairs closest to `query`.
    pub fn knn(&self, query: &[f32], limit: usize) -> Result<Vec<(DocId, f32)>> {
        if query.len() != self.dimension {
            return Err(LegisearchError::dimension_mismatch(
                self.dimension,
                query.len(),
            ));
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let metric = self.metric;
        let mut hits: Vec<(DocId, f32)> = self
            .vectors
            .par_iter()
            .map(|(doc_id, vector)| (*doc_id, metric.distance(query, vector)))
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        hits.truncate(limit);
        Ok(hits)
    }
}
