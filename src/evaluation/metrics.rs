//! Information-retrieval quality metrics.
//!
//! All functions are pure. `retrieved` is a ranked list, best first;
//! `relevant` is the ground-truth set for the query.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Fraction of the first `k` retrieved items that are relevant.
///
/// Divides by `k` even when fewer than `k` items were retrieved. Returns 0
/// for `k == 0`.
pub fn precision_at_k<T: Eq + Hash>(retrieved: &[T], relevant: &HashSet<T>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = retrieved
        .iter()
        .take(k)
        .filter(|id| relevant.contains(*id))
        .count();
    hits as f64 / k as f64
}

/// Fraction of the relevant items that were retrieved. 0 if `relevant` is empty.
pub fn recall<T: Eq + Hash>(retrieved: &[T], relevant: &HashSet<T>) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let hits = retrieved.iter().filter(|id| relevant.contains(*id)).count();
    hits as f64 / relevant.len() as f64
}

/// Harmonic mean of precision and recall.
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        return 0.0;
    }
    2.0 * precision * recall / (precision + recall)
}

/// Reciprocal of the 1-based rank of the first relevant item, 0 if none.
pub fn mean_reciprocal_rank<T: Eq + Hash>(retrieved: &[T], relevant: &HashSet<T>) -> f64 {
    retrieved
        .iter()
        .position(|id| relevant.contains(id))
        .map_or(0.0, |idx| 1.0 / (idx + 1) as f64)
}

/// Sum of the precision at every relevant position, divided by `|relevant|`.
pub fn average_precision<T: Eq + Hash>(retrieved: &[T], relevant: &HashSet<T>) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }

    let mut found = 0usize;
    let mut sum = 0.0;
    for (idx, id) in retrieved.iter().enumerate() {
        if relevant.contains(id) {
            found += 1;
            sum += found as f64 / (idx + 1) as f64;
        }
    }
    sum / relevant.len() as f64
}

/// Mean of [`average_precision`] over `(retrieved, relevant)` pairs.
pub fn mean_average_precision<T: Eq + Hash>(results: &[(Vec<T>, HashSet<T>)]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: f64 = results
        .iter()
        .map(|(retrieved, relevant)| average_precision(retrieved, relevant))
        .sum();
    total / results.len() as f64
}

/// Rank discount shared by DCG and ideal DCG: 1 at rank 1, `sqrt(rank)` after.
fn discount(rank: usize) -> f64 {
    if rank <= 1 {
        1.0
    } else {
        (rank as f64).sqrt()
    }
}

/// Normalized discounted cumulative gain over the first `k` results.
///
/// `relevance` maps items to graded gains; unlisted items have gain 0.
/// Returns 0 for `k == 0`, empty `relevance` or an ideal DCG of 0.
pub fn ndcg_at_k<T: Eq + Hash>(retrieved: &[T], relevance: &HashMap<T, f64>, k: usize) -> f64 {
    if k == 0 || relevance.is_empty() {
        return 0.0;
    }

    let dcg: f64 = retrieved
        .iter()
        .take(k)
        .enumerate()
        .map(|(idx, id)| relevance.get(id).copied().unwrap_or(0.0) / discount(idx + 1))
        .sum();

    let mut ideal: Vec<f64> = relevance.values().copied().collect();
    ideal.sort_by(|a, b| b.total_cmp(a));
    let idcg: f64 = ideal
        .iter()
        .take(k)
        .enumerate()
        .map(|(idx, gain)| gain / discount(idx + 1))
        .sum();

    if idcg == 0.0 { 0.0 } else { dcg / idcg }
}
