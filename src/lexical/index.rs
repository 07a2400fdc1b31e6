//! Positional inverted index with field weights and cover-density ranking.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;

use crate::analysis::Analyzer;
use crate::data::DocId;
use crate::lexical::query::{LexicalQuery, PhraseTerm};

/// Positions skipped between consecutive fields so phrases never span two fields.
const FIELD_POSITION_GAP: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Occurrence {
    position: u32,
    weight: f32,
}

/// In-memory full-text index.
///
/// Each document's fields are concatenated into one position space. Every
/// occurrence remembers the weight of the field it came from, so a title hit
/// ranks above the same hit in the body.
#[derive(Debug, Clone, Default)]
pub struct LexicalIndex {
    postings: AHashMap<String, BTreeMap<DocId, Vec<Occurrence>>>,
    doc_terms: BTreeMap<DocId, Vec<String>>,
}

impl LexicalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents with a lexical representation.
    pub fn len(&self) -> usize {
        self.doc_terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_terms.is_empty()
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.doc_terms.contains_key(&doc_id)
    }

    /// Index (or re-index) a document from `(weight, text)` fields.
    pub fn index_document(&mut self, doc_id: DocId, fields: &[(f32, &str)], analyzer: &dyn Analyzer) {
        self.remove(doc_id);

        let mut occurrences: BTreeMap<String, Vec<Occurrence>> = BTreeMap::new();
        let mut offset = 0u32;
        for (weight, text) in fields {
            let tokens = analyzer.analyze(text);
            let Some(last) = tokens.last().map(|t| t.position) else {
                continue;
            };
            for token in tokens {
                occurrences.entry(token.term).or_default().push(Occurrence {
                    position: offset + token.position,
                    weight: *weight,
                });
            }
            offset += last + FIELD_POSITION_GAP;
        }

        let terms: Vec<String> = occurrences.keys().cloned().collect();
        for (term, list) in occurrences {
            self.postings.entry(term).or_default().insert(doc_id, list);
        }
        self.doc_terms.insert(doc_id, terms);
    }

    /// Drop a document's lexical representation. Returns false if it had none.
    pub fn remove(&mut self, doc_id: DocId) -> bool {
        let Some(terms) = self.doc_terms.remove(&doc_id) else {
            return false;
        };
        for term in terms {
            if let Some(docs) = self.postings.get_mut(&term) {
                docs.remove(&doc_id);
                if docs.is_empty() {
                    self.postings.remove(&term);
                }
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.postings.clear();
        self.doc_terms.clear();
    }

    /// Documents matching `query`, ranked by descending cover density.
    ///
    /// Ties are broken by ascending document id. Queries without any positive
    /// term (pure negations) match nothing.
    pub fn search(&self, query: &LexicalQuery, limit: usize) -> Vec<(DocId, f32)> {
        if limit == 0 || !query.has_positive() {
            return Vec::new();
        }

        let terms = query.positive_terms();
        let mut hits: Vec<(DocId, f32)> = self
            .matches(query)
            .into_iter()
            .map(|doc_id| (doc_id, self.cover_density(doc_id, &terms)))
            .collect();

        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        hits.truncate(limit);
        hits
    }

    fn matches(&self, query: &LexicalQuery) -> BTreeSet<DocId> {
        match query {
            LexicalQuery::Term(term) => self
                .postings
                .get(term)
                .map(|docs| docs.keys().copied().collect())
                .unwrap_or_default(),
            LexicalQuery::Phrase(parts) => self.phrase_matches(parts),
            LexicalQuery::And(children) => {
                let mut result: Option<BTreeSet<DocId>> = None;
                for child in children {
                    let matched = self.matches(child);
                    result = Some(match result {
                        Some(acc) => acc.intersection(&matched).copied().collect(),
                        None => matched,
                    });
                    if result.as_ref().is_some_and(BTreeSet::is_empty) {
                        break;
                    }
                }
                result.unwrap_or_default()
            }
            LexicalQuery::Or(children) => children
                .iter()
                .flat_map(|child| self.matches(child))
                .collect(),
            LexicalQuery::Not(inner) => {
                let excluded = self.matches(inner);
                self.doc_terms
                    .keys()
                    .filter(|id| !excluded.contains(id))
                    .copied()
                    .collect()
            }
        }
    }

    fn occurrences(&self, term: &str, doc_id: DocId) -> Option<&[Occurrence]> {
        self.postings
            .get(term)
            .and_then(|docs| docs.get(&doc_id))
            .map(Vec::as_slice)
    }

    fn phrase_matches(&self, parts: &[PhraseTerm]) -> BTreeSet<DocId> {
        let Some(first) = parts.first() else {
            return BTreeSet::new();
        };
        let Some(candidates) = self.postings.get(&first.term) else {
            return BTreeSet::new();
        };

        candidates
            .iter()
            .filter(|(doc_id, starts)| {
                starts.iter().any(|start| {
                    parts.iter().all(|part| {
                        let wanted = start.position + part.offset - first.offset;
                        self.occurrences(&part.term, **doc_id)
                            .is_some_and(|occ| occ.iter().any(|o| o.position == wanted))
                    })
                })
            })
            .map(|(doc_id, _)| *doc_id)
            .collect()
    }

    /// Sum over minimal covers of `mean weight / (1 + gap)`.
    ///
    /// A cover is a position window containing every query term the document
    /// has; the gap is the number of extra positions beyond a tight window.
    fn cover_density(&self, doc_id: DocId, terms: &[&str]) -> f32 {
        let mut occ: Vec<(u32, usize, f32)> = Vec::new();
        for (idx, term) in terms.iter().enumerate() {
            if let Some(list) = self.occurrences(term, doc_id) {
                occ.extend(list.iter().map(|o| (o.position, idx, o.weight)));
            }
        }
        if occ.is_empty() {
            return 0.0;
        }
        occ.sort_by_key(|o| o.0);

        let mut present = vec![false; terms.len()];
        for o in &occ {
            present[o.1] = true;
        }
        let distinct = present.iter().filter(|p| **p).count();

        let mut score = 0.0f32;
        for start in 0..occ.len() {
            let mut seen = vec![false; terms.len()];
            let mut count = 0;
            let mut end = None;
            for (j, o) in occ.iter().enumerate().skip(start) {
                if !seen[o.1] {
                    seen[o.1] = true;
                    count += 1;
                }
                if count == distinct {
                    end = Some(j);
                    break;
                }
            }
            // No cover from here means none from any later start either.
            let Some(end) = end else {
                break;
            };
            if occ[start + 1..=end].iter().any(|o| o.1 == occ[start].1) {
                continue;
            }

            let window = &occ[start..=end];
            let mean_weight = window.iter().map(|o| o.2).sum::<f32>() / window.len() as f32;
            let span = occ[end].0 - occ[start].0;
            let gap = span.saturating_sub(distinct as u32 - 1);
            score += mean_weight / (1.0 + gap as f32);
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Language, LanguageAnalyzer};
    use crate::data::{SNIPPET_WEIGHT, TITLE_WEIGHT};
    use crate::lexical::query::parse_websearch;

    fn analyzer() -> LanguageAnalyzer {
        LanguageAnalyzer::new(Language::Spanish)
    }

    fn build() -> LexicalIndex {
        let analyzer = analyzer();
        let mut index = LexicalIndex::new();
        index.index_document(
            1,
            &[
                (TITLE_WEIGHT, "Ley de transparencia y corrupción"),
                (SNIPPET_WEIGHT, "Obliga a publicar los contratos públicos."),
            ],
            &analyzer,
        );
        index.index_document(
            2,
            &[
                (TITLE_WEIGHT, "Reforma educativa"),
                (SNIPPET_WEIGHT, "Incluye medidas de transparencia en escuelas."),
            ],
            &analyzer,
        );
        index.index_document(
            3,
            &[
                (TITLE_WEIGHT, "Salud mental"),
                (SNIPPET_WEIGHT, "Programas de salud para jóvenes."),
            ],
            &analyzer,
        );
        index
    }

    fn search(index: &LexicalIndex, q: &str) -> Vec<DocId> {
        let query = parse_websearch(q, &analyzer()).unwrap();
        index.search(&query, 10).into_iter().map(|(id, _)| id).collect()
    }

    #[test]
    fn test_title_hit_outranks_body_hit() {
        let index = build();
        assert_eq!(search(&index, "transparencia"), vec![1, 2]);
    }

    #[test]
    fn test_and_requires_all_terms() {
        let index = build();
        assert_eq!(search(&index, "transparencia corrupción"), vec![1]);
        assert!(search(&index, "transparencia salud").is_empty());
    }

    #[test]
    fn test_or_and_negation() {
        let index = build();
        // Document 3 mentions "salud" twice (title and body).
        assert_eq!(search(&index, "corrupción or salud"), vec![3, 1]);
        assert_eq!(search(&index, "transparencia -corrupción"), vec![2]);
    }

    #[test]
    fn test_phrase_requires_adjacency() {
        let index = build();
        assert_eq!(search(&index, "\"salud mental\""), vec![3]);
        assert!(search(&index, "\"mental salud\"").is_empty());
    }

    #[test]
    fn test_phrase_does_not_span_fields() {
        let analyzer = analyzer();
        let mut index = LexicalIndex::new();
        index.index_document(1, &[(1.0, "salud"), (0.4, "mental")], &analyzer);
        assert!(search(&index, "\"salud mental\"").is_empty());
        assert_eq!(search(&index, "salud mental"), vec![1]);
    }

    #[test]
    fn test_proximity_raises_score() {
        let analyzer = analyzer();
        let mut index = LexicalIndex::new();
        index.index_document(1, &[(1.0, "salud pública mental")], &analyzer);
        index.index_document(2, &[(1.0, "salud mental")], &analyzer);

        let query = parse_websearch("salud mental", &analyzer).unwrap();
        let hits = index.search(&query, 10);
        assert_eq!(hits[0].0, 2);
        assert!(hits[0].1 > hits[1].1);
    }

    #[test]
    fn test_remove_and_reindex() {
        let mut index = build();
        assert!(index.remove(1));
        assert!(!index.contains(1));
        assert_eq!(search(&index, "transparencia"), vec![2]);
        assert!(!index.remove(1));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_ties_break_by_doc_id() {
        let analyzer = analyzer();
        let mut index = LexicalIndex::new();
        index.index_document(9, &[(1.0, "ambiente")], &analyzer);
        index.index_document(4, &[(1.0, "ambiente")], &analyzer);
        assert_eq!(search(&index, "ambiente"), vec![4, 9]);
    }
}
