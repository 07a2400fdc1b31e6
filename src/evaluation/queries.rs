//! Sources of labeled queries.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::Document;
use crate::error::{LegisearchError, Result};
use crate::evaluation::harness::LabeledQuery;

/// A query text and the keywords whose presence marks a document relevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPattern {
    pub query: String,
    pub keywords: Vec<String>,
}

impl QueryPattern {
    pub fn new<I, S>(query: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            query: query.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// Case-insensitive substring match against the title and the snippet.
    pub fn matches(&self, document: &Document) -> bool {
        let title = document.title.to_lowercase();
        let snippet = document.snippet.as_deref().unwrap_or_default().to_lowercase();
        self.keywords.iter().any(|keyword| {
            let keyword = keyword.to_lowercase();
            title.contains(&keyword) || snippet.contains(&keyword)
        })
    }
}

/// Topics of the legislative corpus: transparency, education, mental health,
/// cybercrime and environment.
pub fn default_patterns() -> Vec<QueryPattern> {
    vec![
        QueryPattern::new("transparencia y corrupción", ["transparencia", "corrupción"]),
        QueryPattern::new("educación", ["educación", "educacion"]),
        QueryPattern::new("salud mental", ["salud"]),
        QueryPattern::new(
            "delitos informáticos",
            ["delito", "penal", "cibernético", "cibernetico"],
        ),
        QueryPattern::new(
            "medio ambiente",
            ["ambiente", "ambiental", "plástico", "plastico"],
        ),
    ]
}

/// Label each pattern's query with the documents it matches.
///
/// Patterns that match no document are dropped.
pub fn build_pattern_queries(documents: &[Document], patterns: &[QueryPattern]) -> Vec<LabeledQuery> {
    patterns
        .iter()
        .filter_map(|pattern| {
            let relevant: Vec<_> = documents
                .iter()
                .filter(|doc| pattern.matches(doc))
                .map(|doc| doc.id)
                .collect();
            (!relevant.is_empty()).then(|| LabeledQuery::new(pattern.query.clone(), relevant))
        })
        .collect()
}

/// Read labeled queries from a JSON array of
/// `{"query": "...", "relevant_ids": [..], "relevance": {..}}` objects.
pub fn load_labeled_queries(path: impl AsRef<Path>) -> Result<Vec<LabeledQuery>> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_labeled_queries(&content)
}

pub fn parse_labeled_queries(content: &str) -> Result<Vec<LabeledQuery>> {
    let queries: Vec<LabeledQuery> = serde_json::from_str(content)?;
    if let Some(position) = queries.iter().position(|q| q.query.trim().is_empty()) {
        return Err(LegisearchError::invalid_input(format!(
            "labeled query #{} has an empty query",
            position + 1
        )));
    }
    Ok(queries)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new(1, "Ley de Transparencia").with_snippet("combate a la corrupción"),
            Document::new(2, "Reforma educativa").with_snippet("educación pública gratuita"),
            Document::new(3, "Salud Mental en escuelas"),
            Document::new(4, "Código Penal").with_snippet("delitos cibernéticos"),
            Document::new(5, "Presupuesto"),
        ]
    }

    #[test]
    fn test_build_pattern_queries() {
        let queries = build_pattern_queries(&corpus(), &default_patterns());
        let summary: Vec<(&str, Vec<u64>)> = queries
            .iter()
            .map(|q| {
                let mut ids: Vec<u64> = q.relevant_ids.iter().copied().collect();
                ids.sort_unstable();
                (q.query.as_str(), ids)
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("transparencia y corrupción", vec![1]),
                ("educación", vec![2]),
                ("salud mental", vec![3]),
                ("delitos informáticos", vec![4]),
            ]
        );
    }

    #[test]
    fn test_load_labeled_queries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"query": "salud mental", "relevant_ids": [3]}},
                {{"query": "educación", "relevant_ids": [2, 7], "relevance": {{"2": 2.0}}}}
            ]"#
        )
        .unwrap();

        let queries = load_labeled_queries(file.path()).unwrap();
        assert_eq!(queries.len(), 2);
        assert!(queries[0].relevance.is_none());
        assert_eq!(queries[1].relevant_ids.len(), 2);
        assert_eq!(queries[1].relevance.as_ref().unwrap()[&2], 2.0);
    }

    #[test]
    fn test_empty_query_rejected() {
        let err = parse_labeled_queries(r#"[{"query": " ", "relevant_ids": [1]}]"#).unwrap_err();
        assert!(matches!(err, LegisearchError::InvalidInput(_)));
    }
}
