use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document identifier.
pub type DocId = u64;

/// Weight of the title in the lexical representation (PostgreSQL weight `A`).
pub const TITLE_WEIGHT: f32 = 1.0;
/// Weight of the snippet/body (weight `B`).
pub const SNIPPET_WEIGHT: f32 = 0.4;
/// Weight of the generated summary (weight `C`).
pub const SUMMARY_WEIGHT: f32 = 0.2;

/// A searchable document and its display fields.
///
/// Derived search artifacts (the embedding and the lexical representation)
/// are owned by the document store, not by the document itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Generated summary, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(id: DocId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            snippet: None,
            summary: None,
            source: None,
            url: None,
            published_at: None,
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Text fed to the embedding model.
    ///
    /// Labelled parts are joined by blank lines; empty parts are skipped.
    pub fn embedding_text(&self) -> String {
        let labelled = [
            ("Título", Some(self.title.as_str())),
            ("Contenido", self.snippet.as_deref()),
            ("Resumen", self.summary.as_deref()),
            ("Fuente", self.source.as_deref()),
        ];

        labelled
            .iter()
            .filter_map(|(label, value)| {
                value
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{label}: {v}"))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Fields indexed for full-text search, in position order, with weights.
    pub fn lexical_fields(&self) -> Vec<(f32, &str)> {
        let mut fields = vec![(TITLE_WEIGHT, self.title.as_str())];
        if let Some(snippet) = self.snippet.as_deref() {
            fields.push((SNIPPET_WEIGHT, snippet));
        }
        if let Some(summary) = self.summary.as_deref() {
            fields.push((SUMMARY_WEIGHT, summary));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_text_skips_empty_parts() {
        let doc = Document::new(1, "Ley de transparencia")
            .with_snippet("  ")
            .with_summary("Obliga a publicar contratos.")
            .with_source("Senado");

        assert_eq!(
            doc.embedding_text(),
            "Título: Ley de transparencia\n\nResumen: Obliga a publicar contratos.\n\nFuente: Senado"
        );
    }

    #[test]
    fn test_lexical_fields_order_and_weights() {
        let doc = Document::new(7, "Título")
            .with_snippet("cuerpo")
            .with_summary("resumen");
        let fields = doc.lexical_fields();

        assert_eq!(
            fields,
            vec![
                (TITLE_WEIGHT, "Título"),
                (SNIPPET_WEIGHT, "cuerpo"),
                (SUMMARY_WEIGHT, "resumen"),
            ]
        );
    }

    #[test]
    fn test_document_json_omits_missing_fields() {
        let doc = Document::new(3, "Salud mental");
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"id":3,"title":"Salud mental"}"#);

        let parsed: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }
}
