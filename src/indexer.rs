//! Backfill jobs that compute missing derived search fields.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::data::DocId;
use crate::embedding::generator::EmbeddingGenerator;
use crate::error::{LegisearchError, Result};
use crate::store::InMemoryDocumentStore;

/// Longest error message kept per failed document.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillOptions {
    pub batch_size: usize,
    /// Process at most this many documents.
    pub limit: Option<usize>,
    /// Regenerate embeddings that already exist.
    pub force: bool,
    /// Encode but do not store anything.
    pub dry_run: bool,
}

impl Default for BackfillOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            limit: None,
            force: false,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Documents selected for processing.
    pub candidates: usize,
    pub embedded: usize,
    pub failed: usize,
    /// Documents without any text to embed.
    pub skipped: usize,
    /// Documents still lacking an embedding after the run.
    pub remaining: usize,
    pub dry_run: bool,
    pub errors: Vec<String>,
}

fn error_detail(doc_id: DocId, err: &LegisearchError) -> String {
    let message: String = err.to_string().chars().take(MAX_ERROR_CHARS).collect();
    format!("document {doc_id}: {message}")
}

/// Compute embeddings for documents that lack one (or for all with `force`).
///
/// Each batch is encoded through the generator's batch path. If a batch
/// fails its documents are retried one by one so that a single bad document
/// only fails itself. Failures are logged and counted, never fatal.
pub fn backfill_embeddings(
    store: &InMemoryDocumentStore,
    generator: &EmbeddingGenerator,
    options: &BackfillOptions,
) -> Result<BackfillReport> {
    if options.batch_size == 0 {
        return Err(LegisearchError::invalid_input("batch size must be greater than 0"));
    }

    let mut ids = if options.force {
        store.ids()
    } else {
        store.ids_without_embedding()
    };
    if let Some(limit) = options.limit {
        ids.truncate(limit);
    }

    let mut report = BackfillReport {
        candidates: ids.len(),
        dry_run: options.dry_run,
        ..Default::default()
    };
    if ids.is_empty() {
        info!("no documents need an embedding");
        report.remaining = store.ids_without_embedding().len();
        return Ok(report);
    }

    let total_batches = ids.len().div_ceil(options.batch_size);
    info!(
        "backfilling {} documents in {total_batches} batches of {}{}",
        ids.len(),
        options.batch_size,
        if options.dry_run { " (dry run)" } else { "" }
    );

    for (batch_idx, batch_ids) in ids.chunks(options.batch_size).enumerate() {
        let mut batch: Vec<(DocId, String)> = Vec::with_capacity(batch_ids.len());
        for &doc_id in batch_ids {
            let Some(document) = store.get(doc_id) else {
                continue;
            };
            let text = document.embedding_text();
            if text.trim().is_empty() {
                report.skipped += 1;
                continue;
            }
            batch.push((doc_id, text));
        }
        if batch.is_empty() {
            continue;
        }

        let texts: Vec<&str> = batch.iter().map(|(_, text)| text.as_str()).collect();
        let vectors: Vec<(DocId, Result<Vec<f32>>)> = match generator.encode_batch(&texts, true) {
            Ok(vectors) if vectors.len() == batch.len() => batch
                .iter()
                .map(|(doc_id, _)| *doc_id)
                .zip(vectors.into_iter().map(Ok))
                .collect(),
            outcome => {
                if let Err(err) = outcome {
                    warn!("batch {} failed ({err}), retrying one by one", batch_idx + 1);
                }
                batch
                    .iter()
                    .map(|(doc_id, text)| (*doc_id, generator.encode(text, true)))
                    .collect()
            }
        };

        for (doc_id, vector) in vectors {
            let stored = vector.and_then(|vector| {
                if options.dry_run {
                    Ok(())
                } else {
                    store.set_embedding(doc_id, vector)
                }
            });
            match stored {
                Ok(()) => report.embedded += 1,
                Err(err) => {
                    error!("failed to embed document {doc_id}: {err}");
                    report.failed += 1;
                    report.errors.push(error_detail(doc_id, &err));
                }
            }
        }

        info!(
            "batch {}/{total_batches}: {} embedded, {} failed, {} skipped so far",
            batch_idx + 1,
            report.embedded,
            report.failed,
            report.skipped
        );
    }

    report.remaining = store.ids_without_embedding().len();
    Ok(report)
}

/// Compute the lexical representation of every document missing one, or of
/// all documents with `force`. Returns the number of documents indexed.
pub fn reindex_lexical(store: &InMemoryDocumentStore, force: bool) -> Result<usize> {
    let ids = if force {
        store.ids()
    } else {
        store.ids_without_lexical_index()
    };
    for &doc_id in &ids {
        store.index_lexical(doc_id)?;
    }
    info!("computed lexical representation for {} documents", ids.len());
    Ok(ids.len())
}
