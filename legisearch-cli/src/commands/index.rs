use std::path::Path;

use anyhow::{Context, Result};
use legisearch::{BackfillOptions, Document, backfill_embeddings, reindex_lexical};
use serde::Serialize;

use crate::cli::{AddCommand, BackfillCommand, ModelInfoCommand};
use crate::context;
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct AddSummary {
    added: usize,
    total_documents: usize,
}

/// Add documents from a JSON array file. Documents are indexed lexically
/// right away; embeddings are left for `backfill`.
pub fn add(cmd: AddCommand, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let ctx = context::open(data_dir)?;

    let content = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("Failed to read {}", cmd.file.display()))?;
    let documents: Vec<Document> =
        serde_json::from_str(&content).context("Failed to parse documents JSON")?;

    let added = documents.len();
    for document in documents {
        ctx.store.insert(document);
    }
    ctx.save()?;
    tracing::info!(added, "documents added");

    let summary = AddSummary {
        added,
        total_documents: ctx.store.len(),
    };
    match format {
        OutputFormat::Json => output::print_json(&summary),
        OutputFormat::Table => {
            println!(
                "{added} documents added ({} total). Run 'backfill' to generate embeddings.",
                summary.total_documents
            );
            Ok(())
        }
    }
}

/// Generate missing embeddings, then any missing lexical representations.
pub fn backfill(cmd: BackfillCommand, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let ctx = context::open(data_dir)?;

    let defaults = BackfillOptions::default();
    let options = BackfillOptions {
        batch_size: cmd.batch_size.unwrap_or(defaults.batch_size),
        limit: cmd.limit,
        force: cmd.force,
        dry_run: cmd.dry_run,
    };

    let report = backfill_embeddings(&ctx.store, &ctx.generator, &options)?;
    if !options.dry_run {
        let indexed = reindex_lexical(&ctx.store, false)?;
        tracing::info!(indexed, "lexical representations rebuilt");
        ctx.save()?;
    }

    output::print_backfill_report(&report, format)
}

pub fn stats(data_dir: &Path, format: OutputFormat) -> Result<()> {
    let ctx = context::open(data_dir)?;
    let stats = ctx.engine()?.get_search_stats()?;
    output::print_stats(&stats, format)
}

pub fn model_info(cmd: ModelInfoCommand, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let ctx = context::open(data_dir)?;
    if cmd.load {
        ctx.generator.model().context("Failed to load embedding model")?;
    }
    output::print_model_info(&ctx.generator.get_model_info(), format)
}
