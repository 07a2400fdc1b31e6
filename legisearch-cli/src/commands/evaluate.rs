use std::path::Path;

use anyhow::{Context, Result, bail};
use legisearch::evaluate_search_quality;
use legisearch::evaluation::queries::{build_pattern_queries, default_patterns, load_labeled_queries};

use crate::cli::EvaluateCommand;
use crate::context;
use crate::output::{self, OutputFormat};

/// Evaluate one or all retrieval methods against labelled queries.
pub fn run(cmd: EvaluateCommand, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let ctx = context::open(data_dir)?;
    let engine = ctx.engine()?;

    let queries = match &cmd.queries_file {
        Some(path) => load_labeled_queries(path)
            .with_context(|| format!("Failed to load queries from {}", path.display()))?,
        None => build_pattern_queries(&ctx.store.documents(), &default_patterns()),
    };
    if queries.is_empty() {
        bail!("No labelled queries to evaluate. Add documents or pass --queries-file.");
    }
    tracing::info!(queries = queries.len(), "starting evaluation");

    let mut reports = Vec::new();
    for mode in cmd.method.modes() {
        let report = evaluate_search_quality(&engine, &queries, mode, &cmd.k)
            .with_context(|| format!("Evaluation of {mode} search failed"))?;
        reports.push(report);
    }

    output::print_evaluation(&reports, format)
}
