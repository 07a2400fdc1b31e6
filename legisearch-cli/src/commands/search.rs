use std::path::Path;

use anyhow::Result;
use legisearch::{SearchMode, SearchRequest};

use crate::cli::SearchCommand;
use crate::context;
use crate::output::{self, OutputFormat};

/// Execute a search command.
pub fn run(cmd: SearchCommand, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let ctx = context::open(data_dir)?;
    let engine = ctx.engine()?;
    let limit = cmd.limit.unwrap_or(ctx.config.search.default_limit);

    match SearchMode::from(cmd.mode) {
        SearchMode::Hybrid => {
            let mut request = SearchRequest::with_config(cmd.query, engine.config());
            request.limit = limit;
            if let Some(k) = cmd.rrf_k {
                request.rrf_k = k;
            }
            if let Some(candidates) = cmd.candidates {
                request.top_k_candidates = candidates;
            }
            let results = engine.search(&request)?;
            output::print_ranked_results(&results, format)
        }
        SearchMode::Semantic => {
            let results = engine.search_semantic_only(&cmd.query, limit)?;
            output::print_semantic_results(&results, format)
        }
        SearchMode::Keyword => {
            let results = engine.search_keyword_only(&cmd.query, limit)?;
            output::print_keyword_results(&results, format)
        }
    }
}
