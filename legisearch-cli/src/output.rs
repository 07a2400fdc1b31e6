use anyhow::Result;
use clap::ValueEnum;
use legisearch::evaluation::{format_comparison, format_evaluation_report};
use legisearch::{
    BackfillReport, Document, EvaluationReport, KeywordResult, ModelInfo, RankedResult,
    SearchStats, SemanticResult,
};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

const TITLE_WIDTH: usize = 70;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// JSON output.
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print fused hybrid results.
pub fn print_ranked_results(results: &[RankedResult], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(results),
        OutputFormat::Table => {
            if results.is_empty() {
                println!("No results found.");
                return Ok(());
            }

            let rows: Vec<RankedRow> = results
                .iter()
                .map(|r| RankedRow {
                    id: r.doc_id,
                    score: format!("{:.5}", r.rrf_score),
                    semantic: format_rank(r.semantic_rank),
                    lexical: format_rank(r.lexical_rank),
                    title: shorten(&r.document.title),
                    source: source_of(&r.document),
                })
                .collect();
            print_table(&rows);
            Ok(())
        }
    }
}

/// Print semantic-only results.
pub fn print_semantic_results(results: &[SemanticResult], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(results),
        OutputFormat::Table => {
            if results.is_empty() {
                println!("No results found.");
                return Ok(());
            }

            let rows: Vec<SemanticRow> = results
                .iter()
                .map(|r| SemanticRow {
                    rank: r.rank,
                    id: r.doc_id,
                    similarity: format!("{:.4}", r.similarity),
                    distance: format!("{:.4}", r.distance),
                    title: shorten(&r.document.title),
                })
                .collect();
            print_table(&rows);
            Ok(())
        }
    }
}

/// Print keyword-only results.
pub fn print_keyword_results(results: &[KeywordResult], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(results),
        OutputFormat::Table => {
            if results.is_empty() {
                println!("No results found.");
                return Ok(());
            }

            let rows: Vec<KeywordRow> = results
                .iter()
                .map(|r| KeywordRow {
                    rank: r.rank,
                    id: r.doc_id,
                    score: format!("{:.4}", r.rank_score),
                    title: shorten(&r.document.title),
                })
                .collect();
            print_table(&rows);
            Ok(())
        }
    }
}

/// Print coverage statistics.
pub fn print_stats(stats: &SearchStats, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(stats),
        OutputFormat::Table => {
            let rows = vec![
                property("Total documents", stats.total_documents),
                property("With embedding", stats.with_embedding),
                property("With lexical index", stats.with_lexical_index),
                property("Fully searchable", stats.fully_searchable),
                property(
                    "Embedding coverage",
                    format!("{:.2}%", stats.embedding_coverage_pct),
                ),
                property(
                    "Lexical coverage",
                    format!("{:.2}%", stats.lexical_coverage_pct),
                ),
            ];
            print_table(&rows);
            Ok(())
        }
    }
}

/// Print embedding model metadata.
pub fn print_model_info(info: &ModelInfo, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(info),
        OutputFormat::Table => {
            let rows = vec![
                property("Model", &info.model_name),
                property("Dimension", info.dimension),
                property("Max tokens", info.max_tokens),
                property("Initialized", info.initialized),
                property(
                    "Max sequence length",
                    info.max_sequence_length
                        .map(|len| len.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ];
            print_table(&rows);
            Ok(())
        }
    }
}

/// Print the outcome of a backfill run.
pub fn print_backfill_report(report: &BackfillReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            if report.dry_run {
                println!("Dry run: nothing was written.");
            }
            let rows = vec![
                property("Candidates", report.candidates),
                property("Embedded", report.embedded),
                property("Failed", report.failed),
                property("Skipped", report.skipped),
                property("Still missing", report.remaining),
            ];
            print_table(&rows);
            for error in &report.errors {
                println!("error: {error}");
            }
            Ok(())
        }
    }
}

/// Print evaluation reports, followed by a comparison when more than one
/// method was evaluated.
pub fn print_evaluation(reports: &[EvaluationReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(reports),
        OutputFormat::Table => {
            for report in reports {
                println!("{}", format_evaluation_report(report));
            }
            if reports.len() > 1 {
                println!("{}", format_comparison(reports));
            }
            Ok(())
        }
    }
}

// --- Helper types and functions ---

#[derive(Tabled)]
struct RankedRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "RRF")]
    score: String,
    #[tabled(rename = "Semantic")]
    semantic: String,
    #[tabled(rename = "Lexical")]
    lexical: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Source")]
    source: String,
}

#[derive(Tabled)]
struct SemanticRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Similarity")]
    similarity: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Title")]
    title: String,
}

#[derive(Tabled)]
struct KeywordRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Title")]
    title: String,
}

#[derive(Tabled)]
struct PropertyRow {
    #[tabled(rename = "Property")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn property(name: &'static str, value: impl ToString) -> PropertyRow {
    PropertyRow {
        name,
        value: value.to_string(),
    }
}

fn print_table<T: Tabled>(rows: &[T]) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

fn format_rank(rank: Option<usize>) -> String {
    rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string())
}

fn source_of(document: &Document) -> String {
    document.source.clone().unwrap_or_default()
}

/// Cut long titles on a character boundary.
fn shorten(text: &str) -> String {
    if text.chars().count() > TITLE_WIDTH {
        let head: String = text.chars().take(TITLE_WIDTH - 3).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
