use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use legisearch::SearchMode;

use crate::output::OutputFormat;

/// Legisearch - hybrid semantic and keyword search over legislative documents
#[derive(Parser)]
#[command(name = "legisearch", version, about)]
pub struct Cli {
    /// Path to the data directory.
    #[arg(long, env = "LEGISEARCH_DATA_DIR", default_value = "./legisearch_data")]
    pub data_dir: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new data directory.
    Init(InitCommand),
    /// Add documents from a JSON file.
    Add(AddCommand),
    /// Generate missing embeddings and lexical representations.
    Backfill(BackfillCommand),
    /// Execute a search query.
    Search(SearchCommand),
    /// Show coverage of embeddings and lexical representations.
    Stats,
    /// Show information about the embedding model.
    ModelInfo(ModelInfoCommand),
    /// Evaluate retrieval quality against labelled queries.
    Evaluate(EvaluateCommand),
}

#[derive(Parser)]
pub struct InitCommand {
    /// Configuration TOML file to copy into the data directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the embedding dimension.
    #[arg(long)]
    pub dimension: Option<usize>,
}

#[derive(Parser)]
pub struct AddCommand {
    /// JSON file holding an array of documents.
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Parser)]
pub struct BackfillCommand {
    /// Documents embedded per batch.
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Maximum number of documents to process.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Regenerate embeddings for every document.
    #[arg(long)]
    pub force: bool,

    /// Report what would be processed without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct SearchCommand {
    /// Natural-language query.
    pub query: String,

    /// Retrieval mode.
    #[arg(long, value_enum, default_value_t = ModeArg::Hybrid)]
    pub mode: ModeArg,

    /// Maximum number of results.
    #[arg(long)]
    pub limit: Option<usize>,

    /// RRF smoothing constant.
    #[arg(long)]
    pub rrf_k: Option<f64>,

    /// Candidates fetched per modality before fusion.
    #[arg(long)]
    pub candidates: Option<usize>,
}

#[derive(Parser)]
pub struct ModelInfoCommand {
    /// Load the model before reporting.
    #[arg(long)]
    pub load: bool,
}

#[derive(Parser)]
pub struct EvaluateCommand {
    /// Retrieval method to evaluate.
    #[arg(long, value_enum, default_value_t = MethodArg::All)]
    pub method: MethodArg,

    /// JSON file with labelled queries. Defaults to keyword-pattern queries
    /// built from the stored documents.
    #[arg(long)]
    pub queries_file: Option<PathBuf>,

    /// Cutoffs for precision@k and NDCG@k.
    #[arg(long, value_delimiter = ',', default_values_t = [1, 3, 5, 10])]
    pub k: Vec<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Hybrid,
    Semantic,
    Keyword,
}

impl From<ModeArg> for SearchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Hybrid => SearchMode::Hybrid,
            ModeArg::Semantic => SearchMode::Semantic,
            ModeArg::Keyword => SearchMode::Keyword,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Hybrid,
    Semantic,
    Keyword,
    All,
}

impl MethodArg {
    pub fn modes(self) -> Vec<SearchMode> {
        match self {
            MethodArg::Hybrid => vec![SearchMode::Hybrid],
            MethodArg::Semantic => vec![SearchMode::Semantic],
            MethodArg::Keyword => vec![SearchMode::Keyword],
            MethodArg::All => SearchMode::ALL.to_vec(),
        }
    }
}
