use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use legisearch::{EmbeddingGenerator, HybridSearchEngine, InMemoryDocumentStore, LegisearchConfig};

const CONFIG_FILE: &str = "config.toml";
const STORE_FILE: &str = "store.json";

/// An opened data directory: configuration, document store and embedding
/// generator.
pub struct Context {
    pub config: LegisearchConfig,
    pub store: Arc<InMemoryDocumentStore>,
    pub generator: Arc<EmbeddingGenerator>,
    store_path: PathBuf,
}

impl Context {
    pub fn engine(&self) -> Result<HybridSearchEngine> {
        let engine = HybridSearchEngine::new(
            self.store.clone(),
            self.generator.clone(),
            self.config.search.clone(),
        )?;
        Ok(engine)
    }

    /// Persist the store back to the data directory.
    pub fn save(&self) -> Result<()> {
        self.store
            .save_snapshot(&self.store_path)
            .with_context(|| format!("Failed to write {}", self.store_path.display()))
    }
}

/// Create a new data directory with a configuration and an empty store.
pub fn init(data_dir: &Path, config_path: Option<&Path>, dimension: Option<usize>) -> Result<()> {
    if data_dir.join(CONFIG_FILE).exists() {
        bail!(
            "Data directory already initialized at {}. Delete it first to recreate.",
            data_dir.display()
        );
    }

    let mut config = match config_path {
        Some(path) => LegisearchConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LegisearchConfig::default(),
    };
    if let Some(dimension) = dimension {
        config.embedding.dimension = dimension;
    }
    config.validate()?;

    std::fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    config
        .save(data_dir.join(CONFIG_FILE))
        .context("Failed to write config file")?;

    let store = InMemoryDocumentStore::from_config(&config);
    store
        .save_snapshot(data_dir.join(STORE_FILE))
        .context("Failed to write empty store")?;

    Ok(())
}

/// Open an existing data directory.
pub fn open(data_dir: &Path) -> Result<Context> {
    let config_path = data_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        bail!(
            "No data directory found at {}. Run 'legisearch init' first.",
            data_dir.display()
        );
    }

    let config = LegisearchConfig::load(&config_path).context("Failed to read config file")?;

    let store = Arc::new(InMemoryDocumentStore::from_config(&config));
    let store_path = data_dir.join(STORE_FILE);
    if store_path.exists() {
        let count = store
            .load_snapshot(&store_path)
            .with_context(|| format!("Failed to load {}", store_path.display()))?;
        tracing::debug!(documents = count, "store loaded");
    }

    let generator = Arc::new(
        EmbeddingGenerator::from_config(&config).context("Failed to set up embedding model")?,
    );

    Ok(Context {
        config,
        store,
        generator,
        store_path,
    })
}
