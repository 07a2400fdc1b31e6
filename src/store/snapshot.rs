//! Versioned JSON snapshots of an [`InMemoryDocumentStore`].

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::data::Document;
use crate::error::Result;
use crate::store::memory::InMemoryDocumentStore;
use crate::vector::DistanceMetric;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub document: Document,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub lexical_indexed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    pub dimension: usize,
    pub metric: DistanceMetric,
    /// Name of the analyzer the lexical representation was built with.
    pub analyzer: String,
    pub created_at: DateTime<Utc>,
    pub documents: Vec<SnapshotEntry>,
}

impl InMemoryDocumentStore {
    /// Write the store to `path`.
    ///
    /// The snapshot goes to a sibling temporary file first and is renamed into
    /// place, so a crash never leaves a half-written snapshot behind.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot();

        let tmp_path = path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer(&mut writer, &snapshot)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)?;

        info!(
            "saved {} documents to {}",
            snapshot.documents.len(),
            path.display()
        );
        Ok(())
    }

    /// Replace the store contents with the snapshot at `path`.
    pub fn load_snapshot(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let snapshot: StoreSnapshot = serde_json::from_reader(reader)?;
        let count = self.restore(snapshot)?;
        info!("loaded {count} documents from {}", path.display());
        Ok(count)
    }
}
